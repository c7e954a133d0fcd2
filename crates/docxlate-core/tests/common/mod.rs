#![allow(dead_code)]

pub mod validator;

pub use validator::{assert_valid_package, read_parts};

use docxlate_core::{ProviderError, TranslationProvider, Usage};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults/></w:styles>"#;

/// Builds small `.docx` packages in memory.
pub struct DocxBuilder {
    body: String,
    declare_r: bool,
    relationships: Option<Vec<(String, String)>>,
    extra_parts: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            body: String::new(),
            declare_r: true,
            relationships: Some(vec![(
                "rId1".to_string(),
                r#"Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml""#.to_string(),
            )]),
            extra_parts: Vec::new(),
        }
    }

    /// Appends raw body XML (paragraphs, tables, ...).
    pub fn body_xml(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Appends a paragraph with one plain run per text.
    pub fn paragraph(self, runs: &[&str]) -> Self {
        let runs: String = runs
            .iter()
            .map(|t| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, escape(t)))
            .collect();
        self.body_xml(&format!("<w:p>{}</w:p>", runs))
    }

    pub fn paragraphs(mut self, count: usize) -> Self {
        for i in 0..count {
            self = self.paragraph(&[&format!("Paragraph {}", i)]);
        }
        self
    }

    pub fn without_r_namespace(mut self) -> Self {
        self.declare_r = false;
        self
    }

    pub fn without_relationships_part(mut self) -> Self {
        self.relationships = None;
        self
    }

    /// Adds a relationship to the main part's relationships, `attrs` being
    /// everything after the `Id` attribute.
    pub fn relationship(mut self, id: &str, attrs: &str) -> Self {
        self.relationships
            .get_or_insert_with(Vec::new)
            .push((id.to_string(), attrs.to_string()));
        self
    }

    pub fn part(mut self, name: &str, content: &[u8]) -> Self {
        self.extra_parts.push((name.to_string(), content.to_vec()));
        self
    }

    pub fn document_xml(&self) -> String {
        let r = if self.declare_r {
            format!(r#" xmlns:r="{}""#, R_NS)
        } else {
            String::new()
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"{}><w:body>{}<w:sectPr/></w:body></w:document>"#,
            W_NS, r, self.body
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut buffer);
            add_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES.as_bytes());
            add_part(&mut zip, "_rels/.rels", PACKAGE_RELS.as_bytes());
            add_part(&mut zip, "word/document.xml", self.document_xml().as_bytes());
            add_part(&mut zip, "word/styles.xml", STYLES.as_bytes());
            if let Some(rels) = &self.relationships {
                let entries: String = rels
                    .iter()
                    .map(|(id, attrs)| format!(r#"<Relationship Id="{}" {}/>"#, id, attrs))
                    .collect();
                let xml = format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                    entries
                );
                add_part(&mut zip, "word/_rels/document.xml.rels", xml.as_bytes());
            }
            for (name, content) in &self.extra_parts {
                add_part(&mut zip, name, content);
            }
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

fn add_part<W: Write + std::io::Seek>(zip: &mut ZipWriter<W>, name: &str, content: &[u8]) {
    zip.start_file(name, SimpleFileOptions::default()).unwrap();
    zip.write_all(content).unwrap();
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Returns a part of the package at `path` as a string.
pub fn part_text(path: &Path, name: &str) -> String {
    let parts = read_parts(&std::fs::read(path).unwrap()).unwrap();
    String::from_utf8(parts.get(name).unwrap_or_else(|| panic!("missing part {}", name)).clone()).unwrap()
}

/// Texts of every `w:t` in the main part, grouped by paragraph.
pub fn paragraph_texts(path: &Path) -> Vec<String> {
    let xml = part_text(path, "word/document.xml");
    let doc = roxmltree::Document::parse(&xml).unwrap();
    doc.descendants()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .map(|p| {
            p.descendants()
                .filter(|n| n.has_tag_name((W_NS, "t")))
                .filter_map(|t| t.text())
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

fn no_usage() -> Result<Usage, ProviderError> {
    Ok(Usage {
        character_count: 0,
        character_limit: 500_000,
    })
}

/// Returns its input unchanged and records the size of each batch.
#[derive(Default)]
pub struct EchoProvider {
    pub batches: Mutex<Vec<Vec<String>>>,
    pub languages: Mutex<Vec<String>>,
}

impl TranslationProvider for EchoProvider {
    fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<String>, ProviderError> {
        self.batches.lock().unwrap().push(texts.to_vec());
        self.languages.lock().unwrap().push(target_lang.to_string());
        Ok(texts.to_vec())
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        no_usage()
    }
}

/// Shared handle so a test can inspect an echo provider after boxing it.
pub struct SharedEcho(pub std::sync::Arc<EchoProvider>);

impl TranslationProvider for SharedEcho {
    fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<String>, ProviderError> {
        self.0.translate(texts, target_lang)
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        self.0.usage()
    }
}

pub struct UppercaseProvider;

impl TranslationProvider for UppercaseProvider {
    fn translate(&self, texts: &[String], _target_lang: &str) -> Result<Vec<String>, ProviderError> {
        Ok(texts.iter().map(|t| t.to_uppercase()).collect())
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        no_usage()
    }
}

/// Translates through a fixed table, echoing anything not in it.
pub struct MapProvider(pub HashMap<String, String>);

impl MapProvider {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl TranslationProvider for MapProvider {
    fn translate(&self, texts: &[String], _target_lang: &str) -> Result<Vec<String>, ProviderError> {
        Ok(texts
            .iter()
            .map(|t| self.0.get(t).cloned().unwrap_or_else(|| t.clone()))
            .collect())
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        no_usage()
    }
}

/// Succeeds until call number `fail_on_call` (1-based), which returns an API error.
pub struct FailingProvider {
    pub fail_on_call: usize,
    pub calls: Mutex<usize>,
}

impl FailingProvider {
    pub fn on_call(fail_on_call: usize) -> Self {
        Self {
            fail_on_call,
            calls: Mutex::new(0),
        }
    }
}

impl TranslationProvider for FailingProvider {
    fn translate(&self, texts: &[String], _target_lang: &str) -> Result<Vec<String>, ProviderError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls == self.fail_on_call {
            return Err(ProviderError::ApiError {
                status_code: 456,
                message: "Quota exceeded".to_string(),
            });
        }
        Ok(texts.to_vec())
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        no_usage()
    }
}

/// A provider without credentials.
pub struct UnconfiguredProvider;

impl TranslationProvider for UnconfiguredProvider {
    fn translate(&self, _texts: &[String], _target_lang: &str) -> Result<Vec<String>, ProviderError> {
        panic!("unconfigured provider must never be called");
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        Err(ProviderError::NotConfigured("no key".to_string()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}
