use crate::error::{DocxlateError, Result};
use crate::xml::XmlDocument;
use log::debug;
use std::collections::HashSet;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use super::relationships::{relationship_types, RelationshipsPart};

/// Package-level relationships part, the entry point for locating the main document.
pub const PACKAGE_RELATIONSHIPS: &str = "_rels/.rels";
pub const DEFAULT_MAIN_DOCUMENT: &str = "word/document.xml";

/// Read-only view of a zip-based OOXML container.
///
/// The original archive bytes are kept so parts that are not replaced can be
/// copied through to the output without recompression.
pub struct OoxmlPackage {
    source: Vec<u8>,
    part_names: Vec<String>,
}

impl OoxmlPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let part_names = {
            let archive = ZipArchive::new(Cursor::new(bytes.as_slice())).map_err(|e| {
                DocxlateError::invalid_package(format!("not a zip container: {}", e))
            })?;
            archive.file_names().map(str::to_string).collect()
        };

        Ok(Self {
            source: bytes,
            part_names,
        })
    }

    fn archive(&self) -> Result<ZipArchive<Cursor<&[u8]>>> {
        Ok(ZipArchive::new(Cursor::new(self.source.as_slice()))?)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.part_names.iter().map(String::as_str)
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.part_names.iter().any(|name| name == path)
    }

    pub fn get_part(&self, path: &str) -> Result<Option<Vec<u8>>> {
        if !self.has_part(path) {
            return Ok(None);
        }
        let mut archive = self.archive()?;
        let mut file = archive.by_name(path)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(Some(content))
    }

    pub fn get_xml_part(&self, path: &str) -> Result<XmlDocument> {
        let bytes = self.get_part(path)?.ok_or_else(|| DocxlateError::MissingPart {
            part_path: path.to_string(),
        })?;
        crate::xml::parser::parse_part(path, &bytes)
    }

    /// Resolves the main document part through the package relationships,
    /// falling back to the conventional location.
    pub fn main_document_part(&self) -> Result<String> {
        if let Some(bytes) = self.get_part(PACKAGE_RELATIONSHIPS)? {
            let rels = RelationshipsPart::parse(PACKAGE_RELATIONSHIPS, &bytes)?;
            if let Some(rel) = rels
                .relationships()
                .into_iter()
                .find(|r| r.rel_type == relationship_types::OFFICE_DOCUMENT)
            {
                let target = rel.target.trim_start_matches('/').to_string();
                if self.has_part(&target) {
                    return Ok(target);
                }
            }
        }
        if self.has_part(DEFAULT_MAIN_DOCUMENT) {
            return Ok(DEFAULT_MAIN_DOCUMENT.to_string());
        }
        Err(DocxlateError::MissingPart {
            part_path: DEFAULT_MAIN_DOCUMENT.to_string(),
        })
    }

    /// Writes a copy of this package to `dest` in which each named part is
    /// deleted and re-added with new content. All other parts are copied raw.
    ///
    /// The archive is assembled in a temporary file beside `dest` and only
    /// renamed into place once complete; on any error nothing is left at `dest`.
    pub fn write_with_replacements(&self, dest: &Path, replacements: &[(String, Vec<u8>)]) -> Result<()> {
        let replaced: HashSet<&str> = replacements.iter().map(|(name, _)| name.as_str()).collect();
        let mut tmp = NamedTempFile::new_in(parent_dir(dest))?;

        {
            let mut archive = self.archive()?;
            let mut writer = ZipWriter::new(tmp.as_file_mut());

            for i in 0..archive.len() {
                let file = archive.by_index_raw(i)?;
                if replaced.contains(file.name()) {
                    debug!("Replacing part {}", file.name());
                    continue;
                }
                writer.raw_copy_file(file)?;
            }

            for (name, content) in replacements {
                let options: zip::write::FileOptions<'_, ()> = zip::write::FileOptions::default()
                    .compression_method(CompressionMethod::Deflated);
                writer.start_file(name.as_str(), options)?;
                writer.write_all(content)?;
            }

            writer.finish()?;
        }

        tmp.as_file().sync_all()?;
        tmp.persist(dest).map_err(|e| e.error)?;
        Ok(())
    }

    /// Writes the untouched source container to `dest`.
    pub fn save_copy(&self, dest: &Path) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(parent_dir(dest))?;
        tmp.write_all(&self.source)?;
        tmp.as_file().sync_all()?;
        tmp.persist(dest).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Relationships part belonging to `part`, e.g. `word/_rels/document.xml.rels`.
pub fn relationships_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{}/_rels/{}.rels", dir, name),
        None => format!("_rels/{}.rels", part),
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
