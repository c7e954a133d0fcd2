use crate::error::{DocxlateError, Result};
use crate::settings::{ProviderCredentials, TranslatorSettings};
use crate::terms::Glossary;
use crate::translate::{BatchTranslator, DeepLClient, TranslationProvider, Usage};
use crate::wml::{classify, extract_paragraphs, RebuildOutcome, Rebuilder, WmlDocument};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Counters of a finished job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub paragraphs_seen: usize,
    pub paragraphs_translated: usize,
    pub batches: usize,
    pub styled_paragraphs: usize,
    pub hyperlinks_added: usize,
    /// Nothing was translatable and the source was copied as is.
    pub unchanged_copy: bool,
}

/// The single pass/fail result handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub success: bool,
    pub reason: Option<String>,
    pub report: Option<JobReport>,
}

impl JobOutcome {
    pub fn succeeded(report: JobReport) -> Self {
        Self {
            success: true,
            reason: None,
            report: Some(report),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            report: None,
        }
    }
}

/// Translates word-processing documents with one provider and one glossary.
///
/// Each call owns its parsed trees and relationship ids; the translator
/// itself holds only read-only state and can be shared between threads.
pub struct DocumentTranslator {
    provider: Box<dyn TranslationProvider>,
    glossary: Arc<Glossary>,
    settings: TranslatorSettings,
}

impl DocumentTranslator {
    pub fn new(
        provider: Box<dyn TranslationProvider>,
        glossary: Arc<Glossary>,
        settings: TranslatorSettings,
    ) -> Self {
        Self {
            provider,
            glossary,
            settings,
        }
    }

    pub fn with_credentials(
        credentials: &ProviderCredentials,
        glossary: Arc<Glossary>,
        settings: TranslatorSettings,
    ) -> Result<Self> {
        let client = DeepLClient::new(credentials, &settings)?;
        Ok(Self::new(Box::new(client), glossary, settings))
    }

    /// DeepL-backed translator configured from `DEEPL_API_KEY` / `DEEPL_API_URL`.
    pub fn from_env(glossary: Arc<Glossary>, settings: TranslatorSettings) -> Result<Self> {
        let credentials = ProviderCredentials::from_env()?;
        Self::with_credentials(&credentials, glossary, settings)
    }

    pub fn settings(&self) -> &TranslatorSettings {
        &self.settings
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_configured()
    }

    pub fn usage(&self) -> Result<Usage> {
        Ok(self.provider.usage()?)
    }

    /// Translates a single string through the batch client.
    pub fn translate_text(&self, text: &str, language: &str) -> Result<String> {
        self.ensure_configured()?;
        let translator = BatchTranslator::new(self.provider.as_ref(), self.settings.effective_batch_size());
        let mut out = translator.translate_all(&[text.to_string()], language)?;
        Ok(out.pop().unwrap_or_default())
    }

    /// Runs one job and folds every failure into a [`JobOutcome`].
    pub fn translate(&self, source: &Path, dest: &Path, language: &str) -> JobOutcome {
        match self.run(source, dest, language) {
            Ok(report) => JobOutcome::succeeded(report),
            Err(e) => {
                error!("Translation of {} failed: {}", source.display(), e);
                JobOutcome::failed(e.to_string())
            }
        }
    }

    /// Reads `source`, translates every paragraph into `language` and writes
    /// the result to `dest`. `dest` only appears once it is complete.
    pub fn run(&self, source: &Path, dest: &Path, language: &str) -> Result<JobReport> {
        self.ensure_configured()?;
        validate_paths(source, dest)?;
        info!(
            "Translating {} to {} -> {}",
            source.display(),
            language,
            dest.display()
        );

        let document = WmlDocument::open(source)?;
        let mut content = document.main_document()?;
        let paragraphs = extract_paragraphs(&content);

        let mut report = JobReport {
            paragraphs_seen: crate::wml::find_paragraphs(&content).len(),
            ..Default::default()
        };

        if paragraphs.is_empty() {
            info!("No translatable text in {}, copying unchanged", source.display());
            document.save_copy(dest)?;
            report.unchanged_copy = true;
            return Ok(report);
        }

        let relationships = document.relationships()?;
        let index = self.glossary.index_for(language)?;

        let translator = BatchTranslator::new(self.provider.as_ref(), self.settings.effective_batch_size());
        report.batches = translator.batch_count(paragraphs.len());
        let texts: Vec<String> = paragraphs.iter().map(|p| p.text.clone()).collect();
        let translated = translator.translate_all(&texts, language)?;
        report.paragraphs_translated = translated.len();

        let mut rebuilder = Rebuilder::new(
            relationships,
            self.glossary.link_table(),
            language,
            &self.settings.accent_color,
        );
        for (paragraph, text) in paragraphs.iter().zip(&translated) {
            let segments = classify(text, &index);
            if let RebuildOutcome::Styled { .. } = rebuilder.rebuild(&mut content, paragraph, &segments)? {
                report.styled_paragraphs += 1;
            }
        }

        report.hyperlinks_added = rebuilder.hyperlinks_added();
        let relationships = (report.hyperlinks_added > 0).then(|| rebuilder.into_relationships());
        debug!(
            "Writing {} ({} parts replaced)",
            dest.display(),
            1 + usize::from(relationships.is_some())
        );
        document.save_with(dest, &content, relationships.as_ref())?;

        info!(
            "Translated {} paragraphs in {} batches ({} styled, {} hyperlinks)",
            report.paragraphs_translated,
            report.batches,
            report.styled_paragraphs,
            report.hyperlinks_added
        );
        Ok(report)
    }

    fn ensure_configured(&self) -> Result<()> {
        if self.provider.is_configured() {
            Ok(())
        } else {
            Err(DocxlateError::config("translation provider credentials are not configured"))
        }
    }
}

fn validate_paths(source: &Path, dest: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(DocxlateError::invalid_package(format!(
            "source {} does not exist",
            source.display()
        )));
    }
    if resolve(source) == resolve(dest) {
        return Err(DocxlateError::invalid_package(
            "destination must differ from the source",
        ));
    }
    Ok(())
}

/// Canonical form of a path that may not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}
