use super::language::provider_language_code;
use super::provider::TranslationProvider;
use crate::error::{BatchError, ProviderError};
use log::debug;

/// Largest number of texts sent in one provider call.
pub const MAX_BATCH_SIZE: usize = 50;

/// Sends an ordered list of texts through a provider in bounded batches and
/// reassembles the results in input order. Any failed batch fails the call.
pub struct BatchTranslator<'a> {
    provider: &'a dyn TranslationProvider,
    batch_size: usize,
}

impl<'a> BatchTranslator<'a> {
    pub fn new(provider: &'a dyn TranslationProvider, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.clamp(1, MAX_BATCH_SIZE),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_count(&self, texts: usize) -> usize {
        texts.div_ceil(self.batch_size)
    }

    pub fn translate_all(&self, texts: &[String], language: &str) -> Result<Vec<String>, BatchError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let target = provider_language_code(language);
        let total = self.batch_count(texts.len());
        let mut translated = Vec::with_capacity(texts.len());

        for (i, chunk) in texts.chunks(self.batch_size).enumerate() {
            let batch = i + 1;
            debug!("Translating batch {} of {} ({} texts) to {}", batch, total, chunk.len(), target);

            let result = self
                .provider
                .translate(chunk, &target)
                .and_then(|out| {
                    if out.len() == chunk.len() {
                        Ok(out)
                    } else {
                        Err(ProviderError::CountMismatch {
                            expected: chunk.len(),
                            actual: out.len(),
                        })
                    }
                })
                .map_err(|source| BatchError { batch, total, source })?;

            translated.extend(result);
        }

        Ok(translated)
    }
}
