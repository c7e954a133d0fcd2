use crate::error::ProviderError;
use serde::{Deserialize, Serialize};

/// Character usage reported by the provider account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub character_count: u64,
    pub character_limit: u64,
}

impl Usage {
    pub fn remaining(&self) -> u64 {
        self.character_limit.saturating_sub(self.character_count)
    }
}

/// An external translation service.
///
/// `translate` receives one batch of source strings and a provider-specific
/// target code and must return the same number of strings in the same order.
pub trait TranslationProvider: Send + Sync {
    fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<String>, ProviderError>;

    fn usage(&self) -> Result<Usage, ProviderError>;

    fn is_configured(&self) -> bool {
        true
    }
}

impl<T: TranslationProvider + ?Sized> TranslationProvider for Box<T> {
    fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<String>, ProviderError> {
        (**self).translate(texts, target_lang)
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        (**self).usage()
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}
