use crate::error::{DocxlateError, Result};
use crate::translate::MAX_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_KEY_VAR: &str = "DEEPL_API_KEY";
pub const API_URL_VAR: &str = "DEEPL_API_URL";
pub const DEFAULT_API_URL: &str = "https://api-free.deepl.com";

/// Tunables for a translation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorSettings {
    /// Provider base URL, without the `/v2/...` path.
    pub api_url: String,

    /// Texts per provider call, between 1 and 50.
    pub batch_size: usize,

    /// Hard deadline for one provider call, in seconds.
    pub request_timeout_secs: u64,

    pub connect_timeout_secs: u64,

    /// Hex RGB color of styled terms.
    pub accent_color: String,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            batch_size: MAX_BATCH_SIZE,
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            accent_color: "0563C1".to_string(),
        }
    }
}

impl TranslatorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_accent_color(mut self, color: impl Into<String>) -> Self {
        self.accent_color = color.into();
        self
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(1, MAX_BATCH_SIZE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

/// Provider credentials read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub api_key: String,
    pub api_url: Option<String>,
}

impl ProviderCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: None,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Reads `DEEPL_API_KEY` and the optional `DEEPL_API_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| DocxlateError::config(format!("{} is not set", API_KEY_VAR)))?;
        let api_url = lookup(API_URL_VAR)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Ok(Self { api_key, api_url })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("api_key", &"***")
            .field("api_url", &self.api_url)
            .finish()
    }
}
