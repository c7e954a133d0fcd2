use super::provider::{TranslationProvider, Usage};
use crate::error::ProviderError;
use crate::settings::{ProviderCredentials, TranslatorSettings};
use log::{debug, error};
use reqwest::blocking::{Client, Response};
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USAGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a [String],
    target_lang: &'a str,
    preserve_formatting: bool,
    /// "0": never split on sentence boundaries.
    split_sentences: &'a str,
    tag_handling: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// DeepL REST client (`/v2/translate`, `/v2/usage`).
pub struct DeepLClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DeepLClient {
    pub fn new(
        credentials: &ProviderCredentials,
        settings: &TranslatorSettings,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(settings.connect_timeout())
            .build()
            .map_err(|e| ProviderError::RequestFailed(format!("cannot build HTTP client: {}", e)))?;
        let base_url = credentials
            .api_url
            .clone()
            .unwrap_or_else(|| settings.api_url.clone());

        Ok(Self {
            client,
            api_key: credentials.api_key.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured("DeepL API key is empty".to_string()))
        }
    }
}

impl TranslationProvider for DeepLClient {
    fn translate(&self, texts: &[String], target_lang: &str) -> Result<Vec<String>, ProviderError> {
        self.ensure_configured()?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v2/translate", self.base_url);
        let request = TranslateRequest {
            text: texts,
            target_lang,
            preserve_formatting: true,
            split_sentences: "0",
            tag_handling: "xml",
        };
        debug!("POST {} ({} texts, target {})", url, texts.len(), target_lang);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, self.auth_header())
            .json(&request)
            .send()
            .map_err(transport_error)?;

        let body: TranslateResponse = check_status(response)?
            .json()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(body.translations.into_iter().map(|t| t.text).collect())
    }

    fn usage(&self) -> Result<Usage, ProviderError> {
        self.ensure_configured()?;
        let url = format!("{}/v2/usage", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, self.auth_header())
            .timeout(USAGE_TIMEOUT)
            .send()
            .map_err(transport_error)?;

        check_status(response)?
            .json::<Usage>()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .ok()
        .and_then(|e| e.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                body.clone()
            }
        });
    error!("DeepL API error (HTTP {}): {}", status.as_u16(), message);

    Err(ProviderError::ApiError {
        status_code: status.as_u16(),
        message,
    })
}
