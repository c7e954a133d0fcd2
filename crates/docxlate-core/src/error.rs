use thiserror::Error;

/// Failures reported by a translation provider for a single call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider credentials not configured: {0}")]
    NotConfigured(String),

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API request timed out: {0}")]
    Timeout(String),

    #[error("API responded with error: {status_code} - {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Unexpected API response format: {0}")]
    MalformedResponse(String),

    #[error("Provider returned {actual} translations for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },
}

/// A provider failure pinned to the batch that produced it.
#[derive(Error, Debug)]
#[error("Batch {batch} of {total} failed: {source}")]
pub struct BatchError {
    pub batch: usize,
    pub total: usize,
    #[source]
    pub source: ProviderError,
}

#[derive(Error, Debug)]
pub enum DocxlateError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid document package: {message}")]
    InvalidPackage { message: String },

    #[error("Missing required part '{part_path}' in document package")]
    MissingPart { part_path: String },

    #[error("XML parsing error at {location}: {message}")]
    XmlParse { message: String, location: String },

    #[error("XML serialization error: {0}")]
    XmlWrite(String),

    #[error("Invalid relationship: {message}")]
    InvalidRelationship { message: String },

    #[error("Translation failed: {0}")]
    Translation(#[from] BatchError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DocxlateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_package(message: impl Into<String>) -> Self {
        Self::InvalidPackage {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocxlateError>;
