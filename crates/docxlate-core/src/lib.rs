pub mod error;
pub mod job;
pub mod package;
pub mod settings;
pub mod terms;
pub mod translate;
pub mod wml;
pub mod xml;

pub use error::{BatchError, DocxlateError, ProviderError, Result};

pub use job::{DocumentTranslator, JobOutcome, JobReport};
pub use settings::{ProviderCredentials, TranslatorSettings};
pub use terms::{Glossary, LinkTable, TermConfig, TermIndex};
pub use translate::{DeepLClient, TranslationProvider, Usage};
pub use wml::{classify, DocumentSummary, Segment, WmlDocument};
