mod batch;
mod deepl;
pub mod language;
mod provider;

pub use batch::{BatchTranslator, MAX_BATCH_SIZE};
pub use deepl::DeepLClient;
pub use language::{is_supported_target, provider_language_code, SUPPORTED_TARGETS};
pub use provider::{TranslationProvider, Usage};
