pub mod config;
pub mod index;

pub use config::{Glossary, LinkTable, TermConfig};
pub use index::{normalize_language, TermEntry, TermIndex};
