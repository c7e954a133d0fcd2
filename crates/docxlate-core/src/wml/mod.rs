mod document;
mod extract;
mod rebuild;
mod segment;

pub use document::{DocumentSummary, WmlDocument};
pub use extract::{extract_paragraphs, find_paragraphs, text_leaves, ExtractedParagraph};
pub use rebuild::{replace_leaf_text, set_leaf_text, RebuildOutcome, Rebuilder};
pub use segment::{classify, has_terms, Segment};
