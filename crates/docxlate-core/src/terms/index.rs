use crate::error::{DocxlateError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

/// Glossaries with many thousand forms need more than the default regex size limit.
const PATTERN_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Legacy language codes and the code they are stored under.
const LANGUAGE_REMAP: &[(&str, &str)] = &[("no", "nb")];

/// Lowercases a language code, drops any region part ("pt-BR" -> "pt") and
/// applies the legacy remap.
pub fn normalize_language(code: &str) -> String {
    let lower = code.trim().to_lowercase();
    let base = lower
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default();
    LANGUAGE_REMAP
        .iter()
        .find(|(legacy, _)| *legacy == base)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| base.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermEntry {
    /// Lowercased surface form.
    pub surface: String,
    pub term: String,
}

/// Surface form -> term key for one target language.
///
/// Entries are kept longest-first so the alternation built from them always
/// prefers the longest form starting at a given position.
#[derive(Debug, Clone)]
pub struct TermIndex {
    entries: Vec<TermEntry>,
    lookup: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl TermIndex {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            lookup: HashMap::new(),
            pattern: None,
        }
    }

    /// Builds an index from `(surface form, term key)` pairs. Blank forms are
    /// ignored; when two terms claim the same form, the smaller term key wins
    /// so the result does not depend on input order.
    pub fn build<I, S, T>(forms: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut lookup: HashMap<String, String> = HashMap::new();
        for (surface, term) in forms {
            let surface = surface.as_ref().trim().to_lowercase();
            if surface.is_empty() {
                continue;
            }
            let term = term.as_ref().to_string();
            lookup
                .entry(surface)
                .and_modify(|existing| {
                    if term < *existing {
                        *existing = term.clone();
                    }
                })
                .or_insert(term);
        }

        if lookup.is_empty() {
            return Ok(Self::empty());
        }

        let mut entries: Vec<TermEntry> = lookup
            .iter()
            .map(|(surface, term)| TermEntry {
                surface: surface.clone(),
                term: term.clone(),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.surface
                .chars()
                .count()
                .cmp(&a.surface.chars().count())
                .then_with(|| a.surface.cmp(&b.surface))
        });

        let alternation = entries
            .iter()
            .map(|e| regex::escape(&e.surface))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|e| DocxlateError::config(format!("cannot compile term pattern: {}", e)))?;

        Ok(Self {
            entries,
            lookup,
            pattern: Some(pattern),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries ordered longest surface form first.
    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    /// Case-insensitive lookup of a surface form.
    pub fn lookup(&self, surface: &str) -> Option<&str> {
        self.lookup.get(&surface.to_lowercase()).map(String::as_str)
    }

    /// Alternation of every surface form, `None` when the index is empty.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }
}

impl Default for TermIndex {
    fn default() -> Self {
        Self::empty()
    }
}
