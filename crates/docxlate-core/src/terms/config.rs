use super::index::{normalize_language, TermIndex};
use crate::error::{DocxlateError, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// `terms.json`: term key -> language -> surface forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermConfig {
    pub terms: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl TermConfig {
    /// Merges language keys that normalize to the same code.
    pub fn normalized(self) -> Self {
        let mut terms: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for (term, by_language) in self.terms {
            let merged = terms.entry(term).or_default();
            for (language, forms) in by_language {
                merged
                    .entry(normalize_language(&language))
                    .or_default()
                    .extend(forms);
            }
        }
        Self { terms }
    }

    /// `(surface form, term key)` pairs configured for an already-normalized language.
    pub fn forms_for<'a>(&'a self, language: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.terms.iter().flat_map(move |(term, by_language)| {
            by_language
                .get(language)
                .into_iter()
                .flatten()
                .map(move |form| (form.as_str(), term.as_str()))
        })
    }
}

/// `links.json`: language -> term key -> URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkTable {
    pub links: BTreeMap<String, BTreeMap<String, String>>,
}

impl LinkTable {
    pub fn normalized(self) -> Self {
        let mut links: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (language, by_term) in self.links {
            links
                .entry(normalize_language(&language))
                .or_default()
                .extend(by_term);
        }
        Self { links }
    }

    pub fn url_for(&self, language: &str, term: &str) -> Option<&str> {
        self.links
            .get(&normalize_language(language))?
            .get(term)
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
    }
}

/// Term and link configuration shared by every job of the process.
///
/// Both tables are read-only after construction; per-language indexes are
/// built on first use and cached.
#[derive(Debug, Default)]
pub struct Glossary {
    terms: TermConfig,
    links: LinkTable,
    indexes: RwLock<HashMap<String, Arc<TermIndex>>>,
}

impl Glossary {
    pub fn new(terms: TermConfig, links: LinkTable) -> Self {
        Self {
            terms: terms.normalized(),
            links: links.normalized(),
            indexes: RwLock::new(HashMap::new()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads both JSON files. A missing file yields an empty table; a file
    /// that exists but cannot be parsed is a configuration error.
    pub fn load(terms_path: &Path, links_path: &Path) -> Result<Self> {
        let terms: TermConfig = read_optional_json(terms_path)?;
        let links: LinkTable = read_optional_json(links_path)?;
        debug!(
            "Loaded {} terms and links for {} languages",
            terms.terms.len(),
            links.links.len()
        );
        Ok(Self::new(terms, links))
    }

    pub fn term_config(&self) -> &TermConfig {
        &self.terms
    }

    pub fn link_table(&self) -> &LinkTable {
        &self.links
    }

    pub fn link_for(&self, language: &str, term: &str) -> Option<&str> {
        self.links.url_for(language, term)
    }

    /// The Term Index for `language`. Languages with no configured forms get
    /// an empty index, which disables styling for the job.
    pub fn index_for(&self, language: &str) -> Result<Arc<TermIndex>> {
        let language = normalize_language(language);
        {
            let cache = self.indexes.read().unwrap_or_else(|e| e.into_inner());
            if let Some(index) = cache.get(&language) {
                return Ok(Arc::clone(index));
            }
        }

        let index = Arc::new(TermIndex::build(self.terms.forms_for(&language))?);
        if index.is_empty() && !self.terms.terms.is_empty() {
            warn!("No term forms configured for language '{}'", language);
        }

        let mut cache = self.indexes.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(language).or_insert(index)))
    }
}

fn read_optional_json<T>(path: &Path) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        warn!("{} not found, continuing without it", path.display());
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| DocxlateError::config(format!("cannot parse {}: {}", path.display(), e)))
}
