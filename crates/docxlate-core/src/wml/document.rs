use super::extract::{extract_paragraphs, find_paragraphs};
use crate::error::Result;
use crate::package::{relationships_part_for, OoxmlPackage, RelationshipsPart};
use crate::xml::arena::XmlDocument;
use crate::xml::builder::serialize_bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Read-only counts for `docxlate info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub paragraphs: usize,
    pub translatable_paragraphs: usize,
    pub relationships: usize,
}

/// A word-processing package together with the location of its main
/// content part and that part's relationships.
pub struct WmlDocument {
    package: OoxmlPackage,
    main_part: String,
    relationships_part: String,
}

impl WmlDocument {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_package(OoxmlPackage::open(path)?)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_package(OoxmlPackage::from_bytes(bytes)?)
    }

    fn from_package(package: OoxmlPackage) -> Result<Self> {
        let main_part = package.main_document_part()?;
        let relationships_part = relationships_part_for(&main_part);
        Ok(Self {
            package,
            main_part,
            relationships_part,
        })
    }

    pub fn package(&self) -> &OoxmlPackage {
        &self.package
    }

    pub fn main_part_name(&self) -> &str {
        &self.main_part
    }

    pub fn relationships_part_name(&self) -> &str {
        &self.relationships_part
    }

    pub fn main_document(&self) -> Result<XmlDocument> {
        self.package.get_xml_part(&self.main_part)
    }

    /// The main part's relationships, or an empty part when the package has none.
    pub fn relationships(&self) -> Result<RelationshipsPart> {
        match self.package.get_part(&self.relationships_part)? {
            Some(bytes) => RelationshipsPart::parse(&self.relationships_part, &bytes),
            None => Ok(RelationshipsPart::empty()),
        }
    }

    pub fn summary(&self) -> Result<DocumentSummary> {
        let doc = self.main_document()?;
        Ok(DocumentSummary {
            paragraphs: find_paragraphs(&doc).len(),
            translatable_paragraphs: extract_paragraphs(&doc).len(),
            relationships: self.relationships()?.len(),
        })
    }

    /// Writes the package to `dest` with the main part replaced, and the
    /// relationships part too when one is given.
    pub fn save_with(
        &self,
        dest: &Path,
        content: &XmlDocument,
        relationships: Option<&RelationshipsPart>,
    ) -> Result<()> {
        let mut replacements = vec![(self.main_part.clone(), serialize_bytes(content)?)];
        if let Some(rels) = relationships {
            replacements.push((self.relationships_part.clone(), rels.to_bytes()?));
        }
        self.package.write_with_replacements(dest, &replacements)
    }

    /// Writes the source package unchanged to `dest`.
    pub fn save_copy(&self, dest: &Path) -> Result<()> {
        self.package.save_copy(dest)
    }
}
