use crate::error::{DocxlateError, Result};
use crate::xml::namespaces::PR;
use crate::xml::{XAttribute, XName, XmlDocument, XmlNodeData};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn new(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        }
    }

    pub fn external(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::External,
        }
    }

    pub fn hyperlink(id: &str, url: &str) -> Self {
        Self::external(id, relationship_types::HYPERLINK, url)
    }
}

pub mod relationship_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}

/// A parsed `*.rels` part. New entries are appended to the existing tree so
/// relationships this crate does not understand survive untouched.
pub struct RelationshipsPart {
    doc: XmlDocument,
}

impl RelationshipsPart {
    pub fn parse(part_name: &str, bytes: &[u8]) -> Result<Self> {
        let doc = crate::xml::parser::parse_part(part_name, bytes)?;
        match doc.root() {
            Some(root) if doc.has_name(root, &PR::Relationships()) => Ok(Self { doc }),
            _ => Err(DocxlateError::InvalidRelationship {
                message: format!("{} has no Relationships root element", part_name),
            }),
        }
    }

    /// A valid relationships document with no entries.
    pub fn empty() -> Self {
        let mut doc = XmlDocument::new();
        doc.add_root(XmlNodeData::element_with_attrs(
            PR::Relationships(),
            vec![XAttribute::new(XName::local("xmlns"), PR::NS)],
        ));
        Self { doc }
    }

    pub fn relationships(&self) -> Vec<Relationship> {
        let Some(root) = self.doc.root() else {
            return Vec::new();
        };
        self.doc
            .elements_by_name(root, &PR::Relationship())
            .filter_map(|node| {
                let data = self.doc.get(node)?;
                let id = data.attribute(&PR::Id())?;
                let target_mode = match data.attribute(&PR::TargetMode()) {
                    Some("External") => TargetMode::External,
                    _ => TargetMode::Internal,
                };
                Some(Relationship {
                    id: id.to_string(),
                    rel_type: data.attribute(&PR::Type()).unwrap_or_default().to_string(),
                    target: data.attribute(&PR::Target()).unwrap_or_default().to_string(),
                    target_mode,
                })
            })
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.relationships().into_iter().map(|r| r.id).collect()
    }

    pub fn len(&self) -> usize {
        self.relationships().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn append(&mut self, rel: &Relationship) -> Result<()> {
        let root = self.doc.root().ok_or_else(|| DocxlateError::InvalidRelationship {
            message: "relationships document has no root".to_string(),
        })?;
        if self.ids().iter().any(|id| id == &rel.id) {
            return Err(DocxlateError::InvalidRelationship {
                message: format!("duplicate relationship id {}", rel.id),
            });
        }

        let mut attributes = vec![
            XAttribute::new(PR::Id(), &rel.id),
            XAttribute::new(PR::Type(), &rel.rel_type),
            XAttribute::new(PR::Target(), &rel.target),
        ];
        if rel.target_mode == TargetMode::External {
            attributes.push(XAttribute::new(PR::TargetMode(), "External"));
        }
        self.doc.add_child(
            root,
            XmlNodeData::element_with_attrs(PR::Relationship(), attributes),
        );
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        crate::xml::builder::serialize_bytes(&self.doc)
    }
}

/// Hands out `rIdN` identifiers above every numeric id already present,
/// skipping any id that is taken verbatim.
#[derive(Debug, Clone)]
pub struct RelationshipIdAllocator {
    next: u32,
    taken: HashSet<String>,
}

impl RelationshipIdAllocator {
    pub fn seeded_from<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let taken: HashSet<String> = existing
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .collect();
        let max = taken
            .iter()
            .filter_map(|id| id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Self {
            next: max.saturating_add(1),
            taken,
        }
    }

    pub fn next_id(&mut self) -> String {
        loop {
            let candidate = format!("rId{}", self.next);
            self.next = self.next.saturating_add(1);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
