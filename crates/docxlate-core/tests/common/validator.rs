//! Package validation for translated documents.
//!
//! Checks the rules a translation job must not break:
//!
//! 1. The container is a readable zip holding `[Content_Types].xml` and `_rels/.rels`.
//! 2. Every `.xml` and `.rels` part is well-formed.
//! 3. `<w:pPr>` / `<w:rPr>` are the first element child of `<w:p>` / `<w:r>`.
//! 4. Every `r:id` in the main part resolves to a relationship, and relationship ids are unique.

use roxmltree::{Document, Node};
use std::collections::{HashMap, HashSet};
use std::io::Read;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const MAIN_PART: &str = "word/document.xml";
const MAIN_RELS: &str = "word/_rels/document.xml.rels";

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    pub error_type: ValidationErrorType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationErrorType {
    InvalidZip,
    MissingPart,
    InvalidXml,
    ElementOrderingViolation,
    BrokenRelationship,
    DuplicateRelationshipId,
}

fn error(path: &str, message: String, error_type: ValidationErrorType) -> ValidationError {
    ValidationError {
        path: path.to_string(),
        message,
        error_type,
    }
}

/// Reads every part of a zip container into memory.
pub fn read_parts(doc_bytes: &[u8]) -> Result<HashMap<String, Vec<u8>>, String> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(doc_bytes)).map_err(|e| e.to_string())?;
    let mut parts = HashMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| e.to_string())?;
        let mut content = Vec::new();
        file.read_to_end(&mut content).map_err(|e| e.to_string())?;
        parts.insert(file.name().to_string(), content);
    }
    Ok(parts)
}

pub fn validate_package(doc_bytes: &[u8]) -> ValidationResult {
    let mut errors = Vec::new();

    let parts = match read_parts(doc_bytes) {
        Ok(parts) => parts,
        Err(e) => {
            return ValidationResult {
                is_valid: false,
                errors: vec![error("", format!("Invalid ZIP archive: {}", e), ValidationErrorType::InvalidZip)],
            }
        }
    };

    for required in ["[Content_Types].xml", "_rels/.rels"] {
        if !parts.contains_key(required) {
            errors.push(error(required, format!("Missing {}", required), ValidationErrorType::MissingPart));
        }
    }

    for (name, bytes) in &parts {
        if !(name.ends_with(".xml") || name.ends_with(".rels")) {
            continue;
        }
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text.trim_start_matches('\u{feff}'),
            Err(e) => {
                errors.push(error(name, format!("not UTF-8: {}", e), ValidationErrorType::InvalidXml));
                continue;
            }
        };
        match Document::parse(text) {
            Ok(doc) if name.starts_with("word/") && name.ends_with(".xml") => {
                check_element_ordering(&doc.root(), name, &mut errors);
            }
            Ok(_) => {}
            Err(e) => errors.push(error(name, format!("XML parse error: {}", e), ValidationErrorType::InvalidXml)),
        }
    }

    check_relationship_references(&parts, &mut errors);

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn check_element_ordering(node: &Node, part_name: &str, errors: &mut Vec<ValidationError>) {
    if node.is_element() && node.tag_name().namespace() == Some(W_NS) {
        match node.tag_name().name() {
            "p" => check_first_child_rule(node, "pPr", part_name, errors),
            "r" => check_first_child_rule(node, "rPr", part_name, errors),
            _ => {}
        }
    }
    for child in node.children() {
        check_element_ordering(&child, part_name, errors);
    }
}

fn check_first_child_rule(parent: &Node, props: &str, part_name: &str, errors: &mut Vec<ValidationError>) {
    let position = parent
        .children()
        .filter(|c| c.is_element())
        .position(|c| c.tag_name().namespace() == Some(W_NS) && c.tag_name().name() == props);
    if let Some(pos) = position {
        if pos != 0 {
            errors.push(error(
                part_name,
                format!(
                    "<w:{}> must be the first child of <w:{}> but is at position {}",
                    props,
                    parent.tag_name().name(),
                    pos + 1
                ),
                ValidationErrorType::ElementOrderingViolation,
            ));
        }
    }
}

fn check_relationship_references(parts: &HashMap<String, Vec<u8>>, errors: &mut Vec<ValidationError>) {
    let mut ids = HashSet::new();
    if let Some(Ok(text)) = parts.get(MAIN_RELS).map(|b| std::str::from_utf8(b)) {
        if let Ok(doc) = Document::parse(text) {
            for rel in doc.descendants().filter(|n| n.has_tag_name("Relationship")) {
                let id = rel.attribute("Id").unwrap_or_default().to_string();
                if !ids.insert(id.clone()) {
                    errors.push(error(
                        MAIN_RELS,
                        format!("duplicate relationship id {}", id),
                        ValidationErrorType::DuplicateRelationshipId,
                    ));
                }
            }
        }
    }

    if let Some(Ok(text)) = parts.get(MAIN_PART).map(|b| std::str::from_utf8(b)) {
        if let Ok(doc) = Document::parse(text) {
            for node in doc.descendants() {
                if let Some(id) = node.attribute((R_NS, "id")) {
                    if !ids.contains(id) {
                        errors.push(error(
                            MAIN_PART,
                            format!("r:id {} has no relationship", id),
                            ValidationErrorType::BrokenRelationship,
                        ));
                    }
                }
            }
        }
    }
}

/// Panics with every validation error when the package is not valid.
pub fn assert_valid_package(doc_bytes: &[u8], context: &str) {
    let result = validate_package(doc_bytes);
    if !result.is_valid {
        let messages: Vec<_> = result
            .errors
            .iter()
            .map(|e| format!("  - [{:?}] {}: {}", e.error_type, e.path, e.message))
            .collect();
        panic!("Package validation failed for {}:\n{}", context, messages.join("\n"));
    }
}
