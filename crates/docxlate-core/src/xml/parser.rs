use super::arena::XmlDocument;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName, XMLNS_NS};
use crate::error::{DocxlateError, Result};

pub fn parse(xml: &str) -> Result<XmlDocument> {
    parse_part("input", xml.as_bytes())
}

pub fn parse_bytes(bytes: &[u8]) -> Result<XmlDocument> {
    parse_part("input", bytes)
}

/// Parses one package part; `part_name` only feeds error locations.
pub fn parse_part(part_name: &str, bytes: &[u8]) -> Result<XmlDocument> {
    let text = std::str::from_utf8(strip_bom(bytes)).map_err(|e| DocxlateError::XmlParse {
        message: e.to_string(),
        location: part_name.to_string(),
    })?;
    let doc = roxmltree::Document::parse_with_options(
        text,
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .map_err(|e| DocxlateError::XmlParse {
        message: e.to_string(),
        location: format!("{} line {}", part_name, e.pos().row),
    })?;

    let mut xml_doc = XmlDocument::new();
    build_tree(doc.root_element(), &mut xml_doc, None);
    Ok(xml_doc)
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

fn build_tree(node: roxmltree::Node, doc: &mut XmlDocument, parent: Option<indextree::NodeId>) {
    let node_data = match node.node_type() {
        roxmltree::NodeType::Element => {
            let name = XName::new(
                node.tag_name().namespace().unwrap_or(""),
                node.tag_name().name(),
            );

            // roxmltree reports every in-scope namespace on every element; keep only
            // the ones this element declares so serialization does not repeat them.
            let inherited: Vec<(Option<&str>, &str)> = node
                .parent_element()
                .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
                .unwrap_or_default();

            let mut attributes: Vec<XAttribute> = Vec::new();
            for ns in node.namespaces() {
                if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
                    continue;
                }
                match ns.name() {
                    Some(prefix) => {
                        attributes.push(XAttribute::new(XName::new(XMLNS_NS, prefix), ns.uri()))
                    }
                    None => attributes.push(XAttribute::new(XName::local("xmlns"), ns.uri())),
                }
            }

            attributes.extend(node.attributes().map(|attr| {
                XAttribute::new(
                    XName::new(attr.namespace().unwrap_or(""), attr.name()),
                    attr.value(),
                )
            }));

            XmlNodeData::Element { name, attributes }
        }
        roxmltree::NodeType::Text => match node.text() {
            Some(text) => XmlNodeData::Text(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::Comment => match node.text() {
            Some(text) => XmlNodeData::Comment(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::PI => XmlNodeData::ProcessingInstruction {
            target: node.pi().map(|pi| pi.target.to_string()).unwrap_or_default(),
            data: node
                .pi()
                .and_then(|pi| pi.value.map(|s| s.to_string()))
                .unwrap_or_default(),
        },
        _ => return,
    };

    let new_id = match parent {
        Some(parent_id) => doc.add_child(parent_id, node_data),
        None => doc.add_root(node_data),
    };

    for child in node.children() {
        build_tree(child, doc, Some(new_id));
    }
}
