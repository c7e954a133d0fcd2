use super::arena::XmlDocument;
use super::namespaces::conventional_prefix;
use super::node::XmlNodeData;
use super::xname::{XAttribute, XName, XMLNS_NS, XML_NS};
use crate::error::{DocxlateError, Result};
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use std::borrow::Cow;
use std::collections::HashMap;

/// Namespace bindings in scope at one element.
#[derive(Clone, Debug, Default)]
struct NamespaceScope {
    default: Option<String>,
    /// URI -> prefix
    prefixes: HashMap<String, String>,
    /// prefix -> URI
    bound: HashMap<String, String>,
}

impl NamespaceScope {
    fn declare(&mut self, prefix: &str, uri: &str) {
        if prefix.is_empty() {
            self.default = Some(uri.to_string());
            return;
        }
        if let Some(shadowed) = self.bound.insert(prefix.to_string(), uri.to_string()) {
            if self.prefixes.get(&shadowed).map(String::as_str) == Some(prefix) {
                self.prefixes.remove(&shadowed);
            }
        }
        self.prefixes
            .entry(uri.to_string())
            .or_insert_with(|| prefix.to_string());
    }

    /// Prefix for `uri`, "" meaning the default namespace. Unprefixed
    /// attributes never pick up the default namespace.
    fn resolve(&self, uri: &str, is_attribute: bool) -> Option<&str> {
        if !is_attribute && self.default.as_deref() == Some(uri) {
            return Some("");
        }
        self.prefixes.get(uri).map(String::as_str)
    }

    fn free_prefix(&self, preferred: &str) -> String {
        std::iter::once(preferred.to_string())
            .chain((1..).map(|n| format!("{}{}", preferred, n)))
            .find(|p| !p.is_empty() && !self.bound.contains_key(p))
            .unwrap_or_else(|| preferred.to_string())
    }
}

pub fn serialize(doc: &XmlDocument) -> Result<String> {
    let bytes = serialize_bytes(doc)?;
    String::from_utf8(bytes).map_err(|e| DocxlateError::XmlWrite(e.to_string()))
}

pub fn serialize_bytes(doc: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(write_error)?;
    writer.get_mut().extend_from_slice(b"\r\n");

    if let Some(root_id) = doc.root() {
        write_node(doc, root_id, &mut writer, &NamespaceScope::default())?;
    }

    Ok(writer.into_inner())
}

fn write_error(e: impl std::fmt::Display) -> DocxlateError {
    DocxlateError::XmlWrite(e.to_string())
}

fn declare_attributes(scope: &mut NamespaceScope, attributes: &[XAttribute]) {
    for attr in attributes {
        if attr.name.namespace.is_none() && attr.name.local_name == "xmlns" {
            scope.declare("", &attr.value);
        } else if attr.name.namespace.as_deref() == Some(XMLNS_NS) {
            scope.declare(&attr.name.local_name, &attr.value);
        }
    }
}

/// Binds a prefix on this element for every namespace its name or
/// attributes use that nothing in scope covers yet.
fn bind_missing_namespaces(
    scope: &mut NamespaceScope,
    name: &XName,
    attributes: &[XAttribute],
) -> Vec<(String, String)> {
    let used = std::iter::once((name, false)).chain(
        attributes
            .iter()
            .filter(|a| !a.name.is_namespace_declaration())
            .map(|a| (&a.name, true)),
    );

    let mut declarations = Vec::new();
    for (xname, is_attribute) in used {
        let Some(ns) = xname.namespace.as_deref() else {
            continue;
        };
        if ns == XMLNS_NS || ns == XML_NS || scope.resolve(ns, is_attribute).is_some() {
            continue;
        }
        let prefix = scope.free_prefix(conventional_prefix(ns));
        scope.declare(&prefix, ns);
        declarations.push((prefix, ns.to_string()));
    }
    declarations
}

fn qualified_name(name: &XName, scope: &NamespaceScope, is_attribute: bool) -> String {
    let Some(ns) = &name.namespace else {
        return name.local_name.clone();
    };
    if ns == XMLNS_NS {
        return format!("xmlns:{}", name.local_name);
    }
    if ns == XML_NS {
        return format!("xml:{}", name.local_name);
    }
    let prefix = scope
        .resolve(ns, is_attribute)
        .unwrap_or_else(|| conventional_prefix(ns));
    if prefix.is_empty() {
        name.local_name.clone()
    } else {
        format!("{}:{}", prefix, name.local_name)
    }
}

/// Escapes an attribute value, keeping whitespace characters as character
/// references so attribute-value normalization cannot alter them on reload.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\r' => out.push_str("&#xD;"),
            '\n' => out.push_str("&#xA;"),
            '\t' => out.push_str("&#x9;"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_node<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    writer: &mut Writer<W>,
    scope: &NamespaceScope,
) -> Result<()> {
    let Some(node_data) = doc.get(node_id) else {
        return Ok(());
    };

    match node_data {
        XmlNodeData::Element { name, attributes } => {
            write_element(doc, node_id, name, attributes, writer, scope)?;
        }
        XmlNodeData::Text(text) => {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?;
        }
        XmlNodeData::CData(text) => {
            writer
                .write_event(Event::CData(BytesCData::new(text.as_str())))
                .map_err(write_error)?;
        }
        XmlNodeData::Comment(text) => {
            writer
                .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                .map_err(write_error)?;
        }
        XmlNodeData::ProcessingInstruction { target, data } => {
            let content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            writer
                .write_event(Event::PI(BytesPI::new(content.as_str())))
                .map_err(write_error)?;
        }
    }

    Ok(())
}

fn write_element<W: std::io::Write>(
    doc: &XmlDocument,
    node_id: indextree::NodeId,
    name: &XName,
    attributes: &[XAttribute],
    writer: &mut Writer<W>,
    parent_scope: &NamespaceScope,
) -> Result<()> {
    let mut scope = parent_scope.clone();
    declare_attributes(&mut scope, attributes);
    let declarations = bind_missing_namespaces(&mut scope, name, attributes);

    let tag_name = qualified_name(name, &scope, false);
    let mut elem = BytesStart::new(tag_name.as_str());

    for (prefix, uri) in &declarations {
        let key = format!("xmlns:{}", prefix);
        elem.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(escape_attribute(uri).into_bytes()),
        });
    }
    for attr in attributes {
        let attr_name = qualified_name(&attr.name, &scope, true);
        let escaped = escape_attribute(&attr.value);
        elem.push_attribute(Attribute {
            key: QName(attr_name.as_bytes()),
            value: Cow::Owned(escaped.into_bytes()),
        });
    }

    let children: Vec<_> = doc.children(node_id).collect();

    if children.is_empty() {
        writer.write_event(Event::Empty(elem)).map_err(write_error)?;
    } else {
        writer.write_event(Event::Start(elem)).map_err(write_error)?;
        for child_id in children {
            write_node(doc, child_id, writer, &scope)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(tag_name.as_str())))
            .map_err(write_error)?;
    }

    Ok(())
}
