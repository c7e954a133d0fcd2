use super::extract::ExtractedParagraph;
use super::segment::{has_terms, Segment};
use crate::error::{DocxlateError, Result};
use crate::package::{Relationship, RelationshipIdAllocator, RelationshipsPart};
use crate::terms::LinkTable;
use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::{R, W, XML};
use crate::xml::node::XmlNodeData;
use crate::xml::xname::{XAttribute, XName};
use indextree::NodeId;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Translation written into the first leaf, other leaves blanked.
    TextReplaced,
    /// Runs discarded and re-created from segments.
    Styled { runs: usize, hyperlinks: usize },
    /// The paragraph is no longer part of the tree.
    Skipped,
}

/// Writes translated text back into paragraphs of one content part.
///
/// Owns the relationships part of that content part while the job runs, so
/// every hyperlink it creates gets an id that is unique within the part.
pub struct Rebuilder<'a> {
    links: &'a LinkTable,
    language: String,
    accent_color: String,
    relationships: RelationshipsPart,
    ids: RelationshipIdAllocator,
    hyperlinks_added: usize,
}

impl<'a> Rebuilder<'a> {
    pub fn new(
        relationships: RelationshipsPart,
        links: &'a LinkTable,
        language: &str,
        accent_color: &str,
    ) -> Self {
        let ids = RelationshipIdAllocator::seeded_from(relationships.ids());
        Self {
            links,
            language: language.to_string(),
            accent_color: accent_color.to_string(),
            relationships,
            ids,
            hyperlinks_added: 0,
        }
    }

    pub fn hyperlinks_added(&self) -> usize {
        self.hyperlinks_added
    }

    /// The relationships part including every hyperlink added so far.
    pub fn into_relationships(self) -> RelationshipsPart {
        self.relationships
    }

    pub fn rebuild(
        &mut self,
        doc: &mut XmlDocument,
        paragraph: &ExtractedParagraph,
        segments: &[Segment],
    ) -> Result<RebuildOutcome> {
        if !doc.is_live(paragraph.node) {
            debug!("Paragraph {} was removed, skipping", paragraph.index);
            return Ok(RebuildOutcome::Skipped);
        }
        if !has_terms(segments) {
            let text: String = segments.iter().map(|s| s.text.as_str()).collect();
            replace_leaf_text(doc, &paragraph.leaves, &text);
            return Ok(RebuildOutcome::TextReplaced);
        }

        // Runs hosting nested paragraphs (text boxes) are kept so those
        // paragraphs still receive their own translation.
        let direct_runs: Vec<NodeId> = doc
            .children(paragraph.node)
            .filter(|&child| doc.has_name(child, &W::r()) || doc.has_name(child, &W::hyperlink()))
            .filter(|&child| !hosts_paragraph(doc, child))
            .collect();
        for child in direct_runs {
            doc.remove_subtree(child);
        }
        // Leaves under other wrappers (w:ins, w:sdt, ...) survive the removal.
        for &leaf in &paragraph.leaves {
            set_leaf_text(doc, leaf, "");
        }

        let mut runs = 0;
        let mut hyperlinks = 0;
        for segment in segments {
            if segment.text.is_empty() {
                continue;
            }
            let Some(term) = &segment.term else {
                append_run(doc, paragraph.node, &segment.text, None);
                runs += 1;
                continue;
            };

            match self.links.url_for(&self.language, term) {
                Some(url) => {
                    ensure_relationship_namespace(doc)?;
                    let id = self.ids.next_id();
                    debug!("Linking '{}' to {} as {}", term, url, id);
                    self.relationships.append(&Relationship::hyperlink(&id, url))?;
                    let link = doc.add_child(
                        paragraph.node,
                        XmlNodeData::element_with_attrs(
                            W::hyperlink(),
                            vec![
                                XAttribute::new(R::id(), &id),
                                XAttribute::new(W::history(), "1"),
                            ],
                        ),
                    );
                    append_run(doc, link, &segment.text, Some(&self.accent_color));
                    hyperlinks += 1;
                }
                None => {
                    append_run(doc, paragraph.node, &segment.text, Some(&self.accent_color));
                }
            }
            runs += 1;
        }

        self.hyperlinks_added += hyperlinks;
        debug!(
            "Paragraph {} rebuilt with {} runs, {} hyperlinks",
            paragraph.index, runs, hyperlinks
        );
        Ok(RebuildOutcome::Styled { runs, hyperlinks })
    }
}

/// Puts `text` into the first leaf and empties the rest, leaving run
/// properties alone.
pub fn replace_leaf_text(doc: &mut XmlDocument, leaves: &[NodeId], text: &str) {
    let live: Vec<NodeId> = leaves.iter().copied().filter(|&leaf| doc.is_live(leaf)).collect();
    let mut leaves = live.iter();
    if let Some(&first) = leaves.next() {
        set_leaf_text(doc, first, text);
    }
    for &leaf in leaves {
        set_leaf_text(doc, leaf, "");
    }
}

/// Sets a `w:t` value, marking it `xml:space="preserve"` when the value has
/// leading or trailing whitespace.
pub fn set_leaf_text(doc: &mut XmlDocument, leaf: NodeId, value: &str) {
    if !doc.is_live(leaf) {
        return;
    }
    doc.set_text_value(leaf, value);
    if needs_space_preserve(value) {
        doc.set_attribute(leaf, &XML::space(), "preserve");
    }
}

fn hosts_paragraph(doc: &XmlDocument, node: NodeId) -> bool {
    doc.descendants(node).skip(1).any(|n| doc.has_name(n, &W::p()))
}

fn needs_space_preserve(value: &str) -> bool {
    value.starts_with(char::is_whitespace) || value.ends_with(char::is_whitespace)
}

/// Appends `<w:r>[<w:rPr>b,color,u</w:rPr>]<w:t>text</w:t></w:r>` to `parent`.
fn append_run(doc: &mut XmlDocument, parent: NodeId, text: &str, accent_color: Option<&str>) -> NodeId {
    let run = doc.add_child(parent, XmlNodeData::element(W::r()));

    if let Some(color) = accent_color {
        let rpr = doc.add_child(run, XmlNodeData::element(W::rPr()));
        doc.add_child(rpr, XmlNodeData::element(W::b()));
        doc.add_child(
            rpr,
            XmlNodeData::element_with_attrs(W::color(), vec![XAttribute::new(W::val(), color)]),
        );
        doc.add_child(
            rpr,
            XmlNodeData::element_with_attrs(W::u(), vec![XAttribute::new(W::val(), "single")]),
        );
    }

    let t = doc.add_child(run, XmlNodeData::element(W::t()));
    set_leaf_text(doc, t, text);
    run
}

/// Makes sure the root element declares the relationships namespace so
/// `r:id` attributes serialize with a bound prefix. Returns the prefix in use.
fn ensure_relationship_namespace(doc: &mut XmlDocument) -> Result<String> {
    let root = doc.root().ok_or_else(|| DocxlateError::invalid_package("content part has no root element"))?;
    let attrs = doc
        .get(root)
        .and_then(|d| d.attributes())
        .map(|a| a.to_vec())
        .unwrap_or_default();

    if let Some(existing) = attrs
        .iter()
        .find(|a| a.name.is_namespace_declaration() && a.value == R::NS && a.name.local_name != "xmlns")
    {
        return Ok(existing.name.local_name.clone());
    }

    let declared = |prefix: &str| attrs.iter().any(|a| a.name == XName::xmlns(prefix));
    let prefix = std::iter::once(R::PREFIX.to_string())
        .chain((1..).map(|n| format!("{}{}", R::PREFIX, n)))
        .find(|p| !declared(p.as_str()))
        .unwrap_or_else(|| R::PREFIX.to_string());

    doc.set_attribute(root, &XName::xmlns(&prefix), R::NS);
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::TermIndex;
    use crate::wml::extract::extract_paragraphs;
    use crate::wml::segment::classify;
    use crate::xml::builder::serialize;
    use crate::xml::parser::parse;

    const DOC: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:i/></w:rPr><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p></w:body></w:document>"#;

    fn links() -> LinkTable {
        serde_json::from_str(r#"{"de": {"deepl": "https://www.deepl.com/de"}}"#).unwrap()
    }

    fn index() -> TermIndex {
        TermIndex::build([("DeepL", "deepl"), ("Hallo", "hallo")]).unwrap()
    }

    #[test]
    fn plain_paragraph_keeps_runs() {
        let mut doc = parse(DOC).unwrap();
        let paragraph = extract_paragraphs(&doc).remove(0);
        let table = links();
        let mut rebuilder = Rebuilder::new(RelationshipsPart::empty(), &table, "de", "0563C1");

        let outcome = rebuilder
            .rebuild(&mut doc, &paragraph, &classify("Guten Tag Welt", &TermIndex::empty()))
            .unwrap();

        assert_eq!(outcome, RebuildOutcome::TextReplaced);
        assert_eq!(doc.text_value(paragraph.leaves[0]), "Guten Tag Welt");
        assert_eq!(doc.text_value(paragraph.leaves[1]), "");
        let xml = serialize(&doc).unwrap();
        assert!(xml.contains("<w:rPr><w:i/></w:rPr>"));
        assert_eq!(xml.matches("<w:r>").count(), 2);
    }

    #[test]
    fn styled_paragraph_gets_fresh_runs_and_links() {
        let mut doc = parse(DOC).unwrap();
        let paragraph = extract_paragraphs(&doc).remove(0);
        let table = links();
        let mut rebuilder = Rebuilder::new(RelationshipsPart::empty(), &table, "de", "0563C1");

        let outcome = rebuilder
            .rebuild(&mut doc, &paragraph, &classify("Hallo DeepL", &index()))
            .unwrap();

        assert_eq!(outcome, RebuildOutcome::Styled { runs: 3, hyperlinks: 1 });
        assert_eq!(rebuilder.hyperlinks_added(), 1);

        let xml = serialize(&doc).unwrap();
        assert!(xml.contains(r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#));
        assert!(xml.contains(r#"<w:pPr><w:jc w:val="center"/></w:pPr>"#));
        assert!(!xml.contains("<w:i/>"));
        assert!(xml.contains(
            r#"<w:r><w:rPr><w:b/><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr><w:t>Hallo</w:t></w:r><w:r><w:t xml:space="preserve"> </w:t></w:r><w:hyperlink r:id="rId1" w:history="1"><w:r><w:rPr><w:b/><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr><w:t>DeepL</w:t></w:r></w:hyperlink>"#
        ));

        let rels = rebuilder.into_relationships().relationships();
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].id, "rId1");
        assert_eq!(rels[0].target, "https://www.deepl.com/de");
    }

    #[test]
    fn taken_r_prefix_gets_numbered_alternative() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="urn:other"><w:body/></w:document>"#;
        let mut doc = parse(xml).unwrap();
        assert_eq!(ensure_relationship_namespace(&mut doc).unwrap(), "r1");
        assert_eq!(ensure_relationship_namespace(&mut doc).unwrap(), "r1");
    }

    const TEXT_BOX_DOC: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Outer DeepL</w:t></w:r><w:r><w:txbxContent><w:p><w:r><w:t>Inner</w:t></w:r></w:p></w:txbxContent></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn styled_outer_paragraph_keeps_text_box_paragraph() {
        let mut doc = parse(TEXT_BOX_DOC).unwrap();
        let paragraphs = extract_paragraphs(&doc);
        assert_eq!(paragraphs.len(), 2);
        let table = links();
        let mut rebuilder = Rebuilder::new(RelationshipsPart::empty(), &table, "de", "0563C1");

        let outer = rebuilder
            .rebuild(&mut doc, &paragraphs[0], &classify("Aussen DeepL", &index()))
            .unwrap();
        let inner = rebuilder
            .rebuild(&mut doc, &paragraphs[1], &classify("Innen", &index()))
            .unwrap();

        assert_eq!(outer, RebuildOutcome::Styled { runs: 2, hyperlinks: 1 });
        assert_eq!(inner, RebuildOutcome::TextReplaced);
        let xml = serialize(&doc).unwrap();
        assert!(xml.contains("<w:txbxContent><w:p><w:r><w:t>Innen</w:t></w:r></w:p></w:txbxContent>"));
        assert!(xml.contains(r#"<w:hyperlink r:id="rId1" w:history="1">"#));
        assert!(!xml.contains("Outer"));
    }

    #[test]
    fn removed_paragraph_is_skipped() {
        let mut doc = parse(TEXT_BOX_DOC).unwrap();
        let paragraphs = extract_paragraphs(&doc);
        let outer_runs: Vec<NodeId> = doc.children(paragraphs[0].node).collect();
        for run in outer_runs {
            doc.remove_subtree(run);
        }
        let table = links();
        let mut rebuilder = Rebuilder::new(RelationshipsPart::empty(), &table, "de", "0563C1");

        let outcome = rebuilder
            .rebuild(&mut doc, &paragraphs[1], &classify("Innen DeepL", &index()))
            .unwrap();

        assert_eq!(outcome, RebuildOutcome::Skipped);
        assert_eq!(rebuilder.hyperlinks_added(), 0);
        replace_leaf_text(&mut doc, &paragraphs[1].leaves, "Innen");
        assert!(!serialize(&doc).unwrap().contains("Inner"));
    }

    #[test]
    fn leading_whitespace_sets_space_preserve() {
        let mut doc = parse(DOC).unwrap();
        let paragraph = extract_paragraphs(&doc).remove(0);
        set_leaf_text(&mut doc, paragraph.leaves[1], " tail");
        let xml = serialize(&doc).unwrap();
        assert!(xml.contains(r#"<w:t xml:space="preserve"> tail</w:t>"#));
    }
}
