use crate::xml::arena::XmlDocument;
use crate::xml::namespaces::W;
use indextree::NodeId;

/// One translatable paragraph: its position among all paragraphs of the
/// document, its concatenated text and the text leaves that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedParagraph {
    pub index: usize,
    pub node: NodeId,
    pub text: String,
    pub leaves: Vec<NodeId>,
}

/// Every `w:p` below the root, in document order.
pub fn find_paragraphs(doc: &XmlDocument) -> Vec<NodeId> {
    let Some(root) = doc.root() else {
        return Vec::new();
    };
    let p = W::p();
    doc.descendants(root)
        .filter(|&node| doc.has_name(node, &p))
        .collect()
}

/// The `w:t` leaves owned by `paragraph`, in document order.
///
/// A leaf belongs to its nearest enclosing paragraph, so text of a paragraph
/// nested inside a text box is never attributed to the outer one.
pub fn text_leaves(doc: &XmlDocument, paragraph: NodeId) -> Vec<NodeId> {
    let p = W::p();
    let t = W::t();
    doc.descendants(paragraph)
        .filter(|&node| doc.has_name(node, &t))
        .filter(|&leaf| {
            doc.ancestors(leaf)
                .skip(1)
                .find(|&a| doc.has_name(a, &p))
                == Some(paragraph)
        })
        .collect()
}

/// Paragraphs carrying translatable text. Paragraphs without leaves or with
/// whitespace-only text are left out but keep their place in `index`.
pub fn extract_paragraphs(doc: &XmlDocument) -> Vec<ExtractedParagraph> {
    find_paragraphs(doc)
        .into_iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let leaves = text_leaves(doc, node);
            let text: String = leaves.iter().map(|&leaf| doc.text_value(leaf)).collect();
            if text.trim().is_empty() {
                return None;
            }
            Some(ExtractedParagraph {
                index,
                node,
                text,
                leaves,
            })
        })
        .collect()
}
