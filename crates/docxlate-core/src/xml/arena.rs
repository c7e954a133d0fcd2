use super::node::XmlNodeData;
use super::xname::{XAttribute, XName};
use indextree::{Arena, NodeId};
use log::debug;

/// Owned XML tree. Nodes are addressed by stable [`NodeId`] handles, so a
/// reference collected during extraction stays valid while siblings are rewritten.
#[derive(Debug)]
pub struct XmlDocument {
    arena: Arena<XmlNodeData>,
    root: Option<NodeId>,
}

impl XmlDocument {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// False once `id` was removed, even if its slot has been reused since.
    pub fn is_live(&self, id: NodeId) -> bool {
        !id.is_removed(&self.arena)
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlNodeData> {
        if !self.is_live(id) {
            return None;
        }
        self.arena.get(id).map(|node| node.get())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlNodeData> {
        if !self.is_live(id) {
            return None;
        }
        self.arena.get_mut(id).map(|node| node.get_mut())
    }

    pub fn add_root(&mut self, data: XmlNodeData) -> NodeId {
        let id = self.arena.new_node(data);
        self.root = Some(id);
        id
    }

    /// Appends a new node below `parent`. A removed parent leaves the tree
    /// unchanged and the returned id is already dead.
    pub fn add_child(&mut self, parent: NodeId, data: XmlNodeData) -> NodeId {
        let child = self.arena.new_node(data);
        if let Err(e) = parent.checked_append(child, &mut self.arena) {
            debug!("Dropping child of {:?}: {}", parent, e);
            child.remove(&mut self.arena);
        }
        child
    }

    /// Removes `node` together with everything below it.
    pub fn remove_subtree(&mut self, node: NodeId) {
        if self.is_live(node) {
            node.remove_subtree(&mut self.arena);
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &XName, value: &str) {
        if let Some(node_data) = self.get_mut(node) {
            if let Some(attrs) = node_data.attributes_mut() {
                if let Some(attr) = attrs.iter_mut().find(|a| &a.name == name) {
                    attr.value = value.to_string();
                } else {
                    attrs.push(XAttribute::new(name.clone(), value));
                }
            }
        }
    }

    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.is_live(parent)
            .then(|| parent.children(&self.arena))
            .into_iter()
            .flatten()
    }

    /// Pre-order walk starting at (and including) `node`; this is document order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.is_live(node)
            .then(|| node.descendants(&self.arena))
            .into_iter()
            .flatten()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if !self.is_live(node) {
            return None;
        }
        self.arena.get(node)?.parent()
    }

    /// Walks upward starting at (and including) `node`.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.is_live(node)
            .then(|| node.ancestors(&self.arena))
            .into_iter()
            .flatten()
    }

    pub fn has_name(&self, node: NodeId, name: &XName) -> bool {
        self.get(node).map(|d| d.has_name(name)).unwrap_or(false)
    }

    pub fn elements_by_name<'a>(
        &'a self,
        parent: NodeId,
        name: &'a XName,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent)
            .filter(move |&child_id| self.has_name(child_id, name))
    }

    /// Concatenated value of the direct text children of `node`.
    pub fn text_value(&self, node: NodeId) -> String {
        self.children(node)
            .filter_map(|child| self.get(child).and_then(|d| d.text_content()))
            .collect()
    }

    /// Replaces the direct text children of `node` with a single text node.
    /// An empty value leaves the element without text children.
    pub fn set_text_value(&mut self, node: NodeId, value: &str) {
        if !self.is_live(node) {
            return;
        }
        let text_children: Vec<NodeId> = self
            .children(node)
            .filter(|&child| self.get(child).map(|d| d.is_text()).unwrap_or(false))
            .collect();
        for child in text_children {
            self.remove_subtree(child);
        }
        if !value.is_empty() {
            self.add_child(node, XmlNodeData::text(value));
        }
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}
