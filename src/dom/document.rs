//! XML Document - Arena-based tree
//!
//! Nodes are stored in a single `Vec` and addressed by `NodeId`. The
//! synthetic `#root` element always sits at index 0.

use super::node::{ElementData, NodeData, NodeId, NodeKind, XmlAttribute, XmlNode};

/// Tag name of the synthetic root element
pub const ROOT_TAG: &str = "#root";

/// Id of the synthetic root element
pub const ROOT_ID: NodeId = 0;

/// A parsed document stored in arena format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        XmlDocument::new()
    }
}

impl XmlDocument {
    /// Create a document holding only the `#root` element
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(XmlNode::new(None, NodeData::Element(ElementData::new(ROOT_TAG))));
        XmlDocument { nodes }
    }

    /// Get the root id
    #[inline]
    pub fn root_id(&self) -> NodeId {
        ROOT_ID
    }

    /// Borrowed handle on the root element
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { doc: self, id: ROOT_ID }
    }

    /// Get a node by ID
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Borrowed handle on a node, if the id is valid
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.get(id).map(|_| NodeRef { doc: self, id })
    }

    /// Parent of a node (None for the root or an unknown id)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Children of a node in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(XmlNode::children).unwrap_or(&[])
    }

    /// Iterate over all descendants of a node (depth-first, document order)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let stack = self.children(id).iter().rev().copied().collect();
        DescendantIter { doc: self, stack }
    }

    /// Get total number of nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Append a new node as the last child of `parent`
    pub(crate) fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(XmlNode::new(Some(parent), data));
        if let Some(el) = self.nodes.get_mut(parent as usize).and_then(XmlNode::element_mut) {
            el.children.push(id);
        }
        id
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut XmlNode> {
        self.nodes.get_mut(id as usize)
    }

    /// Detach a node from its parent. The most recently created node is
    /// also dropped from the arena.
    pub(crate) fn discard(&mut self, id: NodeId) {
        if id == ROOT_ID {
            return;
        }
        let parent = self.parent(id);
        if let Some(el) = parent
            .and_then(|p| self.nodes.get_mut(p as usize))
            .and_then(XmlNode::element_mut)
        {
            if el.children.last() == Some(&id) {
                el.children.pop();
            } else {
                el.children.retain(|&c| c != id);
            }
        }
        if id as usize + 1 == self.nodes.len() {
            self.nodes.pop();
        }
    }
}

/// Iterator over descendant nodes (depth-first)
pub struct DescendantIter<'d> {
    doc: &'d XmlDocument,
    stack: Vec<NodeId>,
}

impl<'d> Iterator for DescendantIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Reverse so the first child is visited first
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}

/// Borrowed view of one node inside its document
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a XmlDocument,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn document(&self) -> &'a XmlDocument {
        self.doc
    }

    /// The underlying arena node
    pub fn node(&self) -> &'a XmlNode {
        // NodeRef is only handed out for ids present in the arena
        &self.doc.nodes[self.id as usize]
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    pub fn tag(&self) -> Option<&'a str> {
        self.node().tag()
    }

    pub fn text(&self) -> Option<&'a str> {
        self.node().text()
    }

    pub fn attributes(&self) -> &'a [XmlAttribute] {
        self.node().attributes()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node().attribute(name)
    }

    pub fn is_self_closing(&self) -> bool {
        self.node().is_self_closing()
    }

    /// True for the synthetic `#root` element
    pub fn is_root(&self) -> bool {
        self.node().parent.is_none()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let doc = self.doc;
        self.node().parent.map(|id| NodeRef { doc, id })
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef<'a>> + ExactSizeIterator + 'a {
        let doc = self.doc;
        self.node()
            .children()
            .iter()
            .map(move |&id| NodeRef { doc, id })
    }

    pub fn child(&self, index: usize) -> Option<NodeRef<'a>> {
        let doc = self.doc;
        self.node()
            .children()
            .get(index)
            .map(|&id| NodeRef { doc, id })
    }

    pub fn child_count(&self) -> usize {
        self.node().children().len()
    }

    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        doc.descendants(self.id).map(move |id| NodeRef { doc, id })
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("data", &self.node().data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlDocument {
        // <a><b><c/></b>text</a>
        let mut doc = XmlDocument::new();
        let a = doc.append(ROOT_ID, NodeData::Element(ElementData::new("a")));
        let b = doc.append(a, NodeData::Element(ElementData::new("b")));
        doc.append(b, NodeData::Element(ElementData::new("c")));
        doc.append(a, NodeData::Text("text".to_string()));
        doc
    }

    #[test]
    fn test_new_document_has_root() {
        let doc = XmlDocument::new();
        let root = doc.root();
        assert!(root.is_root());
        assert_eq!(root.kind(), NodeKind::Element);
        assert_eq!(root.tag(), Some(ROOT_TAG));
        assert!(root.attributes().is_empty());
        assert_eq!(root.child_count(), 0);
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn test_append_links_parent() {
        let doc = sample();
        let a = doc.root().child(0).unwrap();
        assert_eq!(a.tag(), Some("a"));
        assert_eq!(a.parent().map(|p| p.id()), Some(ROOT_ID));

        let kinds: Vec<_> = a.children().map(|c| c.kind()).collect();
        assert_eq!(kinds, [NodeKind::Element, NodeKind::Text]);
        for child in a.children() {
            assert_eq!(child.parent().map(|p| p.id()), Some(a.id()));
        }
    }

    #[test]
    fn test_descendants_document_order() {
        let doc = sample();
        let tags: Vec<_> = doc
            .root()
            .descendants()
            .map(|n| n.tag().or(n.text()).unwrap_or_default().to_string())
            .collect();
        assert_eq!(tags, ["a", "b", "c", "text"]);
    }

    #[test]
    fn test_discard_last_node() {
        let mut doc = sample();
        let count = doc.node_count();
        let a = doc.children(ROOT_ID)[0];
        let text = doc.append(a, NodeData::Comment("gone".to_string()));
        doc.discard(text);

        assert_eq!(doc.node_count(), count);
        assert_eq!(doc.children(a).len(), 2);
    }

    #[test]
    fn test_discard_root_is_noop() {
        let mut doc = XmlDocument::new();
        doc.discard(ROOT_ID);
        assert_eq!(doc.node_count(), 1);
    }
}
