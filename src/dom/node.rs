//! XML Node representation
//!
//! Nodes live in the document arena and refer to each other by `NodeId`.
//! Ownership runs parent → children; the `parent` field is a plain index
//! used for upward navigation only.

use serde::Serialize;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Element node, including the synthetic `#root`
    Element,
    /// Text content (CDATA sections are stored as text)
    Text,
    /// Comment
    Comment,
    /// Processing instruction or declaration, such as `<?xml ...?>` or `<!DOCTYPE ...>`
    Instruction,
    /// Element whose body was captured as raw text, such as `<script>` in HTML
    Literal,
}

/// Attribute as written on a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub name: String,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        XmlAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Payload of an element node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// Tag name as written, including any namespace prefix
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<XmlAttribute>,
    /// Child nodes in document order
    pub children: Vec<NodeId>,
    /// Closed with `/>` or matched a configured void element
    pub self_closing: bool,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        ElementData {
            tag: tag.into(),
            ..ElementData::default()
        }
    }

    /// Set an attribute, replacing the value in place if the name was already seen
    pub fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(XmlAttribute::new(name, value)),
        }
    }
}

/// Kind-specific node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
    Comment(String),
    Instruction { tag: String, text: String },
    Literal {
        tag: String,
        attributes: Vec<XmlAttribute>,
        text: String,
    },
}

impl NodeData {
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Instruction { .. } => NodeKind::Instruction,
            NodeData::Literal { .. } => NodeKind::Literal,
        }
    }

    /// Replace the text payload. Elements carry no text and are left untouched.
    pub(crate) fn set_text(&mut self, value: String) {
        match self {
            NodeData::Text(text)
            | NodeData::Comment(text)
            | NodeData::Instruction { text, .. }
            | NodeData::Literal { text, .. } => *text = value,
            NodeData::Element(_) => {}
        }
    }

    /// Reclassify an element whose name started with `!` or `?`
    pub(crate) fn make_instruction(&mut self) {
        if let NodeData::Element(el) = self {
            let tag = std::mem::take(&mut el.tag);
            *self = NodeData::Instruction {
                tag,
                text: String::new(),
            };
        }
    }

    /// Reclassify an element whose body is captured verbatim
    pub(crate) fn make_literal(&mut self) {
        if let NodeData::Element(el) = self {
            let tag = std::mem::take(&mut el.tag);
            let attributes = std::mem::take(&mut el.attributes);
            *self = NodeData::Literal {
                tag,
                attributes,
                text: String::new(),
            };
        }
    }
}

/// An XML node in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    /// Enclosing element (None for the root)
    pub parent: Option<NodeId>,
    pub data: NodeData,
}

impl XmlNode {
    pub fn new(parent: Option<NodeId>, data: NodeData) -> Self {
        XmlNode { parent, data }
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Tag name for elements, instructions and literals
    pub fn tag(&self) -> Option<&str> {
        match &self.data {
            NodeData::Element(el) => Some(&el.tag),
            NodeData::Instruction { tag, .. } | NodeData::Literal { tag, .. } => Some(tag),
            NodeData::Text(_) | NodeData::Comment(_) => None,
        }
    }

    /// Text payload for every kind except elements
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text)
            | NodeData::Comment(text)
            | NodeData::Instruction { text, .. }
            | NodeData::Literal { text, .. } => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        match &self.data {
            NodeData::Element(el) => &el.attributes,
            NodeData::Literal { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Get attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.data {
            NodeData::Element(el) => &el.children,
            _ => &[],
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn is_self_closing(&self) -> bool {
        matches!(&self.data, NodeData::Element(el) if el.self_closing)
    }

    pub(crate) fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }
}
