//! Tree rendering
//!
//! Text extraction, XML re-rendering and a JSON dump built on top of the
//! finished tree. None of these follow `parent` references downward.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use super::document::NodeRef;
use super::node::{NodeData, NodeId, XmlAttribute};
use crate::core::entities::{encode_attribute, encode_text};

impl<'a> NodeRef<'a> {
    /// Concatenated text of all descendant text nodes, in document order
    pub fn text_content(&self) -> String {
        match &self.node().data {
            NodeData::Text(text) => text.clone(),
            NodeData::Element(_) => {
                let mut result = String::new();
                collect_text_content(*self, &mut result);
                result
            }
            _ => String::new(),
        }
    }

    /// The node rendered as markup. The root renders only its children.
    pub fn outer_xml(&self) -> String {
        let mut buf = String::with_capacity(256);
        if self.is_root() {
            self.children().for_each(|c| write_xml(c, &mut buf));
        } else {
            write_xml(*self, &mut buf);
        }
        buf
    }

    /// The rendered children of an element
    pub fn inner_xml(&self) -> String {
        let mut buf = String::with_capacity(256);
        self.children().for_each(|c| write_xml(c, &mut buf));
        buf
    }

    /// Pretty-printed JSON dump of this subtree
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.outer_xml())
    }
}

/// Recursively collect text content from descendants
fn collect_text_content(node: NodeRef<'_>, result: &mut String) {
    for child in node.children() {
        match &child.node().data {
            NodeData::Text(text) => result.push_str(text),
            NodeData::Element(_) => collect_text_content(child, result),
            _ => {}
        }
    }
}

/// Serialize a node to XML using an explicit stack, so deep trees cannot
/// overflow the call stack
fn write_xml(node: NodeRef<'_>, buf: &mut String) {
    enum StackEntry {
        Enter(NodeId),
        Close(NodeId),
    }

    let doc = node.document();
    let mut stack: Vec<StackEntry> = Vec::with_capacity(64);
    stack.push(StackEntry::Enter(node.id()));

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Close(id) => {
                if let Some(tag) = doc.get(id).and_then(|n| n.tag()) {
                    buf.push_str("</");
                    buf.push_str(tag);
                    buf.push('>');
                }
            }
            StackEntry::Enter(id) => {
                let current = match doc.get(id) {
                    Some(n) => n,
                    None => continue,
                };

                match &current.data {
                    NodeData::Element(el) => {
                        write_start_tag(&el.tag, &el.attributes, buf);
                        if el.self_closing {
                            buf.push_str(" />");
                        } else {
                            buf.push('>');
                            stack.push(StackEntry::Close(id));
                            stack.extend(el.children.iter().rev().map(|&c| StackEntry::Enter(c)));
                        }
                    }
                    NodeData::Text(text) => buf.push_str(&encode_text(text)),
                    NodeData::Comment(text) => {
                        buf.push_str("<!--");
                        buf.push_str(text);
                        buf.push_str("-->");
                    }
                    NodeData::Instruction { tag, text } => {
                        buf.push('<');
                        buf.push_str(tag);
                        if !text.is_empty() {
                            buf.push(' ');
                            buf.push_str(text);
                        }
                        if tag.starts_with('?') {
                            buf.push('?');
                        }
                        buf.push('>');
                    }
                    NodeData::Literal {
                        tag,
                        attributes,
                        text,
                    } => {
                        write_start_tag(tag, attributes, buf);
                        buf.push('>');
                        buf.push_str(text);
                        buf.push_str("</");
                        buf.push_str(tag);
                        buf.push('>');
                    }
                }
            }
        }
    }
}

fn write_start_tag(tag: &str, attributes: &[XmlAttribute], buf: &mut String) {
    buf.push('<');
    buf.push_str(tag);
    for attr in attributes {
        buf.push(' ');
        buf.push_str(&attr.name);
        buf.push_str("=\"");
        buf.push_str(&encode_attribute(&attr.value));
        buf.push('"');
    }
}

// =============================================================================
// serde support
// =============================================================================

struct AttributeMap<'a>(&'a [XmlAttribute]);

impl Serialize for AttributeMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(&attr.name, &attr.value)?;
        }
        map.end()
    }
}

struct Children<'a>(NodeRef<'a>);

impl Serialize for Children<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.children())
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("XmlNode", 6)?;
        state.serialize_field("type", &self.kind())?;
        state.serialize_field("tag", self.tag().unwrap_or(""))?;
        state.serialize_field("attributes", &AttributeMap(self.attributes()))?;
        state.serialize_field("children", &Children(*self))?;
        state.serialize_field("text", self.text().unwrap_or(""))?;
        state.serialize_field("selfClosing", &self.is_self_closing())?;
        state.end()
    }
}
