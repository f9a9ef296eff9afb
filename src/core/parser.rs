//! XML Parser - Single-pass state machine
//!
//! Consumes the input once, left to right, and builds an [`XmlDocument`]
//! as it goes. Nodes are appended the moment their construct starts and
//! are finalized when its closing condition is reached:
//! - Elements, attributes and close tags are scanned byte by byte
//! - Text, comments, CDATA, instructions and literal bodies jump to their
//!   terminator with memchr/memmem
//! - Entity decoding only runs on values where an `&` was seen
//!
//! The parser is lenient: close tags are not matched against the open
//! element and anything left open at the end of input is finalized with
//! the remaining bytes as its content.

use std::borrow::Cow;
use std::collections::HashMap;

use log::{debug, trace};
use memchr::{memchr, memchr2, memchr3, memmem};

use super::entities::decode_text;
use crate::dom::{ElementData, NodeData, NodeId, XmlAttribute, XmlDocument, ROOT_ID};
use crate::options::ParseOptions;

const LOG_TARGET: &str = "grabxml::parser";

/// Current lexical state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseLocation {
    /// Between constructs
    None,
    /// After `<`
    ElementOpened,
    /// After `</`
    ElementClosing,
    /// After `/` inside a start tag, waiting for `>`
    ElementSelfClosing,
    /// Inside a start tag's name
    ElementOpenName,
    /// Inside a close tag's name
    ElementCloseName,
    /// Inside a start tag, between attributes
    InsideElement,
    /// Inside an attribute's name
    AttributeName,
    /// After an attribute's name, before `=` (if any)
    AfterAttributeName,
    /// After `=`, before the value
    BeforeAttributeValue,
    /// Inside an attribute's value
    AttributeValue,
    /// Inside a text run
    InsideText,
    /// Inside `<!-- ... -->`
    InsideComment,
    /// Inside `<![CDATA[ ... ]]>`
    InsideCdata,
    /// Inside `<!NAME ... >`, possibly with a bracketed subset
    InsideDoctype,
    /// Inside `<?target ... ?>`
    InsideInstruction,
    /// Inside the raw body of a literal element
    InsideLiteral,
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Single-use parser holding the cursor state for one input
pub struct Parser<'a, 'o> {
    input: &'a str,
    bytes: &'a [u8],
    options: &'o ParseOptions,
    doc: XmlDocument,
    /// Current lexical state
    location: ParseLocation,
    /// Offset where the current token started
    start: usize,
    /// Node currently being populated
    node: NodeId,
    /// Attribute name waiting for its value
    attribute: &'a str,
    /// Attribute positions on the current start tag, by name
    attribute_slots: HashMap<&'a str, usize>,
    /// Quote that opened the current attribute value
    quote: Option<u8>,
    /// An `&` was seen in the current text run or attribute value
    needs_decoding: bool,
    /// Bracket depth inside a DOCTYPE subset
    subset_depth: usize,
}

impl<'a, 'o> Parser<'a, 'o> {
    pub fn new(input: &'a str, options: &'o ParseOptions) -> Self {
        Parser {
            input,
            bytes: input.as_bytes(),
            options,
            doc: XmlDocument::with_capacity(input.len() / 32 + 1),
            location: ParseLocation::None,
            start: 0,
            node: ROOT_ID,
            attribute: "",
            attribute_slots: HashMap::new(),
            quote: None,
            needs_decoding: false,
            subset_depth: 0,
        }
    }

    /// Run the scan to the end of input and return the finished tree
    pub fn parse(mut self) -> XmlDocument {
        trace!(target: LOG_TARGET, "parsing {} bytes", self.bytes.len());

        let mut pos = 0;
        while pos < self.bytes.len() {
            pos = self.step(pos);
        }
        self.finish();

        trace!(
            target: LOG_TARGET,
            "parsed {} bytes into {} nodes",
            self.bytes.len(),
            self.doc.node_count()
        );
        self.doc
    }

    /// Handle the byte at `pos` and return the next position to look at
    fn step(&mut self, pos: usize) -> usize {
        let b = self.bytes[pos];
        match self.location {
            ParseLocation::None => {
                if b == b'<' {
                    self.update(ParseLocation::ElementOpened, pos);
                    pos + 1
                } else {
                    self.open(NodeData::Text(String::new()));
                    self.needs_decoding = false;
                    self.update(ParseLocation::InsideText, pos);
                    // Re-read this byte as text so a leading `&` is noticed
                    pos
                }
            }
            ParseLocation::ElementOpened => match b {
                b'/' => {
                    self.update(ParseLocation::ElementClosing, pos);
                    pos + 1
                }
                _ if is_whitespace(b) => pos + 1,
                b'!' if self.bytes[pos + 1..].starts_with(b"--") => {
                    self.open(NodeData::Comment(String::new()));
                    self.update(ParseLocation::InsideComment, pos + 3);
                    pos + 3
                }
                b'!' if self.is_cdata_start(pos) => {
                    self.open(NodeData::Text(String::new()));
                    self.update(ParseLocation::InsideCdata, pos + 8);
                    pos + 8
                }
                _ => {
                    self.open(NodeData::Element(ElementData::default()));
                    self.attribute_slots.clear();
                    self.update(ParseLocation::ElementOpenName, pos);
                    pos + 1
                }
            },
            ParseLocation::ElementClosing => match b {
                b'>' => {
                    self.close_element("");
                    self.update(ParseLocation::None, pos + 1);
                    pos + 1
                }
                _ if is_whitespace(b) => pos + 1,
                _ => {
                    self.update(ParseLocation::ElementCloseName, pos);
                    pos + 1
                }
            },
            ParseLocation::ElementSelfClosing => {
                if b == b'>' {
                    self.close_self();
                    self.update(ParseLocation::None, pos + 1);
                }
                pos + 1
            }
            ParseLocation::ElementOpenName => self.scan_open_name(b, pos),
            ParseLocation::ElementCloseName => match memchr(b'>', &self.bytes[pos..]) {
                Some(offset) => {
                    let end = pos + offset;
                    let name = self.slice(self.start, end).trim_end();
                    self.close_element(name);
                    self.update(ParseLocation::None, end + 1);
                    end + 1
                }
                None => self.bytes.len(),
            },
            ParseLocation::InsideElement => match b {
                b'/' => {
                    self.update(ParseLocation::ElementSelfClosing, pos);
                    pos + 1
                }
                b'>' => self.end_start_tag(pos),
                // Stray `?` (e.g. at the end of a declaration) and whitespace are skipped
                b'?' => pos + 1,
                _ if is_whitespace(b) => pos + 1,
                _ => {
                    self.update(ParseLocation::AttributeName, pos);
                    pos + 1
                }
            },
            ParseLocation::AttributeName => match b {
                b'=' => {
                    self.attribute = self.slice(self.start, pos);
                    self.update(ParseLocation::BeforeAttributeValue, pos + 1);
                    pos + 1
                }
                b'>' => {
                    self.attribute = self.slice(self.start, pos);
                    self.set_attribute(String::new());
                    self.end_start_tag(pos)
                }
                b'/' => {
                    self.attribute = self.slice(self.start, pos);
                    self.set_attribute(String::new());
                    self.update(ParseLocation::ElementSelfClosing, pos);
                    pos + 1
                }
                _ if is_whitespace(b) => {
                    self.attribute = self.slice(self.start, pos);
                    self.update(ParseLocation::AfterAttributeName, pos + 1);
                    pos + 1
                }
                _ => pos + 1,
            },
            ParseLocation::AfterAttributeName => match b {
                b'=' => {
                    self.update(ParseLocation::BeforeAttributeValue, pos + 1);
                    pos + 1
                }
                _ if is_whitespace(b) => pos + 1,
                b'/' => {
                    self.set_attribute(String::new());
                    self.update(ParseLocation::ElementSelfClosing, pos);
                    pos + 1
                }
                b'>' => {
                    self.set_attribute(String::new());
                    self.end_start_tag(pos)
                }
                _ => {
                    // A bare name followed by another attribute
                    self.set_attribute(String::new());
                    self.update(ParseLocation::AttributeName, pos);
                    pos + 1
                }
            },
            ParseLocation::BeforeAttributeValue => match b {
                b'"' | b'\'' => {
                    self.quote = Some(b);
                    self.needs_decoding = false;
                    self.update(ParseLocation::AttributeValue, pos + 1);
                    pos + 1
                }
                _ if is_whitespace(b) => pos + 1,
                b'>' => {
                    self.set_attribute(String::new());
                    self.end_start_tag(pos)
                }
                _ => {
                    self.quote = None;
                    self.needs_decoding = false;
                    self.update(ParseLocation::AttributeValue, pos);
                    pos
                }
            },
            ParseLocation::AttributeValue => self.scan_attribute_value(b, pos),
            ParseLocation::InsideText => self.scan_text(pos),
            ParseLocation::InsideComment => match memmem::find(&self.bytes[pos..], b"-->") {
                Some(offset) => {
                    let end = pos + offset;
                    self.close_ignorable(end, self.options.ignore_comments);
                    end + 3
                }
                None => self.bytes.len(),
            },
            ParseLocation::InsideCdata => match memmem::find(&self.bytes[pos..], b"]]>") {
                Some(offset) => {
                    let end = pos + offset;
                    self.close_text(end, false);
                    self.update(ParseLocation::None, end + 3);
                    end + 3
                }
                None => self.bytes.len(),
            },
            ParseLocation::InsideDoctype => self.scan_doctype(pos),
            ParseLocation::InsideInstruction => match memmem::find(&self.bytes[pos..], b"?>") {
                Some(offset) => {
                    let end = pos + offset;
                    self.close_ignorable(end, self.options.ignore_instructions);
                    end + 2
                }
                None => self.bytes.len(),
            },
            ParseLocation::InsideLiteral => match self.find_literal_end(pos) {
                Some((end, resume)) => {
                    self.close_literal(end);
                    self.update(ParseLocation::None, resume);
                    resume
                }
                None => self.bytes.len(),
            },
        }
    }

    fn scan_open_name(&mut self, b: u8, pos: usize) -> usize {
        match b {
            b'>' => {
                self.set_tag(pos);
                if self.name_is_instruction() {
                    // `<!DOCTYPE>` or `<?xml?>`: an instruction with no text
                    self.make_instruction();
                    self.close_ignorable(pos, self.options.ignore_instructions);
                    pos + 1
                } else {
                    self.end_start_tag(pos)
                }
            }
            _ if is_whitespace(b) => {
                self.set_tag(pos);
                match self.bytes.get(self.start) {
                    Some(b'!') => {
                        self.make_instruction();
                        self.subset_depth = 0;
                        self.update(ParseLocation::InsideDoctype, pos + 1);
                    }
                    Some(b'?') => {
                        self.make_instruction();
                        self.update(ParseLocation::InsideInstruction, pos + 1);
                    }
                    _ => self.update(ParseLocation::InsideElement, pos + 1),
                }
                pos + 1
            }
            b'/' if !self.name_is_instruction() => {
                self.set_tag(pos);
                self.update(ParseLocation::ElementSelfClosing, pos);
                pos + 1
            }
            _ => pos + 1,
        }
    }

    fn scan_attribute_value(&mut self, b: u8, pos: usize) -> usize {
        match self.quote {
            Some(quote) => match memchr2(quote, b'&', &self.bytes[pos..]) {
                Some(offset) => {
                    let at = pos + offset;
                    if self.bytes[at] == b'&' {
                        self.needs_decoding = true;
                    } else {
                        self.finish_attribute(at);
                        self.update(ParseLocation::InsideElement, at + 1);
                    }
                    at + 1
                }
                None => self.bytes.len(),
            },
            None => match b {
                _ if is_whitespace(b) => {
                    self.finish_attribute(pos);
                    self.update(ParseLocation::InsideElement, pos + 1);
                    pos + 1
                }
                b'>' => {
                    self.finish_attribute(pos);
                    self.end_start_tag(pos)
                }
                b'&' => {
                    self.needs_decoding = true;
                    pos + 1
                }
                _ => pos + 1,
            },
        }
    }

    fn scan_text(&mut self, pos: usize) -> usize {
        let rest = &self.bytes[pos..];
        let found = if self.needs_decoding {
            memchr(b'<', rest)
        } else {
            memchr2(b'<', b'&', rest)
        };
        match found {
            Some(offset) => {
                let at = pos + offset;
                if self.bytes[at] == b'&' {
                    self.needs_decoding = true;
                } else {
                    self.close_text(at, self.needs_decoding);
                    self.update(ParseLocation::ElementOpened, at);
                }
                at + 1
            }
            None => self.bytes.len(),
        }
    }

    fn scan_doctype(&mut self, pos: usize) -> usize {
        let mut at = pos;
        while let Some(offset) = memchr3(b'[', b']', b'>', &self.bytes[at..]) {
            at += offset;
            match self.bytes[at] {
                b'[' => self.subset_depth += 1,
                b']' => self.subset_depth = self.subset_depth.saturating_sub(1),
                _ if self.subset_depth == 0 => {
                    self.close_ignorable(at, self.options.ignore_instructions);
                    return at + 1;
                }
                _ => {}
            }
            at += 1;
        }
        self.bytes.len()
    }

    /// Locate `</tag` for the current literal element. Returns the end of
    /// the body and the position just past the close tag's `>`.
    fn find_literal_end(&self, pos: usize) -> Option<(usize, usize)> {
        let tag = self.doc.get(self.node).and_then(|n| n.tag()).unwrap_or("");
        let mut search = pos;
        while let Some(offset) = memmem::find(&self.bytes[search..], b"</") {
            let at = search + offset;
            let name_end = at + 2 + tag.len();
            let name_matches = self.bytes.get(at + 2..name_end) == Some(tag.as_bytes());
            let boundary = match self.bytes.get(name_end) {
                None => true,
                Some(&b) => b == b'>' || b == b'/' || is_whitespace(b),
            };
            if name_matches && boundary {
                let resume = memchr(b'>', &self.bytes[name_end..])
                    .map_or(self.bytes.len(), |o| name_end + o + 1);
                return Some((at, resume));
            }
            search = at + 2;
        }
        None
    }

    #[inline]
    fn is_cdata_start(&self, pos: usize) -> bool {
        match self.bytes.get(pos + 1..pos + 8) {
            Some(marker) => {
                marker[0] == b'[' && marker[6] == b'[' && marker[1..6].eq_ignore_ascii_case(b"CDATA")
            }
            None => false,
        }
    }

    /// True if the tag being named started with `!` or `?`
    #[inline]
    fn name_is_instruction(&self) -> bool {
        matches!(self.bytes.get(self.start), Some(b'!' | b'?'))
    }

    // =========================================================================
    // Tree updates
    // =========================================================================

    #[inline]
    fn update(&mut self, location: ParseLocation, start: usize) {
        self.location = location;
        self.start = start;
    }

    #[inline]
    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.input.get(start..end).unwrap_or_default()
    }

    /// Append a node under the current node and make it current
    fn open(&mut self, data: NodeData) {
        self.node = self.doc.append(self.node, data);
    }

    /// Make the current node's parent current
    fn pop(&mut self) {
        self.node = self.doc.parent(self.node).unwrap_or(ROOT_ID);
    }

    /// Drop the current node and make its parent current
    fn discard(&mut self) {
        let id = self.node;
        self.pop();
        self.doc.discard(id);
    }

    fn set_text(&mut self, text: String) {
        if let Some(node) = self.doc.get_mut(self.node) {
            node.data.set_text(text);
        }
    }

    fn set_tag(&mut self, end: usize) {
        let mut tag = self.slice(self.start, end);
        if tag.starts_with('?') && tag.len() > 1 {
            tag = tag.strip_suffix('?').unwrap_or(tag);
        }
        if let Some(el) = self.doc.get_mut(self.node).and_then(|n| n.element_mut()) {
            el.tag = tag.to_string();
        }
    }

    fn make_instruction(&mut self) {
        if let Some(node) = self.doc.get_mut(self.node) {
            node.data.make_instruction();
        }
    }

    /// Store the pending attribute. A repeated name replaces the earlier value in place.
    fn set_attribute(&mut self, value: String) {
        let name = self.attribute;
        let Some(el) = self.doc.get_mut(self.node).and_then(|n| n.element_mut()) else {
            return;
        };
        match self.attribute_slots.get(name).copied() {
            Some(slot) => {
                if let Some(existing) = el.attributes.get_mut(slot) {
                    existing.value = value;
                }
            }
            None => {
                self.attribute_slots.insert(name, el.attributes.len());
                el.attributes.push(XmlAttribute::new(name, value));
            }
        }
    }

    fn finish_attribute(&mut self, end: usize) {
        let raw = self.slice(self.start, end);
        let value = if self.needs_decoding {
            decode_text(raw).into_owned()
        } else {
            raw.to_string()
        };
        self.set_attribute(value);
    }

    /// Handle the `>` that ends a start tag
    fn end_start_tag(&mut self, pos: usize) -> usize {
        let (is_void, is_literal) = match self.doc.get(self.node).and_then(|n| n.tag()) {
            Some(tag) => (self.options.is_void(tag), self.options.is_literal(tag)),
            None => (false, false),
        };

        if is_void {
            self.close_self();
            self.update(ParseLocation::None, pos + 1);
        } else if is_literal {
            if let Some(node) = self.doc.get_mut(self.node) {
                node.data.make_literal();
            }
            self.update(ParseLocation::InsideLiteral, pos + 1);
        } else {
            self.update(ParseLocation::None, pos + 1);
        }
        pos + 1
    }

    /// Finalize the current element without children
    fn close_self(&mut self) {
        if let Some(el) = self.doc.get_mut(self.node).and_then(|n| n.element_mut()) {
            el.self_closing = true;
        }
        self.pop();
    }

    /// Handle a close tag. The name is not checked against the open element.
    fn close_element(&mut self, name: &str) {
        if self.node == ROOT_ID {
            debug!(target: LOG_TARGET, "close tag </{}> with no open element", name);
            return;
        }
        if let Some(tag) = self.doc.get(self.node).and_then(|n| n.tag()) {
            if tag != name {
                debug!(target: LOG_TARGET, "close tag </{}> closes <{}>", name, tag);
            }
        }
        self.pop();
    }

    /// Finalize a text node ending at `end`
    fn close_text(&mut self, end: usize, decode: bool) {
        let raw = self.slice(self.start, end);
        let text = if decode { decode_text(raw) } else { Cow::Borrowed(raw) };

        if self.options.trim_whitespace {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                self.discard();
                return;
            }
            let trimmed = trimmed.to_string();
            self.set_text(trimmed);
        } else {
            self.set_text(text.into_owned());
        }
        self.pop();
    }

    /// Finalize a comment or instruction ending at `end`, or drop it
    fn close_ignorable(&mut self, end: usize, ignore: bool) {
        if ignore {
            self.discard();
        } else {
            let raw = self.slice(self.start, end);
            let text = if self.options.trim_whitespace { raw.trim() } else { raw };
            self.set_text(text.to_string());
            self.pop();
        }
        self.update(ParseLocation::None, end);
    }

    fn close_literal(&mut self, end: usize) {
        let text = self.slice(self.start, end).trim().to_string();
        self.set_text(text);
        self.pop();
    }

    /// Finalize whatever is still open at end of input
    fn finish(&mut self) {
        let len = self.bytes.len();
        match self.location {
            ParseLocation::None => {}
            ParseLocation::InsideText => self.close_text(len, self.needs_decoding),
            ParseLocation::InsideCdata => {
                debug!(target: LOG_TARGET, "unterminated CDATA section at {}", self.start);
                self.close_text(len, false);
            }
            ParseLocation::InsideComment => {
                debug!(target: LOG_TARGET, "unterminated comment at {}", self.start);
                self.close_ignorable(len, self.options.ignore_comments);
            }
            ParseLocation::InsideDoctype | ParseLocation::InsideInstruction => {
                debug!(target: LOG_TARGET, "unterminated instruction at {}", self.start);
                self.close_ignorable(len, self.options.ignore_instructions);
            }
            ParseLocation::InsideLiteral => {
                debug!(target: LOG_TARGET, "unterminated literal element at {}", self.start);
                self.close_literal(len);
            }
            ParseLocation::ElementOpenName => {
                debug!(target: LOG_TARGET, "unterminated start tag at {}", self.start);
                self.set_tag(len);
            }
            ParseLocation::AttributeName => {
                debug!(target: LOG_TARGET, "unterminated start tag at {}", self.start);
                self.attribute = self.slice(self.start, len);
                self.set_attribute(String::new());
            }
            ParseLocation::AfterAttributeName | ParseLocation::BeforeAttributeValue => {
                debug!(target: LOG_TARGET, "unterminated start tag at {}", self.start);
                self.set_attribute(String::new());
            }
            ParseLocation::AttributeValue => {
                debug!(target: LOG_TARGET, "unterminated attribute value at {}", self.start);
                self.finish_attribute(len);
            }
            ParseLocation::ElementOpened
            | ParseLocation::ElementClosing
            | ParseLocation::ElementSelfClosing
            | ParseLocation::ElementCloseName
            | ParseLocation::InsideElement => {
                debug!(target: LOG_TARGET, "input ended inside markup at {}", self.start);
            }
        }
    }
}
