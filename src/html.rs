//! HTML profile
//!
//! HTML is parsed by the same state machine as XML. The only difference is
//! the option set: void elements close themselves and the bodies of
//! `<script>` and `<style>` are captured verbatim.

use crate::dom::XmlDocument;
use crate::options::ParseOptions;

/// Elements that never have children
/// (<https://developer.mozilla.org/en-US/docs/Glossary/Void_element>)
pub const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose body is raw text
pub const LITERAL_ELEMENTS: [&str; 2] = ["script", "style"];

impl ParseOptions {
    /// Options for HTML documents: the void and literal element lists set,
    /// every flag off
    pub fn html() -> Self {
        ParseOptions::default()
            .void_elements(VOID_ELEMENTS)
            .literal_elements(LITERAL_ELEMENTS)
    }
}

/// Parse an HTML document
pub fn parse_html(input: &str) -> XmlDocument {
    crate::parse_xml(input, &ParseOptions::html())
}
