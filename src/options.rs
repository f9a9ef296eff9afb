//! Parser configuration

use std::collections::HashSet;

/// Options recognized by [`parse_xml`](crate::parse_xml).
///
/// Every option is off or empty by default, which parses plain XML and
/// keeps every node the document contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Trim whitespace from text, comment and instruction nodes, and drop
    /// text nodes that end up empty
    pub trim_whitespace: bool,
    /// Drop comment nodes
    pub ignore_comments: bool,
    /// Drop processing instruction and declaration nodes
    pub ignore_instructions: bool,
    /// Tags of elements that never have children, such as `<br>` in HTML
    pub void_elements: HashSet<String>,
    /// Tags of elements whose body is kept as unparsed text, such as `<script>` in HTML
    pub literal_elements: HashSet<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trim_whitespace(mut self, enabled: bool) -> Self {
        self.trim_whitespace = enabled;
        self
    }

    pub fn ignore_comments(mut self, enabled: bool) -> Self {
        self.ignore_comments = enabled;
        self
    }

    pub fn ignore_instructions(mut self, enabled: bool) -> Self {
        self.ignore_instructions = enabled;
        self
    }

    pub fn void_elements<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.void_elements = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn literal_elements<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.literal_elements = tags.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub(crate) fn is_void(&self, tag: &str) -> bool {
        !self.void_elements.is_empty() && self.void_elements.contains(tag)
    }

    #[inline]
    pub(crate) fn is_literal(&self, tag: &str) -> bool {
        !self.literal_elements.is_empty() && self.literal_elements.contains(tag)
    }
}
