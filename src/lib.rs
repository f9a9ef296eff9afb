//! grabxml - Fast, lenient XML/HTML parsing into a node tree
//!
//! A single left-to-right pass over the input builds an arena-backed tree
//! under a synthetic `#root` element. Parsing never fails: malformed input
//! still yields the best tree the scan could build.
//!
//! ```
//! use grabxml::{parse_xml, ParseOptions};
//!
//! let doc = parse_xml("<a href='x'>hi</a>", &ParseOptions::default());
//! let a = doc.root().child(0).unwrap();
//! assert_eq!(a.attribute("href"), Some("x"));
//! assert_eq!(a.text_content(), "hi");
//! ```
//!
//! Features:
//! - `nif`: Erlang NIF bindings via rustler
//! - `mimalloc`: mimalloc as the global allocator

pub mod core;
pub mod dom;
pub mod html;
pub mod options;

#[cfg(feature = "nif")]
mod nif;
#[cfg(feature = "nif")]
mod term;

pub use crate::core::entities::decode_text;
pub use crate::core::parser::ParseLocation;
pub use dom::{NodeData, NodeId, NodeKind, NodeRef, XmlAttribute, XmlDocument, XmlNode, ROOT_TAG};
pub use html::{parse_html, LITERAL_ELEMENTS, VOID_ELEMENTS};
pub use options::ParseOptions;

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Parse markup into a tree rooted at a synthetic `#root` element
pub fn parse_xml(input: &str, options: &ParseOptions) -> XmlDocument {
    crate::core::Parser::new(input, options).parse()
}
