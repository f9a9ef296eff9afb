//! DOM Module - Arena-based node tree
//!
//! Implements the tree produced by the parser:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for parent/child links
//! - Sum-typed node payloads (element, text, comment, instruction, literal)
//! - Rendering back to text, XML and JSON

pub mod document;
pub mod node;
pub mod serialize;

pub use document::{DescendantIter, NodeRef, XmlDocument, ROOT_ID, ROOT_TAG};
pub use node::{ElementData, NodeData, NodeId, NodeKind, XmlAttribute, XmlNode};
