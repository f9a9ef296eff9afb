//! Core parsing primitives
//!
//! - Entities: entity decoding and markup escaping, with Cow for zero-copy
//! - Parser: the single-pass state machine that builds the tree

pub mod entities;
pub mod parser;

pub use parser::{ParseLocation, Parser};
