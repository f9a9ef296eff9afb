//! Elixir Term Conversion
//!
//! Converts the parsed tree to nested Elixir terms:
//! - Element: `{:element, tag, attrs, children}`
//! - Text: bare binary
//! - Comment: `{:comment, text}`
//! - Instruction: `{:instruction, tag, text}`
//! - Literal: `{:literal, tag, attrs, text}`
//!
//! Attributes become a list of `{name, value}` tuples in document order.

use rustler::{Encoder, Env, NewBinary, Term};

use crate::dom::{NodeData, NodeRef, XmlAttribute};

// Pre-defined atoms, created once
rustler::atoms! {
    element,
    comment,
    instruction,
    literal,
}

/// Convert a node and its subtree to an Elixir term
pub fn node_to_term<'a>(env: Env<'a>, node: NodeRef<'_>) -> Term<'a> {
    match &node.node().data {
        NodeData::Element(el) => {
            // Lists are built back to front by prepending
            let mut children = Term::list_new_empty(env);
            for child in node.children().rev() {
                children = children.list_prepend(node_to_term(env, child));
            }
            (
                element(),
                str_to_binary(env, &el.tag),
                attributes_to_term(env, &el.attributes),
                children,
            )
                .encode(env)
        }
        NodeData::Text(text) => str_to_binary(env, text),
        NodeData::Comment(text) => (comment(), str_to_binary(env, text)).encode(env),
        NodeData::Instruction { tag, text } => {
            (instruction(), str_to_binary(env, tag), str_to_binary(env, text)).encode(env)
        }
        NodeData::Literal {
            tag,
            attributes,
            text,
        } => (
            literal(),
            str_to_binary(env, tag),
            attributes_to_term(env, attributes),
            str_to_binary(env, text),
        )
            .encode(env),
    }
}

fn attributes_to_term<'a>(env: Env<'a>, attributes: &[XmlAttribute]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for attr in attributes.iter().rev() {
        let tuple = (str_to_binary(env, &attr.name), str_to_binary(env, &attr.value));
        list = list.list_prepend(tuple.encode(env));
    }
    list
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
