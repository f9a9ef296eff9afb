//! Erlang NIF bindings
//!
//! Exposes the parser to Elixir as `GrabXml.Native`. Inputs arrive as
//! binaries and must be valid UTF-8; anything else is a `badarg`.

use rustler::{Binary, Env, NifMap, NifResult, Term};

use crate::options::ParseOptions;
use crate::term::node_to_term;

/// Parse options as an Elixir map. Every key must be present; the Elixir
/// side fills in defaults.
#[derive(NifMap)]
struct NifParseOptions {
    trim_whitespace: bool,
    ignore_comments: bool,
    ignore_instructions: bool,
    void_elements: Vec<String>,
    literal_elements: Vec<String>,
}

impl From<NifParseOptions> for ParseOptions {
    fn from(opts: NifParseOptions) -> Self {
        ParseOptions::default()
            .trim_whitespace(opts.trim_whitespace)
            .ignore_comments(opts.ignore_comments)
            .ignore_instructions(opts.ignore_instructions)
            .void_elements(opts.void_elements)
            .literal_elements(opts.literal_elements)
    }
}

fn input_str<'a>(input: &'a Binary<'_>) -> NifResult<&'a str> {
    std::str::from_utf8(input.as_slice()).map_err(|_| rustler::Error::BadArg)
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse markup with the given options and return the root element term
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_xml<'a>(env: Env<'a>, input: Binary<'a>, opts: NifParseOptions) -> NifResult<Term<'a>> {
    let options: ParseOptions = opts.into();
    let doc = crate::parse_xml(input_str(&input)?, &options);
    Ok(node_to_term(env, doc.root()))
}

/// Parse HTML and return the root element term
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_html<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let doc = crate::html::parse_html(input_str(&input)?);
    Ok(node_to_term(env, doc.root()))
}

rustler::init!("Elixir.GrabXml.Native");
