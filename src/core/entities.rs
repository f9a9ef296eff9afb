//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Decoding is a single forward pass; replacement text is never re-scanned.
//! Uses Cow for zero-copy when no entities are present.

use memchr::memchr;
use std::borrow::Cow;

/// Longest reference body looked at after `&`, terminator included.
/// `&#x10FFFF;` needs 9; the slack admits a few leading zeros.
const MAX_ENTITY_LEN: usize = 16;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
pub fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while pos < bytes.len() {
        let amp_pos = match memchr(b'&', &bytes[pos..]) {
            Some(offset) => pos + offset,
            None => {
                result.push_str(&input[pos..]);
                break;
            }
        };
        result.push_str(&input[pos..amp_pos]);

        // Only look for `;` in a short window so each `&` costs constant time
        let window_end = (amp_pos + 1 + MAX_ENTITY_LEN).min(bytes.len());
        let decoded = memchr(b';', &bytes[amp_pos..window_end])
            .and_then(|semi| decode_entity(input.get(amp_pos + 1..amp_pos + semi)?).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                result.push(c);
                pos = amp_pos + semi + 1;
            }
            None => {
                // Unknown entity or no semicolon, keep the ampersand
                result.push('&');
                pos = amp_pos + 1;
            }
        }
    }

    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => decode_numeric_entity(entity.strip_prefix('#')?),
    }
}

/// Decode a numeric character reference (without the leading #)
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let (digits, radix) = match entity.as_bytes().first()? {
        b'x' | b'X' => (&entity[1..], 16),
        _ => (entity, 10),
    };
    // from_str_radix accepts a leading sign, which is not valid here
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let codepoint = u32::from_str_radix(digits, radix).ok()?;
    char::from_u32(codepoint)
}

/// Encode text content for XML output
pub fn encode_text(input: &str) -> Cow<'_, str> {
    encode(input, false)
}

/// Encode text for use in double-quoted XML attributes
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    encode(input, true)
}

fn encode(input: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = |b: u8| matches!(b, b'<' | b'>' | b'&') || (quotes && b == b'"');

    // Fast path: check if any escaping needed
    if !input.bytes().any(needs_escape) {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' if quotes => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}
