//! Escaping and URI encoding primitives shared by every renderer.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left untouched by [`encode_uri`]: the URI reserved set, the
/// unreserved marks and `#`.
const URI_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Escapes that [`decode_uri`] keeps encoded.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encodes a whole URI. Already encoded input is encoded again
/// (`%` becomes `%25`), pair with [`decode_uri`] to avoid that.
pub fn encode_uri(uri: &str) -> String {
    utf8_percent_encode(uri, URI_ENCODE).to_string()
}

/// Decodes percent escapes except those standing for reserved characters.
///
/// Returns `None` for a truncated escape, a non-hex digit or a sequence that
/// is not valid UTF-8.
pub fn decode_uri(uri: &str) -> Option<String> {
    let bytes = uri.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] != b'%' {
            out.push(bytes[idx]);
            idx += 1;
            continue;
        }

        let lead = hex_escape(bytes, idx)?;
        if lead < 0x80 {
            if URI_RESERVED.contains(&lead) {
                out.extend_from_slice(&bytes[idx..idx + 3]);
            } else {
                out.push(lead);
            }
            idx += 3;
            continue;
        }

        let width = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return None,
        };
        let mut sequence = vec![lead];
        idx += 3;
        for _ in 1..width {
            let byte = hex_escape(bytes, idx)?;
            if byte & 0xC0 != 0x80 {
                return None;
            }
            sequence.push(byte);
            idx += 3;
        }
        // Rejects overlong forms and surrogates.
        std::str::from_utf8(&sequence).ok()?;
        out.extend_from_slice(&sequence);
    }
    String::from_utf8(out).ok()
}

fn hex_escape(bytes: &[u8], idx: usize) -> Option<u8> {
    if bytes.get(idx) != Some(&b'%') {
        return None;
    }
    let high = hex_value(*bytes.get(idx + 1)?)?;
    let low = hex_value(*bytes.get(idx + 2)?)?;
    Some((high << 4) | low)
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
