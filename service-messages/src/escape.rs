// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escaping of attribute values.

use crate::UnescapeError;
use std::{borrow::Cow, fmt, str::CharIndices};

/// Escapes an attribute value so that it can be embedded between single quotes.
///
/// `|`, `'`, line feed, carriage return and `]` are each replaced by `|`
/// followed by an escape character (`||`, `|'`, `|n`, `|r`, `|]`). Every other
/// character is passed through unchanged.
///
/// Returns the input unchanged (and unallocated) if it contains nothing to escape.
pub fn escape(value: &str) -> Cow<'_, str> {
    if value.bytes().any(|byte| escape_for(byte).is_some()) {
        Cow::Owned(EscapedValue(value).to_string())
    } else {
        Cow::Borrowed(value)
    }
}

/// Reverses [`escape`].
///
/// In addition to the sequences produced by [`escape`], this accepts the other
/// escapes defined by the wire protocol: `|[`, `|x` (U+0085), `|l` (U+2028),
/// `|p` (U+2029) and `|0xXXXX` for an arbitrary code point.
pub fn unescape(value: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.char_indices();

    while let Some((offset, c)) = chars.next() {
        if c != '|' {
            out.push(c);
            continue;
        }

        let Some((_, next)) = chars.next() else {
            return Err(UnescapeError::Dangling { offset });
        };
        let decoded = match next {
            '|' => '|',
            '\'' => '\'',
            'n' => '\n',
            'r' => '\r',
            ']' => ']',
            '[' => '[',
            'x' => '\u{0085}',
            'l' => '\u{2028}',
            'p' => '\u{2029}',
            '0' => decode_code_point(&mut chars).ok_or(UnescapeError::InvalidUnicode { offset })?,
            found => return Err(UnescapeError::UnknownEscape { offset, found }),
        };
        out.push(decoded);
    }

    Ok(out)
}

#[inline]
fn escape_for(byte: u8) -> Option<&'static str> {
    match byte {
        b'|' => Some("||"),
        b'\'' => Some("|'"),
        b'\n' => Some("|n"),
        b'\r' => Some("|r"),
        b']' => Some("|]"),
        _ => None,
    }
}

// Expects the remainder of `|0xXXXX` after the `0`.
fn decode_code_point(chars: &mut CharIndices<'_>) -> Option<char> {
    if chars.next()?.1 != 'x' {
        return None;
    }
    let mut code = 0u32;
    for _ in 0..4 {
        let (_, c) = chars.next()?;
        code = code * 16 + c.to_digit(16)?;
    }
    char::from_u32(code)
}

/// Writes a value with [`escape`] applied, without an intermediate allocation.
pub(crate) struct EscapedValue<'s>(pub(crate) &'s str);

impl fmt::Display for EscapedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = 0;
        let s = self.0;

        for (i, byte) in s.bytes().enumerate() {
            // All escaped bytes are ASCII, so `i` is always a char boundary.
            let Some(escaped) = escape_for(byte) else {
                continue;
            };

            if start < i {
                f.write_str(&s[start..i])?;
            }

            f.write_str(escaped)?;

            start = i + 1;
        }

        if start != s.len() {
            f.write_str(&s[start..])?;
        }

        Ok(())
    }
}
