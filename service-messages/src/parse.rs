// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decode a line into a `ServiceMessage`.

use crate::{ParseError, ServiceMessage, unescape};

pub(crate) fn parse_line(line: &str, protocol: &str) -> Result<ServiceMessage, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);

    let body = line
        .strip_prefix("##")
        .and_then(|rest| rest.strip_prefix(protocol))
        .and_then(|rest| rest.strip_prefix('['))
        .ok_or_else(|| ParseError::MissingPrefix {
            protocol: protocol.to_owned(),
        })?;
    let body = body.strip_suffix(']').ok_or(ParseError::Unterminated)?;
    // Offsets in errors are relative to the full line.
    let body_offset = line.len() - body.len() - 1;

    let name_end = body.find(' ').unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() {
        return Err(ParseError::EmptyName);
    }

    let mut message = ServiceMessage::new(name);
    let mut rest = &body[name_end..];
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }
        let offset = body_offset + (body.len() - rest.len());
        let (key, value, remaining) =
            split_attribute(rest).ok_or(ParseError::MalformedAttribute { offset })?;
        let value = unescape(value).map_err(|error| ParseError::Escape {
            key: key.to_owned(),
            error,
        })?;
        message.push_attribute(key, value);
        rest = remaining;
    }

    Ok(message)
}

/// Splits `key='value' ...` into the key, the still-escaped value and the rest.
///
/// Whitespace around `=` is tolerated, since some producers write `key = 'value'`.
fn split_attribute(input: &str) -> Option<(&str, &str, &str)> {
    let eq = input.find('=')?;
    let key = input[..eq].trim_end_matches(' ');
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    let after_eq = input[eq + 1..].trim_start_matches(' ');
    let value_and_rest = after_eq.strip_prefix('\'')?;

    let mut escaped = false;
    for (i, c) in value_and_rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '|' => escaped = true,
            '\'' => return Some((key, &value_and_rest[..i], &value_and_rest[i + 1..])),
            _ => {}
        }
    }
    None
}
