// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `ServiceMessage`.

use crate::{ServiceMessage, escape::EscapedValue};
use std::io;
use swrite::{SWrite, swrite};

pub(crate) fn serialize_message(
    message: &ServiceMessage,
    protocol: &str,
    mut writer: impl io::Write,
) -> io::Result<()> {
    // Build the whole line first so that it reaches the writer in a single call,
    // and a failing writer never leaves half a message behind.
    let mut line = String::with_capacity(estimated_len(message, protocol));
    write_line(message, protocol, &mut line);
    line.push('\n');

    writer.write_all(line.as_bytes())
}

pub(crate) fn write_line(message: &ServiceMessage, protocol: &str, out: &mut String) {
    // Use the destructuring syntax to ensure that all fields are handled.
    let ServiceMessage { name, attributes } = message;

    swrite!(out, "##{protocol}[{name}");
    for (key, value) in attributes {
        swrite!(out, " {key}='{}'", EscapedValue(value));
    }
    out.push(']');
}

fn estimated_len(message: &ServiceMessage, protocol: &str) -> usize {
    let attributes: usize = message
        .attributes
        .iter()
        .map(|(key, value)| key.len() + value.len() + 4)
        .sum();
    protocol.len() + message.name.len() + attributes + 5
}
