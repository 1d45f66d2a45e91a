// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{ParseError, parse::parse_line, serialize::serialize_message};
use std::io;

/// The protocol name used by TeamCity and the IDEs that consume its format.
pub const DEFAULT_PROTOCOL_NAME: &str = "teamcity";

/// A single service message: a name plus an ordered list of attributes.
///
/// Attribute order is preserved exactly as inserted, since consumers may
/// (and tests do) compare serialized lines byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceMessage {
    /// The name of this message, e.g. `testStarted`.
    pub name: String,

    /// The attributes of this message, in the order they are serialized.
    ///
    /// Values are stored unescaped.
    pub attributes: Vec<(String, String)>,
}

impl ServiceMessage {
    /// Creates a new `ServiceMessage` with the given name and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute, builder-style.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_attribute(key, value);
        self
    }

    /// Appends an attribute.
    pub fn push_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Returns the value of the first attribute with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the `name` attribute, which nearly every message carries.
    pub fn name_attr(&self) -> Option<&str> {
        self.get("name")
    }

    /// Serializes this message as one newline-terminated line to the given writer.
    pub fn serialize(&self, protocol: &str, writer: impl io::Write) -> io::Result<()> {
        serialize_message(self, protocol, writer)
    }

    /// Serializes this message to a string, without the trailing newline.
    pub fn to_line(&self, protocol: &str) -> String {
        let mut line = String::new();
        crate::serialize::write_line(self, protocol, &mut line);
        line
    }

    /// Decodes a single line (with or without its line terminator) produced for
    /// the given protocol.
    pub fn parse(line: &str, protocol: &str) -> Result<Self, ParseError> {
        parse_line(line, protocol)
    }
}
