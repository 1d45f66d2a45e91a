// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// An error that occurs while reversing the escaping of an attribute value.
///
/// Returned by [`unescape`](crate::unescape).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnescapeError {
    /// The value ends with a lone `|`.
    #[error("dangling escape character at offset {offset}")]
    Dangling {
        /// The byte offset of the `|`.
        offset: usize,
    },

    /// The character following `|` is not a known escape.
    #[error("unknown escape sequence `|{found}` at offset {offset}")]
    UnknownEscape {
        /// The byte offset of the `|`.
        offset: usize,

        /// The character that followed the `|`.
        found: char,
    },

    /// A `|0x` escape is not followed by four hex digits naming a valid character.
    #[error("invalid unicode escape at offset {offset}")]
    InvalidUnicode {
        /// The byte offset of the `|`.
        offset: usize,
    },
}

/// An error that occurs while decoding a line into a
/// [`ServiceMessage`](crate::ServiceMessage).
///
/// Returned by [`ServiceMessage::parse`](crate::ServiceMessage::parse).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// The line does not start with `##<protocol>[`.
    #[error("line does not start with `##{protocol}[`")]
    MissingPrefix {
        /// The protocol name that was expected.
        protocol: String,
    },

    /// The line does not end with `]`.
    #[error("line is not terminated by `]`")]
    Unterminated,

    /// The message name is empty.
    #[error("message name is empty")]
    EmptyName,

    /// An attribute is not of the form `key='value'`.
    #[error("malformed attribute at offset {offset}")]
    MalformedAttribute {
        /// The byte offset within the line where the attribute starts.
        offset: usize,
    },

    /// An attribute value contains an invalid escape.
    #[error("invalid escape in value of attribute `{key}`")]
    Escape {
        /// The attribute key.
        key: String,

        /// The underlying error.
        #[source]
        error: UnescapeError,
    },
}
