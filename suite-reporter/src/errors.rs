// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the suite reporter.

use crate::tree::NodeId;
use camino::Utf8PathBuf;
use service_messages::ParseError;
use thiserror::Error;

/// An error that occurred while building a [`SuiteTree`](crate::tree::SuiteTree).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TreeBuildError {
    /// The parent node does not belong to this tree.
    #[error("parent node {parent} is not part of this tree")]
    UnknownParent {
        /// The parent that was passed in.
        parent: NodeId,
    },

    /// Leaves are executable units and can't own children.
    #[error("cannot add a child to leaf `{name}` ({parent})")]
    ParentIsLeaf {
        /// The leaf that was passed in as the parent.
        parent: NodeId,

        /// The long name of that leaf.
        name: String,
    },
}

/// An error that occurs while writing an event to the output sink.
///
/// This is the only way a reporter can fail: structural problems in the event
/// stream are absorbed, never reported.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),
}

/// An error that occurred while loading a [`ReporterConfig`](crate::config::ReporterConfig).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReporterConfigError {
    /// The config file could not be read.
    #[error("failed to read reporter config at `{path}`")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The config file is not valid TOML, or doesn't match the expected schema.
    #[error("failed to parse reporter config at `{path}`")]
    Parse {
        /// The path that was parsed.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },

    /// A value parsed, but is unusable.
    #[error("in reporter config at `{path}`, invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// The path that was parsed.
        path: Utf8PathBuf,

        /// The offending key, in `section.key` form.
        key: &'static str,

        /// Why the value was rejected.
        reason: String,
    },
}

/// A violation of well-nestedness found by [`check_nesting`](crate::verify::check_nesting).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum NestingError {
    /// A line could not be decoded.
    #[error("message {index} could not be decoded")]
    Parse {
        /// The zero-based position of the message in the stream.
        index: usize,

        /// The underlying error.
        #[source]
        error: ParseError,
    },

    /// A bracketing message has no `name` attribute.
    #[error("message {index} (`{message}`) has no name")]
    MissingName {
        /// The zero-based position of the message in the stream.
        index: usize,

        /// The message name.
        message: String,
    },

    /// A closing message doesn't match the innermost open scope.
    #[error(
        "message {index} (`{message}`) closes `{name}`, but the innermost open scope is {}",
        .expected.as_deref().map_or_else(|| "<none>".to_owned(), |e| format!("`{e}`")),
    )]
    UnexpectedClose {
        /// The zero-based position of the message in the stream.
        index: usize,

        /// The message name.
        message: String,

        /// The scope name the message tried to close.
        name: String,

        /// The innermost scope that was open at the time, if any.
        expected: Option<String>,
    },

    /// The stream ended with scopes still open.
    #[error("stream ended with {} scope(s) still open: {}", .open.len(), .open.join(", "))]
    Unclosed {
        /// The names of the scopes still open, outermost first.
        open: Vec<String>,
    },
}
