// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    output::{NO_HEADING, StderrStyles},
    script::ScriptError,
};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use suite_reporter::errors::{NestingError, ReporterConfigError, WriteEventError};
use thiserror::Error;

/// Exit codes returned by `suite-reporter`.
///
/// Unknown or unexpected failures always result in exit code 1.
pub enum ReporterExitCode {}

impl ReporterExitCode {
    /// The input was well nested, or the replay completed.
    pub const OK: i32 = 0;

    /// A user issue happened while setting up: a bad config, an unreadable or invalid script.
    pub const SETUP_ERROR: i32 = 96;

    /// The checked stream is not well nested.
    pub const NESTING_CHECK_FAILED: i32 = 100;

    /// Writing service messages to stdout produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;
}

// The #[error()] strings are placeholders. Errors are meant to be printed with display_to_stderr,
// which colorizes them.

/// An error in the inputs or environment of `suite-reporter`.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[source]
        err: ReporterConfigError,
    },
    #[error("error reading input")]
    InputReadError {
        input: String,
        #[source]
        err: std::io::Error,
    },
    #[error("error parsing replay script")]
    ScriptParseError {
        input: String,
        #[source]
        err: serde_json::Error,
    },
    #[error("invalid replay script")]
    ScriptInvalid {
        input: String,
        #[source]
        err: ScriptError,
    },
    #[error("error writing service messages")]
    WriteEventError {
        #[source]
        err: WriteEventError,
    },
    #[error("stream is not well nested")]
    NestingCheckFailed {
        input: String,
        #[source]
        err: NestingError,
    },
}

impl ExpectedError {
    pub(crate) fn config_parse_error(err: ReporterConfigError) -> Self {
        Self::ConfigParseError { err }
    }

    pub(crate) fn input_read_error(input: &InputPath, err: std::io::Error) -> Self {
        Self::InputReadError {
            input: input.to_string(),
            err,
        }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::InputReadError { .. }
            | Self::ScriptParseError { .. }
            | Self::ScriptInvalid { .. } => ReporterExitCode::SETUP_ERROR,
            Self::WriteEventError { .. } => ReporterExitCode::WRITE_OUTPUT_ERROR,
            Self::NestingCheckFailed { .. } => ReporterExitCode::NESTING_CHECK_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::ConfigParseError { err } => {
                tracing::error!("{err}");
                err.source()
            }
            Self::InputReadError { input, err } => {
                tracing::error!("failed to read `{}`", input.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::ScriptParseError { input, err } => {
                tracing::error!("failed to parse replay script `{}`", input.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::ScriptInvalid { input, err } => {
                tracing::error!("replay script `{}` is invalid: {err}", input.style(styles.bold));
                err.source()
            }
            Self::WriteEventError { err } => {
                tracing::error!("failed to write service messages");
                Some(err as &dyn Error)
            }
            Self::NestingCheckFailed { input, err } => {
                tracing::error!("`{}` is not well nested: {err}", input.style(styles.bold));
                err.source()
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING, "\nCaused by:\n  {err}");
            next_error = err.source();
        }
    }
}

/// A file path, or `-` for standard input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum InputPath {
    Stdin,
    Path(Utf8PathBuf),
}

impl From<&str> for InputPath {
    fn from(s: &str) -> Self {
        if s == "-" {
            Self::Stdin
        } else {
            Self::Path(s.into())
        }
    }
}

impl std::fmt::Display for InputPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::Path(path) => write!(f, "{path}"),
        }
    }
}
