// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `suite-reporter` command-line tool.
//!
//! This crate exposes its internals only so that the binary and its tests can share them. It has
//! no stable API.

mod dispatch;
mod errors;
mod output;
mod script;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputWriter;
