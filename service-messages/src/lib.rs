// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generate and read CI service messages in Rust.
//!
//! A service message is a single line of the form
//! `##<protocol>[<name> key1='value1' key2='value2']`. Attribute values are
//! escaped so that the framing characters `'`, `]`, `|` and line breaks can
//! appear inside them without making the line ambiguous.
//!
//! ```
//! use service_messages::{ServiceMessage, DEFAULT_PROTOCOL_NAME};
//!
//! let message = ServiceMessage::new("testStarted")
//!     .attr("name", "testName[0]")
//!     .attr("locationHint", "test://a.TestA/testName[0]");
//! assert_eq!(
//!     message.to_line(DEFAULT_PROTOCOL_NAME),
//!     "##teamcity[testStarted name='testName[0|]' locationHint='test://a.TestA/testName[0|]']",
//! );
//! ```

#![warn(missing_docs)]

mod errors;
mod escape;
mod message;
mod parse;
mod serialize;

pub use errors::*;
pub use escape::{escape, unescape};
pub use message::*;
