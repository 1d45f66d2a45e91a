// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning a tree and a stream of lifecycle events into service messages.
//!
//! - [`emit_tree`] describes the static tree.
//! - [`ScopeStack`] is the pure state machine for the live phase.
//! - [`TreeReporter`] ties both to an output sink for one run.

mod events;
mod imp;
mod scope;
mod tree_dump;

pub use events::*;
pub use imp::TreeReporter;
pub use scope::ScopeStack;
pub use tree_dump::emit_tree;
