// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core logic for reporting a hierarchical test run as service messages.
//!
//! A run has two phases:
//!
//! 1. Before execution, [`TreeReporter::emit_tree`](reporter::TreeReporter::emit_tree) announces the
//!    static plan: every container and leaf of the [`SuiteTree`](tree::SuiteTree).
//! 2. During execution, lifecycle events (started, finished, failed, ...) are turned into a
//!    correctly nested stream of suite and test messages. Containers are opened lazily, when the
//!    first event under them arrives, and closed when a later event diverges from them or when
//!    the run finishes.
//!
//! The main type is [`TreeReporter`](reporter::TreeReporter).

#![warn(missing_docs)]

pub mod config;
pub mod errors;
pub mod names;
pub mod reporter;
pub mod tree;
pub mod verify;
