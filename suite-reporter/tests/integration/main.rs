// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenarios: a tree is described, a run is fed through a [`TreeReporter`], and the
//! exact output is compared.
//!
//! [`TreeReporter`]: suite_reporter::reporter::TreeReporter

mod failures;
mod fixtures;
