// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::tree::NodeId;
use service_messages::ServiceMessage;

/// A lifecycle notification from the test framework.
///
/// Events are consumed one at a time, in the order the framework produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReporterEvent {
    /// The run started.
    RunStarted,

    /// A test (or a container, if the framework reports those) started executing.
    TestStarted(NodeId),

    /// A test (or a container) finished executing.
    TestFinished(NodeId),

    /// A test failed, or a container failed during setup or teardown.
    TestFailed {
        /// The node that failed.
        node: NodeId,

        /// One record per underlying failure, in order.
        failures: Vec<FailureRecord>,
    },

    /// A test, or every test beneath a container, was skipped because an assumption didn't hold.
    AssumptionFailed {
        /// The node whose assumption failed.
        node: NodeId,

        /// What went wrong.
        failure: FailureRecord,
    },

    /// A test or container is disabled and will not run.
    TestIgnored {
        /// The ignored node.
        node: NodeId,

        /// The reason given for ignoring it, if any.
        reason: Option<String>,
    },

    /// The run finished. Every scope still open is closed.
    RunFinished,
}

impl ReporterEvent {
    /// Returns the node this event refers to, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::RunStarted | Self::RunFinished => None,
            Self::TestStarted(node) | Self::TestFinished(node) => Some(*node),
            Self::TestFailed { node, .. }
            | Self::AssumptionFailed { node, .. }
            | Self::TestIgnored { node, .. } => Some(*node),
        }
    }
}

/// One failure attached to an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureRecord {
    /// A short description of the failure. May be empty.
    pub message: String,

    /// Free-form detail, usually a stack trace. Written in full.
    pub details: String,

    /// Whether this was an assertion failure or an unexpected error.
    pub kind: FailureKind,

    /// The values compared, if this was a comparison failure.
    pub comparison: Option<Comparison>,
}

impl FailureRecord {
    /// Creates an assertion failure.
    pub fn assertion(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: details.into(),
            kind: FailureKind::Assertion,
            comparison: None,
        }
    }

    /// Creates a failure caused by an unexpected error.
    pub fn error(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Error,
            ..Self::assertion(message, details)
        }
    }

    /// Attaches expected and actual values.
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.comparison = Some(Comparison {
            expected: expected.into(),
            actual: actual.into(),
        });
        self
    }

    /// Appends this record's attributes to `message`.
    pub(super) fn push_attributes(&self, message: &mut ServiceMessage) {
        if self.kind == FailureKind::Error {
            message.push_attribute("error", "true");
        }
        message
            .push_attribute("message", &self.message)
            .push_attribute("details", &self.details);
        if let Some(comparison) = &self.comparison {
            message
                .push_attribute("type", "comparisonFailure")
                .push_attribute("expected", &comparison.expected)
                .push_attribute("actual", &comparison.actual);
        }
    }
}

/// The classification of a [`FailureRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A check in the test didn't hold.
    Assertion,

    /// The test raised an error it didn't expect. Marked with `error='true'`.
    Error,
}

/// Expected and actual values of a comparison failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comparison {
    /// The expected value.
    pub expected: String,

    /// The actual value.
    pub actual: String,
}
