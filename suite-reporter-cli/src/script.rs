// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replay scripts: a suite tree plus the events of one run, as JSON.
//!
//! ```json
//! {
//!   "tree": {
//!     "container": {
//!       "name": "a.TestA",
//!       "children": [
//!         { "leaf": { "id": "t1", "class": "a.TestA", "method": "test1" } }
//!       ]
//!     }
//!   },
//!   "events": [
//!     { "event": "test-started", "node": "t1" },
//!     { "event": "test-finished", "node": "t1" }
//!   ]
//! }
//! ```
//!
//! Nodes are referred to by their optional `id` label. The run's start and finish are implied.

use serde::Deserialize;
use std::collections::{HashMap, hash_map::Entry};
use suite_reporter::{
    errors::TreeBuildError,
    reporter::{FailureRecord, ReporterEvent},
    tree::{NodeId, SuiteTree},
};
use thiserror::Error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct Script {
    tree: ScriptNode,

    /// Whether to describe the tree before the run.
    #[serde(default = "default_emit_tree")]
    emit_tree: bool,

    #[serde(default)]
    events: Vec<ScriptEvent>,
}

fn default_emit_tree() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
enum ScriptNode {
    Container {
        name: String,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        children: Vec<ScriptNode>,
    },
    Leaf {
        class: String,
        method: String,
        #[serde(default)]
        id: Option<String>,
    },
}

impl ScriptNode {
    fn id(&self) -> Option<&str> {
        match self {
            Self::Container { id, .. } | Self::Leaf { id, .. } => id.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum ScriptEvent {
    TestStarted {
        node: String,
    },
    TestFinished {
        node: String,
    },
    TestFailed {
        node: String,
        failures: Vec<ScriptFailure>,
    },
    AssumptionFailed {
        node: String,
        failure: ScriptFailure,
    },
    TestIgnored {
        node: String,
        #[serde(default)]
        reason: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ScriptFailure {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: String,
    /// Unexpected errors are reported with `error='true'`.
    #[serde(default)]
    error: bool,
    #[serde(default)]
    expected: Option<String>,
    #[serde(default)]
    actual: Option<String>,
}

impl ScriptFailure {
    fn into_record(self) -> FailureRecord {
        let record = if self.error {
            FailureRecord::error(self.message, self.details)
        } else {
            FailureRecord::assertion(self.message, self.details)
        };
        match (self.expected, self.actual) {
            (Some(expected), Some(actual)) => record.with_comparison(expected, actual),
            _ => record,
        }
    }
}

/// A script that refers to nodes inconsistently.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("node id `{id}` is used more than once")]
    DuplicateId { id: String },

    #[error("event {index} refers to unknown node id `{id}`")]
    UnknownId { index: usize, id: String },

    #[error("error building suite tree")]
    TreeBuild(#[from] TreeBuildError),
}

/// A script resolved against the tree it describes.
#[derive(Debug)]
pub(crate) struct ResolvedScript {
    pub(crate) tree: SuiteTree,
    pub(crate) emit_tree: bool,
    pub(crate) events: Vec<ReporterEvent>,
}

impl Script {
    pub(crate) fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub(crate) fn resolve(self) -> Result<ResolvedScript, ScriptError> {
        let Script {
            tree: root,
            emit_tree,
            events,
        } = self;

        let mut ids = HashMap::new();
        let root_id = root.id().map(str::to_owned);
        let (mut tree, pending) = match root {
            ScriptNode::Container { name, children, .. } => {
                (SuiteTree::with_root_container(name), children)
            }
            ScriptNode::Leaf { class, method, .. } => {
                (SuiteTree::with_root_leaf(class, method), Vec::new())
            }
        };
        if let Some(id) = root_id {
            ids.insert(id, tree.root());
        }

        let root = tree.root();
        let mut stack: Vec<(NodeId, ScriptNode)> = pending
            .into_iter()
            .rev()
            .map(|child| (root, child))
            .collect();
        while let Some((parent, node)) = stack.pop() {
            let (added, id) = match node {
                ScriptNode::Container { name, id, children } => {
                    let added = tree.add_container(parent, name)?;
                    stack.extend(children.into_iter().rev().map(|child| (added, child)));
                    (added, id)
                }
                ScriptNode::Leaf { class, method, id } => {
                    (tree.add_leaf(parent, class, method)?, id)
                }
            };
            if let Some(id) = id {
                match ids.entry(id) {
                    Entry::Occupied(entry) => {
                        return Err(ScriptError::DuplicateId {
                            id: entry.key().clone(),
                        });
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(added);
                    }
                }
            }
        }

        let lookup = |index: usize, id: String| {
            ids.get(&id)
                .copied()
                .ok_or(ScriptError::UnknownId { index, id })
        };
        let events = events
            .into_iter()
            .enumerate()
            .map(|(index, event)| {
                let event = match event {
                    ScriptEvent::TestStarted { node } => {
                        ReporterEvent::TestStarted(lookup(index, node)?)
                    }
                    ScriptEvent::TestFinished { node } => {
                        ReporterEvent::TestFinished(lookup(index, node)?)
                    }
                    ScriptEvent::TestFailed { node, failures } => ReporterEvent::TestFailed {
                        node: lookup(index, node)?,
                        failures: failures
                            .into_iter()
                            .map(ScriptFailure::into_record)
                            .collect(),
                    },
                    ScriptEvent::AssumptionFailed { node, failure } => {
                        ReporterEvent::AssumptionFailed {
                            node: lookup(index, node)?,
                            failure: failure.into_record(),
                        }
                    }
                    ScriptEvent::TestIgnored { node, reason } => ReporterEvent::TestIgnored {
                        node: lookup(index, node)?,
                        reason,
                    },
                };
                Ok(event)
            })
            .collect::<Result<Vec<_>, ScriptError>>()?;

        Ok(ResolvedScript {
            tree,
            emit_tree,
            events,
        })
    }
}
