// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display names and location hints for tree nodes.
//!
//! Two kinds of names exist for every node:
//!
//! * the *display name* is what consumers show in their tree, e.g. `TestA` or `testName[0]`;
//! * the *long name* is the fully qualified identity, e.g. `a.TestA` or `a.TestA.[0]`, and is what
//!   location hints are built from.
//!
//! Display names are not unique: two classes called `MyTest` in different packages display
//! identically. Nothing in the reporter's bookkeeping ever keys on names, so such collisions are
//! harmless.

use crate::tree::{NodeId, NodeKind, SuiteTree};
use service_messages::ServiceMessage;

/// The display name of the pseudo-leaf that carries container-level failures.
pub const CLASS_CONFIGURATION: &str = "Class Configuration";

/// Computes display names, long names and location hints for nodes of a tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameResolver {
    location_protocol: Option<String>,
}

impl NameResolver {
    /// Creates a new resolver.
    ///
    /// If `location_protocol` is set, every location hint is prefixed with `<protocol>:`, e.g.
    /// `java:suite://a.TestA`.
    pub fn new(location_protocol: Option<String>) -> Self {
        Self { location_protocol }
    }

    /// Returns the display name of a node, or `None` if it isn't part of the tree.
    pub fn display_name(&self, tree: &SuiteTree, id: NodeId) -> Option<String> {
        match tree.kind(id)? {
            NodeKind::Container { name } => Some(short_name(name).to_owned()),
            NodeKind::Leaf {
                class_name,
                method_name,
            } => {
                let under_parameter = tree
                    .parent(id)
                    .and_then(|parent| tree.kind(parent))
                    .is_some_and(
                        |kind| matches!(kind, NodeKind::Container { name } if is_parameter_name(name)),
                    );
                if under_parameter {
                    Some(method_name.clone())
                } else {
                    Some(format!("{}.{method_name}", short_name(class_name)))
                }
            }
        }
    }

    /// Returns the long name of a node, or `None` if it isn't part of the tree.
    ///
    /// Parameter containers (`[0]`) are qualified by their parent's long name, since on their own
    /// they say nothing about where they live.
    pub fn long_name(&self, tree: &SuiteTree, id: NodeId) -> Option<String> {
        match tree.kind(id)? {
            NodeKind::Container { name } if is_parameter_name(name) => {
                match tree.parent(id).and_then(|parent| self.long_name(tree, parent)) {
                    Some(parent_long) => Some(format!("{parent_long}.{name}")),
                    None => Some(name.clone()),
                }
            }
            NodeKind::Container { name } => Some(name.clone()),
            NodeKind::Leaf {
                class_name,
                method_name,
            } => Some(format!("{class_name}.{method_name}")),
        }
    }

    /// Returns the location hint of a node: `suite://` for containers and `test://` for leaves.
    pub fn location_hint(&self, tree: &SuiteTree, id: NodeId) -> Option<String> {
        match tree.kind(id)? {
            NodeKind::Container { .. } => {
                let long_name = self.long_name(tree, id)?;
                Some(self.suite_location(&long_name))
            }
            NodeKind::Leaf {
                class_name,
                method_name,
            } => Some(self.test_location(class_name, method_name)),
        }
    }

    /// Formats a `suite://` location for the given long name.
    pub fn suite_location(&self, long_name: &str) -> String {
        self.with_protocol(format!("suite://{long_name}"))
    }

    /// Formats a `test://` location for the given class and method.
    pub fn test_location(&self, class_name: &str, method_name: &str) -> String {
        self.with_protocol(format!("test://{class_name}/{method_name}"))
    }

    fn with_protocol(&self, location: String) -> String {
        match &self.location_protocol {
            Some(protocol) => format!("{protocol}:{location}"),
            None => location,
        }
    }

    /// Resolves the name announced once at the start of the live phase.
    ///
    /// Returns `None` for anonymous roots (an empty name or the literal `null`), in which case
    /// nothing is announced.
    pub fn root_name(&self, tree: &SuiteTree) -> Option<RootName> {
        let qualified = match tree.kind(tree.root())? {
            NodeKind::Container { name } => name,
            NodeKind::Leaf { class_name, .. } => class_name,
        };
        if qualified.is_empty() || qualified == "null" {
            return None;
        }

        Some(RootName {
            name: short_name(qualified).to_owned(),
            comment: package_prefix(qualified).map(str::to_owned),
            location: self.suite_location(qualified),
        })
    }
}

/// The run's root as announced by the `rootName` message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootName {
    /// The short name of the root.
    pub name: String,

    /// The package the root lives in, if one could be derived.
    pub comment: Option<String>,

    /// The `suite://` location of the root.
    pub location: String,
}

impl RootName {
    /// Builds the `rootName` message.
    pub fn to_message(&self) -> ServiceMessage {
        let mut message = ServiceMessage::new("rootName").attr("name", &self.name);
        if let Some(comment) = &self.comment {
            message.push_attribute("comment", comment);
        }
        message.attr("location", &self.location)
    }
}

/// Returns true if `name` is a parameter group name such as `[0]` or `[1: with - 2.1]`.
pub fn is_parameter_name(name: &str) -> bool {
    name.len() >= 2 && name.starts_with('[') && name.ends_with(']')
}

/// Returns the unqualified part of a name.
///
/// Dots inside a parameter suffix don't count, and parameter names are returned unchanged.
pub fn short_name(name: &str) -> &str {
    if is_parameter_name(name) {
        return name;
    }
    match qualifier_dot(name) {
        Some(dot) => &name[dot + 1..],
        None => name,
    }
}

/// Returns the package part of a qualified name, if both it and the short name are non-empty.
pub fn package_prefix(name: &str) -> Option<&str> {
    if is_parameter_name(name) {
        return None;
    }
    let dot = qualifier_dot(name)?;
    let (prefix, rest) = (&name[..dot], &name[dot + 1..]);
    (!prefix.is_empty() && !rest.is_empty()).then_some(prefix)
}

/// The last `.` that comes before the first `[`.
fn qualifier_dot(name: &str) -> Option<usize> {
    let head_end = name.find('[').unwrap_or(name.len());
    name[..head_end].rfind('.')
}
