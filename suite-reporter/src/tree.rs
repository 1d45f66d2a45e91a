// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The static description of a test run: an arena of containers and leaves.
//!
//! Nodes are stored in a flat vector and refer to each other by [`NodeId`].
//! Parent links are plain indexes, so the tree has no ownership cycles. A tree
//! is built once, before the run, and only read afterwards.

use crate::errors::TreeBuildError;
use std::fmt;

/// A stable identifier for a node within one [`SuiteTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is, along with the data specific to that kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A suite, test class, parameter group or package. May own children.
    ///
    /// A container with no children is still a container.
    Container {
        /// The name as reported by the test framework, e.g. `a.TestA` or `[0]`.
        ///
        /// An empty name marks an anonymous aggregate.
        name: String,
    },

    /// A single runnable test case.
    Leaf {
        /// The fully qualified class (or module) the test belongs to.
        class_name: String,

        /// The test's method name, including any parameter suffix like `[0]`.
        method_name: String,
    },
}

impl NodeKind {
    /// Returns true if this is a container.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container { .. })
    }
}

#[derive(Clone, Debug)]
struct NodeEntry {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An immutable-once-built tree of test containers and leaves.
///
/// The root is always present and always has the id returned by
/// [`SuiteTree::root`]. Children are kept in insertion (discovery) order.
#[derive(Clone, Debug)]
pub struct SuiteTree {
    nodes: Vec<NodeEntry>,
}

impl SuiteTree {
    /// Creates a tree whose root is a container with the given name.
    pub fn with_root_container(name: impl Into<String>) -> Self {
        Self::with_root(NodeKind::Container { name: name.into() })
    }

    /// Creates a tree that consists of a single test.
    pub fn with_root_leaf(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self::with_root(NodeKind::Leaf {
            class_name: class_name.into(),
            method_name: method_name.into(),
        })
    }

    fn with_root(kind: NodeKind) -> Self {
        Self {
            nodes: vec![NodeEntry {
                kind,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Adds a container as the last child of `parent`.
    pub fn add_container(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeBuildError> {
        self.push(parent, NodeKind::Container { name: name.into() })
    }

    /// Adds a test as the last child of `parent`.
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        class_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Result<NodeId, TreeBuildError> {
        self.push(
            parent,
            NodeKind::Leaf {
                class_name: class_name.into(),
                method_name: method_name.into(),
            },
        )
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, TreeBuildError> {
        let parent_entry = self
            .nodes
            .get(parent.0)
            .ok_or(TreeBuildError::UnknownParent { parent })?;
        if let NodeKind::Leaf {
            class_name,
            method_name,
        } = &parent_entry.kind
        {
            return Err(TreeBuildError::ParentIsLeaf {
                parent,
                name: format!("{class_name}.{method_name}"),
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Returns the root of this tree.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if `id` belongs to this tree.
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Returns the kind of the node, or `None` if it isn't part of this tree.
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|entry| &entry.kind)
    }

    /// Returns true if `id` is a container of this tree.
    pub fn is_container(&self, id: NodeId) -> bool {
        self.kind(id).is_some_and(NodeKind::is_container)
    }

    /// Returns the parent of the node. The root has no parent.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|entry| entry.parent)
    }

    /// Returns the children of the node in declaration order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map_or(&[][..], |entry| entry.children.as_slice())
    }

    /// Iterates over the strict ancestors of `id`, innermost first, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Returns the chain of containers a node is nested in, outermost first.
    ///
    /// The root is never part of the chain: it stands for the run as a whole
    /// and is not opened as a scope. For the root itself (or an id outside this
    /// tree) the chain is empty.
    pub fn scope_path(&self, id: NodeId) -> Vec<NodeId> {
        let root = self.root();
        let mut path: Vec<_> = self.ancestors(id).filter(|&a| a != root).collect();
        path.reverse();
        path
    }

    /// Returns every leaf at or below `id`, in pre-order.
    pub fn leaves_under(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        if !self.contains(id) {
            return leaves;
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let entry = &self.nodes[next.0];
            match entry.kind {
                NodeKind::Leaf { .. } => leaves.push(next),
                NodeKind::Container { .. } => stack.extend(entry.children.iter().rev()),
            }
        }
        leaves
    }
}

/// Iterator returned by [`SuiteTree::ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    tree: &'a SuiteTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
