// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    names::NameResolver,
    tree::{NodeId, NodeKind, SuiteTree},
};
use service_messages::ServiceMessage;

/// Describes the whole tree, before any test runs.
///
/// The output starts with `enteredTheMatrix` and ends with `treeEnded`. Containers are bracketed
/// by `suiteTreeStarted`/`suiteTreeEnded` and leaves are a single `suiteTreeNode`, in pre-order.
///
/// A root with children is not itself described, only its children are. A root without children
/// (a bare leaf or an empty container) is described like any other node.
///
/// The result depends only on the tree and the resolver, so calling this twice gives identical
/// output.
pub fn emit_tree(tree: &SuiteTree, names: &NameResolver) -> Vec<ServiceMessage> {
    let mut out = vec![ServiceMessage::new("enteredTheMatrix")];

    let root = tree.root();
    let top: &[NodeId] = if tree.children(root).is_empty() {
        std::slice::from_ref(&root)
    } else {
        tree.children(root)
    };

    // An explicit work list rather than recursion, so deep trees don't exhaust the stack.
    let mut work: Vec<Step> = top.iter().rev().map(|&id| Step::Enter(id)).collect();
    while let Some(step) = work.pop() {
        match step {
            Step::Enter(id) => {
                let name = names.display_name(tree, id).unwrap_or_default();
                let location = names.location_hint(tree, id).unwrap_or_default();
                match tree.kind(id) {
                    Some(NodeKind::Leaf { .. }) => out.push(
                        ServiceMessage::new("suiteTreeNode")
                            .attr("name", name)
                            .attr("locationHint", location),
                    ),
                    Some(NodeKind::Container { .. }) => {
                        out.push(
                            ServiceMessage::new("suiteTreeStarted")
                                .attr("name", name.clone())
                                .attr("locationHint", location),
                        );
                        work.push(Step::Exit(name));
                        work.extend(tree.children(id).iter().rev().map(|&c| Step::Enter(c)));
                    }
                    None => {}
                }
            }
            Step::Exit(name) => {
                out.push(ServiceMessage::new("suiteTreeEnded").attr("name", name));
            }
        }
    }

    out.push(ServiceMessage::new("treeEnded"));
    out
}

enum Step {
    Enter(NodeId),
    Exit(String),
}
