// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The state machine behind the live phase.
//!
//! The stack holds the suites currently open in the output, outermost first. Every event that
//! concerns a test first brings the stack in line with the test's ancestor chain: suites that
//! aren't ancestors are closed innermost first, then the missing ancestors are opened outermost
//! first. Suites that are already open and on the chain are left alone.
//!
//! Scopes are compared by node identity, never by name, so two suites that display the same way
//! never get confused with each other.
//!
//! At most one test is open in the output at a time. While a test runs, events about anything
//! else are held back in arrival order and applied once it finishes, so a framework that runs
//! tests concurrently still produces a well-nested stream.

use super::events::{FailureRecord, ReporterEvent};
use crate::{
    config::ReporterConfig,
    names::{CLASS_CONFIGURATION, NameResolver, short_name},
    tree::{NodeId, NodeKind, SuiteTree},
};
use service_messages::ServiceMessage;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// An open suite.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Scope {
    /// A container of the tree.
    Node(NodeId),

    /// A synthetic suite for a test class, wrapping leaves that sit directly under the root.
    Class(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LeafState {
    Running,
    Finished,
}

/// Work that had to wait for the running test to finish.
#[derive(Clone, Debug)]
enum Held {
    /// An event from the framework.
    Event(ReporterEvent),

    /// A skipped leaf still to be bracketed, unless it started in the meantime.
    Bracket {
        leaf: NodeId,
        ignored: ServiceMessage,
    },
}

/// Tracks the open suites of one run and turns events into messages.
#[derive(Clone, Debug)]
pub struct ScopeStack {
    open: Vec<Scope>,
    leaves: HashMap<NodeId, LeafState>,
    // The leaf whose `testStarted` was written and whose `testFinished` wasn't.
    running: Option<NodeId>,
    held: VecDeque<Held>,
    // Containers whose own setup or teardown failed. Their leaves that never started are
    // reported as ignored when the container closes.
    failed: Vec<NodeId>,
    tree_emitted: bool,
    announce_untreed_runs: bool,
    wrap_orphan_leaves: bool,
}

impl ScopeStack {
    /// Creates an empty stack.
    pub fn new(config: &ReporterConfig) -> Self {
        Self {
            open: Vec::new(),
            leaves: HashMap::new(),
            running: None,
            held: VecDeque::new(),
            failed: Vec::new(),
            tree_emitted: false,
            announce_untreed_runs: config.announce_untreed_runs,
            wrap_orphan_leaves: config.wrap_orphan_leaves,
        }
    }

    /// Records that the tree has already been described, so the run needs no preamble.
    pub fn set_tree_emitted(&mut self) {
        self.tree_emitted = true;
    }

    /// Returns the number of suites currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Returns the number of events waiting for the running test to finish.
    pub fn held_len(&self) -> usize {
        self.held.len()
    }

    /// Applies one event and returns the messages it produces.
    ///
    /// This never fails: events about nodes outside `tree` are logged and dropped, and events in
    /// an unexpected order are mirrored as faithfully as possible. An event that would write
    /// around the running test is held, and the messages for it are returned by the call that
    /// unblocks it.
    pub fn transition(
        &mut self,
        tree: &SuiteTree,
        names: &NameResolver,
        event: ReporterEvent,
    ) -> Vec<ServiceMessage> {
        if let Some(node) = event.node()
            && !tree.contains(node)
        {
            warn!("dropping event for node {node}, which isn't part of the tree: {event:?}");
            return Vec::new();
        }

        let mut cx = TransitionCx {
            stack: self,
            tree,
            names,
            out: Vec::new(),
            deferred: Vec::new(),
        };
        match event {
            ReporterEvent::RunStarted => {
                // A second start without a finish: don't leave the previous run dangling.
                cx.finish_run();
                cx.run_started();
            }
            ReporterEvent::RunFinished => cx.finish_run(),
            event => {
                cx.stack.held.push_back(Held::Event(event));
                cx.drain();
            }
        }
        cx.out
    }
}

/// How a skipped leaf is reported when the event names the leaf itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SkipLeaf {
    /// The framework brackets the leaf, so only `testIgnored` is written.
    InPlace,

    /// The leaf never runs, so it is bracketed here unless it already started.
    Bracketed,
}

struct TransitionCx<'s, 'a> {
    stack: &'s mut ScopeStack,
    tree: &'a SuiteTree,
    names: &'a NameResolver,
    out: Vec<ServiceMessage>,
    // Follow-up work produced by the item being applied, queued in its place.
    deferred: Vec<Held>,
}

impl TransitionCx<'_, '_> {
    /// Applies held work, oldest first, until everything left waits on the running test.
    fn drain(&mut self) {
        loop {
            let Some(index) = self.stack.held.iter().position(|held| !self.is_blocked(held))
            else {
                break;
            };
            let Some(held) = self.stack.held.remove(index) else {
                break;
            };
            self.apply(held);
            for (offset, follow_up) in self.deferred.drain(..).enumerate() {
                self.stack.held.insert(index + offset, follow_up);
            }
        }
    }

    fn is_blocked(&self, held: &Held) -> bool {
        let Some(running) = self.stack.running else {
            return false;
        };
        match held {
            Held::Bracket { .. } => true,
            Held::Event(event) => match event {
                ReporterEvent::AssumptionFailed { node, .. }
                | ReporterEvent::TestIgnored { node, .. }
                    if self.tree.is_container(*node) =>
                {
                    // The running test is marked in place, the rest of the container waits.
                    !self.tree.leaves_under(*node).contains(&running)
                }
                event => event.node() != Some(running),
            },
        }
    }

    fn apply(&mut self, held: Held) {
        match held {
            Held::Event(event) => self.apply_event(event),
            Held::Bracket { leaf, ignored } => {
                if !self.stack.leaves.contains_key(&leaf) {
                    self.bracket_skipped(leaf, ignored);
                }
            }
        }
    }

    fn apply_event(&mut self, event: ReporterEvent) {
        match event {
            ReporterEvent::TestStarted(node) => self.test_started(node),
            ReporterEvent::TestFinished(node) => self.test_finished(node),
            ReporterEvent::TestFailed { node, failures } => self.test_failed(node, &failures),
            ReporterEvent::AssumptionFailed { node, failure } => {
                self.skip(node, SkipLeaf::InPlace, |message| failure.push_attributes(message))
            }
            ReporterEvent::TestIgnored { node, reason } => {
                self.skip(node, SkipLeaf::Bracketed, |message| {
                    if let Some(reason) = &reason {
                        message.push_attribute("message", reason);
                    }
                })
            }
            ReporterEvent::RunStarted | ReporterEvent::RunFinished => {}
        }
    }

    fn run_started(&mut self) {
        if !self.stack.tree_emitted && self.stack.announce_untreed_runs {
            self.out.push(ServiceMessage::new("enteredTheMatrix"));
        }
        if let Some(root_name) = self.names.root_name(self.tree) {
            self.out.push(root_name.to_message());
        }
    }

    fn test_started(&mut self, node: NodeId) {
        if self.tree.is_container(node) {
            let target = self.container_scopes(node);
            self.reconcile(&target);
            return;
        }

        let target = self.leaf_scopes(node);
        self.reconcile(&target);
        let (name, location) = (self.display_name(node), self.location_hint(node));
        self.out.push(
            ServiceMessage::new("testStarted")
                .attr("name", name)
                .attr("locationHint", location),
        );
        self.stack.leaves.insert(node, LeafState::Running);
        self.stack.running = Some(node);
    }

    fn test_finished(&mut self, node: NodeId) {
        if self.tree.is_container(node) {
            // Close the container along with anything still open inside it.
            if let Some(pos) = self.stack.open.iter().position(|s| *s == Scope::Node(node)) {
                self.close_to(pos);
            }
            return;
        }

        self.finish_leaf(node);
    }

    fn finish_leaf(&mut self, leaf: NodeId) {
        let name = self.display_name(leaf);
        self.out.push(ServiceMessage::new("testFinished").attr("name", name));
        self.stack.leaves.insert(leaf, LeafState::Finished);
        if self.stack.running == Some(leaf) {
            self.stack.running = None;
        }
    }

    fn test_failed(&mut self, node: NodeId, failures: &[FailureRecord]) {
        if !self.tree.is_container(node) {
            // The framework brackets the leaf itself.
            let name = self.display_name(node);
            for failure in failures {
                let mut message = ServiceMessage::new("testFailed").attr("name", name.clone());
                failure.push_attributes(&mut message);
                self.out.push(message);
            }
            return;
        }

        if !self.stack.failed.contains(&node) {
            self.stack.failed.push(node);
        }
        self.class_configuration(node, |out| {
            for failure in failures {
                let mut message =
                    ServiceMessage::new("testFailed").attr("name", CLASS_CONFIGURATION);
                failure.push_attributes(&mut message);
                out.push(message);
            }
        });
    }

    /// Marks a leaf, or every leaf beneath a container, as skipped.
    fn skip(&mut self, node: NodeId, leaf: SkipLeaf, attributes: impl Fn(&mut ServiceMessage)) {
        if leaf == SkipLeaf::InPlace && !self.tree.is_container(node) {
            let mut message =
                ServiceMessage::new("testIgnored").attr("name", self.display_name(node));
            attributes(&mut message);
            self.out.push(message);
            return;
        }

        let leaves = self.tree.leaves_under(node);
        if leaves.is_empty() {
            self.class_configuration(node, |out| {
                let mut message =
                    ServiceMessage::new("testIgnored").attr("name", CLASS_CONFIGURATION);
                attributes(&mut message);
                out.push(message);
            });
            return;
        }

        for leaf in leaves {
            let mut ignored =
                ServiceMessage::new("testIgnored").attr("name", self.display_name(leaf));
            attributes(&mut ignored);

            match self.stack.leaves.get(&leaf) {
                Some(LeafState::Running) => self.out.push(ignored),
                Some(LeafState::Finished) => {}
                None if self.stack.running.is_some() => {
                    self.deferred.push(Held::Bracket { leaf, ignored });
                }
                None => self.bracket_skipped(leaf, ignored),
            }
        }
    }

    /// Writes a leaf that never ran: its start, the given `testIgnored`, and its finish.
    fn bracket_skipped(&mut self, leaf: NodeId, ignored: ServiceMessage) {
        let target = self.leaf_scopes(leaf);
        self.reconcile(&target);
        let (name, location) = (self.display_name(leaf), self.location_hint(leaf));
        self.out.push(
            ServiceMessage::new("testStarted")
                .attr("name", name.clone())
                .attr("locationHint", location),
        );
        self.out.push(ignored);
        self.out.push(ServiceMessage::new("testFinished").attr("name", name));
        self.stack.leaves.insert(leaf, LeafState::Finished);
    }

    /// Reports every leaf under a failed container that never started.
    fn bracket_unstarted(&mut self, container: NodeId) {
        for leaf in self.tree.leaves_under(container) {
            if !self.stack.leaves.contains_key(&leaf) {
                let ignored =
                    ServiceMessage::new("testIgnored").attr("name", self.display_name(leaf));
                self.bracket_skipped(leaf, ignored);
            }
        }
    }

    /// Writes the pseudo-leaf that stands in for a container's own setup or teardown.
    fn class_configuration(
        &mut self,
        container: NodeId,
        body: impl FnOnce(&mut Vec<ServiceMessage>),
    ) {
        let target = self.container_scopes(container);
        self.reconcile(&target);

        let location = self.location_hint(container);
        self.out.push(
            ServiceMessage::new("testStarted")
                .attr("name", CLASS_CONFIGURATION)
                .attr("locationHint", location),
        );
        body(&mut self.out);
        self.out.push(ServiceMessage::new("testFinished").attr("name", CLASS_CONFIGURATION));
    }

    /// Flushes held work and closes everything, leaving the stack empty.
    fn finish_run(&mut self) {
        loop {
            self.drain();
            // Whatever is still held waits on a test the framework never finished.
            let Some(running) = self.stack.running else {
                break;
            };
            debug!("finishing test {running}, which never reported its end");
            self.finish_leaf(running);
        }

        // The root is never an open scope, so a failure of its own is settled here.
        while let Some(container) = self.stack.failed.pop() {
            self.bracket_unstarted(container);
        }
        self.close_to(0);
        self.stack.leaves.clear();
    }

    /// The scopes a container lives in, including itself unless it's the root.
    fn container_scopes(&self, container: NodeId) -> Vec<Scope> {
        let mut scopes: Vec<_> = self
            .tree
            .scope_path(container)
            .into_iter()
            .map(Scope::Node)
            .collect();
        if container != self.tree.root() {
            scopes.push(Scope::Node(container));
        }
        scopes
    }

    /// The scopes a leaf lives in.
    fn leaf_scopes(&self, leaf: NodeId) -> Vec<Scope> {
        let mut scopes: Vec<_> = self
            .tree
            .scope_path(leaf)
            .into_iter()
            .map(Scope::Node)
            .collect();

        if self.stack.wrap_orphan_leaves {
            let root = self.tree.root();
            if let (
                Some(NodeKind::Container { name: root_name }),
                Some(NodeKind::Leaf { class_name, .. }),
            ) = (self.tree.kind(root), self.tree.kind(leaf))
                && self.tree.parent(leaf) == Some(root)
                && class_name != root_name
            {
                scopes.push(Scope::Class(class_name.clone()));
            }
        }
        scopes
    }

    /// Closes what isn't on `target` and opens what's missing from it.
    fn reconcile(&mut self, target: &[Scope]) {
        let common = self
            .stack
            .open
            .iter()
            .zip(target)
            .take_while(|(open, wanted)| open == wanted)
            .count();
        self.close_to(common);

        for scope in &target[common..] {
            let (name, location) = match scope {
                Scope::Node(id) => (self.display_name(*id), self.location_hint(*id)),
                Scope::Class(class_name) => (
                    short_name(class_name).to_owned(),
                    self.names.suite_location(class_name),
                ),
            };
            debug!("opening suite `{name}`");
            self.out.push(
                ServiceMessage::new("testSuiteStarted")
                    .attr("name", name)
                    .attr("locationHint", location),
            );
            self.stack.open.push(scope.clone());
        }
    }

    /// Closes open suites, innermost first, until `len` remain.
    ///
    /// A failed container gets its unstarted leaves reported before it closes.
    fn close_to(&mut self, len: usize) {
        while self.stack.open.len() > len {
            if let Some(&Scope::Node(id)) = self.stack.open.last()
                && let Some(pos) = self.stack.failed.iter().position(|&f| f == id)
            {
                self.stack.failed.swap_remove(pos);
                self.bracket_unstarted(id);
                continue;
            }

            let Some(scope) = self.stack.open.pop() else {
                break;
            };
            let name = match &scope {
                Scope::Node(id) => self.display_name(*id),
                Scope::Class(class_name) => short_name(class_name).to_owned(),
            };
            debug!("closing suite `{name}`");
            self.out.push(ServiceMessage::new("testSuiteFinished").attr("name", name));
        }
    }

    fn display_name(&self, id: NodeId) -> String {
        self.names.display_name(self.tree, id).unwrap_or_default()
    }

    fn location_hint(&self, id: NodeId) -> String {
        self.names.location_hint(self.tree, id).unwrap_or_default()
    }
}
