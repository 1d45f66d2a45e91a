// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    events::{FailureRecord, ReporterEvent},
    scope::ScopeStack,
    tree_dump::emit_tree,
};
use crate::{
    config::ReporterConfig,
    errors::WriteEventError,
    names::NameResolver,
    tree::{NodeId, SuiteTree},
};
use service_messages::ServiceMessage;
use std::io;

/// Reports one run of a [`SuiteTree`] to an output sink.
///
/// The reporter owns the sink for as long as the run lasts and borrows the tree. Each call writes
/// all of its lines and flushes before returning.
///
/// Dropping the reporter doesn't write anything. To keep the output well-formed after a run was
/// cancelled, call [`run_finished`](Self::run_finished) first.
pub struct TreeReporter<'a, W> {
    tree: &'a SuiteTree,
    names: NameResolver,
    protocol: String,
    stack: ScopeStack,
    writer: W,
    buf: Vec<u8>,
}

impl<'a, W: io::Write> TreeReporter<'a, W> {
    /// Creates a new reporter writing to `writer`.
    pub fn new(tree: &'a SuiteTree, config: &ReporterConfig, writer: W) -> Self {
        Self {
            tree,
            names: config.name_resolver(),
            protocol: config.protocol_name.clone(),
            stack: ScopeStack::new(config),
            writer,
            buf: Vec::with_capacity(1024),
        }
    }

    /// Describes the tree. Call this at most once, before the run starts.
    pub fn emit_tree(&mut self) -> Result<(), WriteEventError> {
        let messages = emit_tree(self.tree, &self.names);
        self.write_messages(&messages)?;
        self.stack.set_tree_emitted();
        Ok(())
    }

    /// Applies an event and writes the messages it produces.
    ///
    /// The reporter's state only advances once the messages are written. If the sink fails, the
    /// event counts as not delivered and may be retried.
    pub fn write_event(&mut self, event: ReporterEvent) -> Result<(), WriteEventError> {
        let mut next = self.stack.clone();
        let messages = next.transition(self.tree, &self.names, event);
        self.write_messages(&messages)?;
        self.stack = next;
        Ok(())
    }

    /// Reports the start of the run.
    pub fn run_started(&mut self) -> Result<(), WriteEventError> {
        self.write_event(ReporterEvent::RunStarted)
    }

    /// Reports that a test or container started.
    pub fn test_started(&mut self, node: NodeId) -> Result<(), WriteEventError> {
        self.write_event(ReporterEvent::TestStarted(node))
    }

    /// Reports that a test or container finished.
    pub fn test_finished(&mut self, node: NodeId) -> Result<(), WriteEventError> {
        self.write_event(ReporterEvent::TestFinished(node))
    }

    /// Reports one or more failures of a test or container.
    pub fn test_failed(
        &mut self,
        node: NodeId,
        failures: impl IntoIterator<Item = FailureRecord>,
    ) -> Result<(), WriteEventError> {
        self.write_event(ReporterEvent::TestFailed {
            node,
            failures: failures.into_iter().collect(),
        })
    }

    /// Reports an assumption failure of a test or container.
    pub fn assumption_failed(
        &mut self,
        node: NodeId,
        failure: FailureRecord,
    ) -> Result<(), WriteEventError> {
        self.write_event(ReporterEvent::AssumptionFailed { node, failure })
    }

    /// Reports that a test or container is disabled.
    pub fn test_ignored(
        &mut self,
        node: NodeId,
        reason: Option<String>,
    ) -> Result<(), WriteEventError> {
        self.write_event(ReporterEvent::TestIgnored { node, reason })
    }

    /// Reports the end of the run, closing every suite still open.
    pub fn run_finished(&mut self) -> Result<(), WriteEventError> {
        self.write_event(ReporterEvent::RunFinished)
    }

    /// Consumes the reporter, returning the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_messages(&mut self, messages: &[ServiceMessage]) -> Result<(), WriteEventError> {
        if messages.is_empty() {
            return Ok(());
        }

        self.buf.clear();
        for message in messages {
            message
                .serialize(&self.protocol, &mut self.buf)
                .map_err(WriteEventError::Io)?;
        }
        self.writer
            .write_all(&self.buf)
            .map_err(WriteEventError::Io)?;
        self.writer.flush().map_err(WriteEventError::Io)
    }
}
