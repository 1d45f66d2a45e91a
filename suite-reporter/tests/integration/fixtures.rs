// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use suite_reporter::{
    config::ReporterConfig,
    reporter::{FailureRecord, ReporterEvent, TreeReporter},
    tree::{NodeId, SuiteTree},
};

const TREE_ENDED: &str = "##teamcity[treeEnded]\n";

/// The configuration used by most scenarios: location hints carry a `java:` scheme.
pub(crate) fn java_config() -> ReporterConfig {
    ReporterConfig {
        location_protocol: Some("java".to_owned()),
        ..ReporterConfig::default()
    }
}

/// Output of a run that described the tree first, split into its two phases.
#[derive(Debug)]
pub(crate) struct Phases {
    pub(crate) tree: String,
    pub(crate) live: String,
}

/// Describes the tree, then starts and finishes each of `tests` in turn.
pub(crate) fn run_tests(tree: &SuiteTree, tests: &[NodeId]) -> Phases {
    run_events(tree, &java_config(), started_finished(tests))
}

/// Describes the tree, then feeds `events` between the run's start and finish.
pub(crate) fn run_events(
    tree: &SuiteTree,
    config: &ReporterConfig,
    events: impl IntoIterator<Item = ReporterEvent>,
) -> Phases {
    let mut reporter = TreeReporter::new(tree, config, Vec::new());
    reporter.emit_tree().expect("writing to a Vec succeeds");
    feed(&mut reporter, events);

    let output = String::from_utf8(reporter.into_inner()).expect("output is UTF-8");
    let split = output
        .find(TREE_ENDED)
        .map(|pos| pos + TREE_ENDED.len())
        .expect("tree phase is terminated");
    let (tree, live) = output.split_at(split);
    Phases {
        tree: tree.to_owned(),
        live: live.to_owned(),
    }
}

/// Feeds `events` between the run's start and finish, without describing the tree first.
pub(crate) fn run_untreed(
    tree: &SuiteTree,
    config: &ReporterConfig,
    events: impl IntoIterator<Item = ReporterEvent>,
) -> String {
    let mut reporter = TreeReporter::new(tree, config, Vec::new());
    feed(&mut reporter, events);
    String::from_utf8(reporter.into_inner()).expect("output is UTF-8")
}

fn feed(
    reporter: &mut TreeReporter<'_, Vec<u8>>,
    events: impl IntoIterator<Item = ReporterEvent>,
) {
    reporter.run_started().expect("writing to a Vec succeeds");
    for event in events {
        reporter
            .write_event(event)
            .expect("writing to a Vec succeeds");
    }
    reporter.run_finished().expect("writing to a Vec succeeds");
}

pub(crate) fn started_finished(tests: &[NodeId]) -> Vec<ReporterEvent> {
    tests
        .iter()
        .flat_map(|&test| {
            [
                ReporterEvent::TestStarted(test),
                ReporterEvent::TestFinished(test),
            ]
        })
        .collect()
}

/// Adds parameter groups `[0]` and `[1]` under `class`, each holding one `testName[n]` leaf.
pub(crate) fn attach_parameterized_tests(
    tree: &mut SuiteTree,
    class: NodeId,
    class_name: &str,
) -> Vec<NodeId> {
    ["[0]", "[1]"]
        .into_iter()
        .map(|param| {
            let group = tree.add_container(class, param).expect("class is a container");
            tree.add_leaf(group, class_name, format!("testName{param}"))
                .expect("group is a container")
        })
        .collect()
}

/// An error without a message, whose trace is just its type.
pub(crate) fn exception() -> FailureRecord {
    FailureRecord::error("", "java.lang.Exception\n")
}
