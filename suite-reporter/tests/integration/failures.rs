// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failures, assumption failures and ignored tests, on leaves and on containers.

use crate::fixtures::*;
use color_eyre::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use suite_reporter::{
    config::ReporterConfig,
    reporter::{FailureRecord, ReporterEvent},
    tree::SuiteTree,
    verify::check_lines,
};

#[test]
fn setup_class_assumption_failure() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let test_a = tree.add_container(tree.root(), "TestA")?;
    tree.add_leaf(test_a, "TestA", "testName")?;
    let test_b = tree.add_container(tree.root(), "TestB")?;
    tree.add_leaf(test_b, "TestB", "testNameB")?;

    let phases = run_events(
        &tree,
        &java_config(),
        [test_a, test_b].map(|node| ReporterEvent::AssumptionFailed {
            node,
            failure: exception(),
        }),
    );
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='java:suite://TestA']
            ##teamcity[testStarted name='TestA.testName' locationHint='java:test://TestA/testName']
            ##teamcity[testIgnored name='TestA.testName' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='TestA.testName']
            ##teamcity[testSuiteFinished name='TestA']
            ##teamcity[testSuiteStarted name='TestB' locationHint='java:suite://TestB']
            ##teamcity[testStarted name='TestB.testNameB' locationHint='java:test://TestB/testNameB']
            ##teamcity[testIgnored name='TestB.testNameB' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='TestB.testNameB']
            ##teamcity[testSuiteFinished name='TestB']
        "}
    );
    Ok(())
}

#[test]
fn setup_class_failure() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let test_a = tree.add_container(tree.root(), "TestA")?;
    tree.add_leaf(test_a, "TestA", "testName")?;

    let phases = run_events(
        &tree,
        &java_config(),
        [ReporterEvent::TestFailed {
            node: test_a,
            failures: vec![exception()],
        }],
    );
    // The test never starts, but it still shows up in the class before it closes.
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='java:suite://TestA']
            ##teamcity[testStarted name='Class Configuration' locationHint='java:suite://TestA']
            ##teamcity[testFailed name='Class Configuration' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='Class Configuration']
            ##teamcity[testStarted name='TestA.testName' locationHint='java:test://TestA/testName']
            ##teamcity[testIgnored name='TestA.testName']
            ##teamcity[testFinished name='TestA.testName']
            ##teamcity[testSuiteFinished name='TestA']
        "}
    );
    Ok(())
}

#[test]
fn setup_failure_of_root_class() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("TestA");
    tree.add_leaf(tree.root(), "TestA", "test1")?;
    tree.add_leaf(tree.root(), "TestA", "test2")?;

    let phases = run_events(
        &tree,
        &java_config(),
        [ReporterEvent::TestFailed {
            node: tree.root(),
            failures: vec![exception()],
        }],
    );
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='TestA' location='java:suite://TestA']
            ##teamcity[testStarted name='Class Configuration' locationHint='java:suite://TestA']
            ##teamcity[testFailed name='Class Configuration' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='Class Configuration']
            ##teamcity[testStarted name='TestA.test1' locationHint='java:test://TestA/test1']
            ##teamcity[testIgnored name='TestA.test1']
            ##teamcity[testFinished name='TestA.test1']
            ##teamcity[testStarted name='TestA.test2' locationHint='java:test://TestA/test2']
            ##teamcity[testIgnored name='TestA.test2']
            ##teamcity[testFinished name='TestA.test2']
        "}
    );
    Ok(())
}

#[test]
fn parallel_execution() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let test1 = tree.add_leaf(tree.root(), "TestA", "test1")?;
    let test2 = tree.add_leaf(tree.root(), "TestB", "test2")?;
    let config = ReporterConfig {
        wrap_orphan_leaves: true,
        ..java_config()
    };

    let events = vec![
        ReporterEvent::TestStarted(test1),
        ReporterEvent::TestStarted(test2),
        ReporterEvent::TestFinished(test2),
        ReporterEvent::TestFailed {
            node: test1,
            failures: vec![exception()],
        },
        ReporterEvent::TestFinished(test1),
    ];
    let phases = run_events(&tree, &config, events);

    // test2 ran while test1 was still open, so it's written once test1 is done.
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='java:suite://TestA']
            ##teamcity[testStarted name='TestA.test1' locationHint='java:test://TestA/test1']
            ##teamcity[testFailed name='TestA.test1' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='TestA.test1']
            ##teamcity[testSuiteFinished name='TestA']
            ##teamcity[testSuiteStarted name='TestB' locationHint='java:suite://TestB']
            ##teamcity[testStarted name='TestB.test2' locationHint='java:test://TestB/test2']
            ##teamcity[testFinished name='TestB.test2']
            ##teamcity[testSuiteFinished name='TestB']
        "}
    );
    check_lines(phases.live.lines(), "teamcity")?;
    Ok(())
}

#[test]
fn skip_during_another_test_waits() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let test_a = tree.add_container(tree.root(), "TestA")?;
    let test1 = tree.add_leaf(test_a, "TestA", "test1")?;
    let test_b = tree.add_container(tree.root(), "TestB")?;
    tree.add_leaf(test_b, "TestB", "test2")?;

    let events = vec![
        ReporterEvent::TestStarted(test1),
        ReporterEvent::AssumptionFailed {
            node: test_b,
            failure: exception(),
        },
        ReporterEvent::TestFinished(test1),
    ];
    let phases = run_events(&tree, &java_config(), events);
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='java:suite://TestA']
            ##teamcity[testStarted name='TestA.test1' locationHint='java:test://TestA/test1']
            ##teamcity[testFinished name='TestA.test1']
            ##teamcity[testSuiteFinished name='TestA']
            ##teamcity[testSuiteStarted name='TestB' locationHint='java:suite://TestB']
            ##teamcity[testStarted name='TestB.test2' locationHint='java:test://TestB/test2']
            ##teamcity[testIgnored name='TestB.test2' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='TestB.test2']
            ##teamcity[testSuiteFinished name='TestB']
        "}
    );
    Ok(())
}

#[test]
fn tear_down_class_failure() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let test_a = tree.add_container(tree.root(), "TestA")?;
    let test_name = tree.add_leaf(test_a, "TestA", "testName")?;

    let mut events = started_finished(&[test_name]);
    events.push(ReporterEvent::TestFailed {
        node: test_a,
        failures: vec![exception()],
    });
    let phases = run_events(&tree, &java_config(), events);
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='java:suite://TestA']
            ##teamcity[testStarted name='TestA.testName' locationHint='java:test://TestA/testName']
            ##teamcity[testFinished name='TestA.testName']
            ##teamcity[testStarted name='Class Configuration' locationHint='java:suite://TestA']
            ##teamcity[testFailed name='Class Configuration' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='Class Configuration']
            ##teamcity[testSuiteFinished name='TestA']
        "}
    );
    Ok(())
}

#[test]
fn tear_down_failure_of_root_class() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("TestA");
    let test_name = tree.add_leaf(tree.root(), "TestA", "testName")?;

    let mut events = started_finished(&[test_name]);
    events.push(ReporterEvent::TestFailed {
        node: tree.root(),
        failures: vec![exception()],
    });
    let phases = run_events(&tree, &java_config(), events);
    assert_eq!(
        phases.tree,
        indoc! {"
            ##teamcity[enteredTheMatrix]
            ##teamcity[suiteTreeNode name='TestA.testName' locationHint='java:test://TestA/testName']
            ##teamcity[treeEnded]
        "}
    );
    // The root is never a suite of its own, so the pseudo-leaf sits at the top.
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='TestA' location='java:suite://TestA']
            ##teamcity[testStarted name='TestA.testName' locationHint='java:test://TestA/testName']
            ##teamcity[testFinished name='TestA.testName']
            ##teamcity[testStarted name='Class Configuration' locationHint='java:suite://TestA']
            ##teamcity[testFailed name='Class Configuration' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='Class Configuration']
        "}
    );
    Ok(())
}

#[test]
fn assumption_failure_for_parameterized_class() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let test_a = tree.add_container(tree.root(), "TestA")?;
    let param = tree.add_container(test_a, "param")?;
    let test_name = tree.add_leaf(param, "TestA", "testName")?;

    let phases = run_events(
        &tree,
        &java_config(),
        [ReporterEvent::AssumptionFailed {
            node: test_a,
            failure: exception(),
        }],
    );
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='java:suite://TestA']
            ##teamcity[testSuiteStarted name='param' locationHint='java:suite://param']
            ##teamcity[testStarted name='TestA.testName' locationHint='java:test://TestA/testName']
            ##teamcity[testIgnored name='TestA.testName' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='TestA.testName']
            ##teamcity[testSuiteFinished name='param']
            ##teamcity[testSuiteFinished name='TestA']
        "}
    );

    // On a leaf the framework brackets the test itself, so only the ignore is written.
    let phases = run_events(
        &tree,
        &java_config(),
        [ReporterEvent::AssumptionFailed {
            node: test_name,
            failure: exception(),
        }],
    );
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testIgnored name='TestA.testName' error='true' message='' details='java.lang.Exception|n']
        "}
    );
    Ok(())
}

#[test]
fn alternating_assumption_failures() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let mut events = Vec::new();
    for i in 0..5 {
        let class_name = format!("Test{i}");
        let class = tree.add_container(tree.root(), class_name.as_str())?;
        let test = tree.add_leaf(class, class_name, "testName")?;
        if i % 2 != 0 {
            events.push(ReporterEvent::AssumptionFailed {
                node: class,
                failure: exception(),
            });
        } else {
            events.extend(started_finished(&[test]));
        }
    }

    let phases = run_events(&tree, &java_config(), events);
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='Test0' locationHint='java:suite://Test0']
            ##teamcity[testStarted name='Test0.testName' locationHint='java:test://Test0/testName']
            ##teamcity[testFinished name='Test0.testName']
            ##teamcity[testSuiteFinished name='Test0']
            ##teamcity[testSuiteStarted name='Test1' locationHint='java:suite://Test1']
            ##teamcity[testStarted name='Test1.testName' locationHint='java:test://Test1/testName']
            ##teamcity[testIgnored name='Test1.testName' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='Test1.testName']
            ##teamcity[testSuiteFinished name='Test1']
            ##teamcity[testSuiteStarted name='Test2' locationHint='java:suite://Test2']
            ##teamcity[testStarted name='Test2.testName' locationHint='java:test://Test2/testName']
            ##teamcity[testFinished name='Test2.testName']
            ##teamcity[testSuiteFinished name='Test2']
            ##teamcity[testSuiteStarted name='Test3' locationHint='java:suite://Test3']
            ##teamcity[testStarted name='Test3.testName' locationHint='java:test://Test3/testName']
            ##teamcity[testIgnored name='Test3.testName' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='Test3.testName']
            ##teamcity[testSuiteFinished name='Test3']
            ##teamcity[testSuiteStarted name='Test4' locationHint='java:suite://Test4']
            ##teamcity[testStarted name='Test4.testName' locationHint='java:test://Test4/testName']
            ##teamcity[testFinished name='Test4.testName']
            ##teamcity[testSuiteFinished name='Test4']
        "}
    );
    Ok(())
}

#[test]
fn container_assumption_failure_mid_class() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let class = tree.add_container(tree.root(), "TestA")?;
    let first = tree.add_leaf(class, "TestA", "first")?;
    let second = tree.add_leaf(class, "TestA", "second")?;
    tree.add_leaf(class, "TestA", "third")?;

    let events = vec![
        ReporterEvent::TestStarted(first),
        ReporterEvent::TestFinished(first),
        ReporterEvent::TestStarted(second),
        ReporterEvent::AssumptionFailed {
            node: class,
            failure: FailureRecord::assertion("no network", ""),
        },
        ReporterEvent::TestFinished(second),
    ];
    let phases = run_events(&tree, &ReporterConfig::default(), events);

    // Finished tests are left alone and the running one is marked in place. The rest are
    // bracketed here since the framework won't start them, once the running one is done.
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='suite://TestA']
            ##teamcity[testStarted name='TestA.first' locationHint='test://TestA/first']
            ##teamcity[testFinished name='TestA.first']
            ##teamcity[testStarted name='TestA.second' locationHint='test://TestA/second']
            ##teamcity[testIgnored name='TestA.second' message='no network' details='']
            ##teamcity[testFinished name='TestA.second']
            ##teamcity[testStarted name='TestA.third' locationHint='test://TestA/third']
            ##teamcity[testIgnored name='TestA.third' message='no network' details='']
            ##teamcity[testFinished name='TestA.third']
            ##teamcity[testSuiteFinished name='TestA']
        "}
    );
    Ok(())
}

#[test]
fn ignored_tests_and_containers() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let class = tree.add_container(tree.root(), "a.TestA")?;
    let disabled = tree.add_leaf(class, "a.TestA", "disabled")?;
    let empty = tree.add_container(tree.root(), "a.Empty")?;

    let events = vec![
        ReporterEvent::TestIgnored {
            node: disabled,
            reason: Some("flaky".to_owned()),
        },
        // Already reported, so nothing more is written.
        ReporterEvent::TestIgnored {
            node: disabled,
            reason: None,
        },
        ReporterEvent::TestIgnored {
            node: empty,
            reason: None,
        },
    ];
    let phases = run_events(&tree, &ReporterConfig::default(), events);
    assert_eq!(
        phases.live,
        indoc! {"
            ##teamcity[rootName name='root' location='suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='suite://a.TestA']
            ##teamcity[testStarted name='TestA.disabled' locationHint='test://a.TestA/disabled']
            ##teamcity[testIgnored name='TestA.disabled' message='flaky']
            ##teamcity[testFinished name='TestA.disabled']
            ##teamcity[testSuiteFinished name='TestA']
            ##teamcity[testSuiteStarted name='Empty' locationHint='suite://a.Empty']
            ##teamcity[testStarted name='Class Configuration' locationHint='suite://a.Empty']
            ##teamcity[testIgnored name='Class Configuration']
            ##teamcity[testFinished name='Class Configuration']
            ##teamcity[testSuiteFinished name='Empty']
        "}
    );
    Ok(())
}

#[test]
fn multiple_failures_on_one_test() -> Result<()> {
    let mut tree = SuiteTree::with_root_container("root");
    let test = tree.add_leaf(tree.root(), "TestA", "test1")?;
    let config = ReporterConfig {
        wrap_orphan_leaves: true,
        ..java_config()
    };

    let events = vec![
        ReporterEvent::TestStarted(test),
        ReporterEvent::TestFailed {
            node: test,
            failures: vec![exception(), exception()],
        },
        ReporterEvent::TestFinished(test),
    ];
    let output = run_untreed(&tree, &config, events);
    assert_eq!(
        output,
        indoc! {"
            ##teamcity[enteredTheMatrix]
            ##teamcity[rootName name='root' location='java:suite://root']
            ##teamcity[testSuiteStarted name='TestA' locationHint='java:suite://TestA']
            ##teamcity[testStarted name='TestA.test1' locationHint='java:test://TestA/test1']
            ##teamcity[testFailed name='TestA.test1' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFailed name='TestA.test1' error='true' message='' details='java.lang.Exception|n']
            ##teamcity[testFinished name='TestA.test1']
            ##teamcity[testSuiteFinished name='TestA']
        "}
    );
    Ok(())
}

#[test]
fn long_details_are_kept_whole() {
    let tree = SuiteTree::with_root_leaf("A", "a");
    let trace = "\tat A.a(A.java:1)\n".repeat(10_000);
    let failure = FailureRecord::assertion(trace.clone(), trace.clone())
        .with_comparison(trace.clone(), format!("diff{trace}"));

    let output = run_untreed(
        &tree,
        &java_config(),
        [ReporterEvent::TestFailed {
            node: tree.root(),
            failures: vec![failure],
        }],
    );

    let start = indoc! {"
        ##teamcity[enteredTheMatrix]
        ##teamcity[rootName name='A' location='java:suite://A']
        ##teamcity[testFailed name='A.a' "};
    assert!(output.starts_with(start), "unexpected start: {}", &output[..200]);

    let escaped = trace.replace('\n', "|n");
    assert!(output.contains(&format!("details='{escaped}'")));
    assert!(output.contains(&format!("actual='diff{escaped}'")));
    assert_eq!(output.lines().count(), 3, "one line per message");
}
