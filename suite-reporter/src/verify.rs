// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checking a message stream for well-nestedness.
//!
//! A stream is well nested when its bracketing messages form a valid bracket sequence, matched by
//! their `name` attribute:
//!
//! | Opens              | Closes              |
//! |--------------------|---------------------|
//! | `testSuiteStarted` | `testSuiteFinished` |
//! | `testStarted`      | `testFinished`      |
//! | `suiteTreeStarted` | `suiteTreeEnded`    |
//!
//! Every other message is ignored.

use crate::errors::NestingError;
use service_messages::ServiceMessage;

/// Counts gathered from a well-nested stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NestingSummary {
    /// The number of suites opened, in either phase.
    pub suites: usize,

    /// The number of tests started.
    pub tests: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bracket {
    Suite,
    Test,
    TreeSuite,
}

impl Bracket {
    fn classify(message_name: &str) -> Option<(Self, bool)> {
        let classified = match message_name {
            "testSuiteStarted" => (Self::Suite, true),
            "testSuiteFinished" => (Self::Suite, false),
            "testStarted" => (Self::Test, true),
            "testFinished" => (Self::Test, false),
            "suiteTreeStarted" => (Self::TreeSuite, true),
            "suiteTreeEnded" => (Self::TreeSuite, false),
            _ => return None,
        };
        Some(classified)
    }
}

/// Checks that `messages` are well nested.
pub fn check_nesting<'m>(
    messages: impl IntoIterator<Item = &'m ServiceMessage>,
) -> Result<NestingSummary, NestingError> {
    let mut open: Vec<(Bracket, &'m str)> = Vec::new();
    let mut summary = NestingSummary::default();

    for (index, message) in messages.into_iter().enumerate() {
        let Some((bracket, opens)) = Bracket::classify(&message.name) else {
            continue;
        };
        let name = message
            .name_attr()
            .ok_or_else(|| NestingError::MissingName {
                index,
                message: message.name.clone(),
            })?;

        if opens {
            match bracket {
                Bracket::Suite | Bracket::TreeSuite => summary.suites += 1,
                Bracket::Test => summary.tests += 1,
            }
            open.push((bracket, name));
            continue;
        }

        match open.last() {
            Some(&(top_bracket, top_name)) if top_bracket == bracket && top_name == name => {
                open.pop();
            }
            top => {
                return Err(NestingError::UnexpectedClose {
                    index,
                    message: message.name.clone(),
                    name: name.to_owned(),
                    expected: top.map(|&(_, top_name)| top_name.to_owned()),
                });
            }
        }
    }

    if open.is_empty() {
        Ok(summary)
    } else {
        Err(NestingError::Unclosed {
            open: open.into_iter().map(|(_, name)| name.to_owned()).collect(),
        })
    }
}

/// Decodes `lines` and checks that they are well nested.
///
/// Blank lines and lines that aren't service messages for `protocol` are skipped, since captured
/// output usually has ordinary text mixed in.
pub fn check_lines<'l>(
    lines: impl IntoIterator<Item = &'l str>,
    protocol: &str,
) -> Result<NestingSummary, NestingError> {
    let prefix = format!("##{protocol}[");
    let messages = lines
        .into_iter()
        .filter(|line| line.trim_start().starts_with(&prefix))
        .enumerate()
        .map(|(index, line)| {
            ServiceMessage::parse(line.trim_start(), protocol)
                .map_err(|error| NestingError::Parse { index, error })
        })
        .collect::<Result<Vec<_>, _>>()?;
    check_nesting(&messages)
}
