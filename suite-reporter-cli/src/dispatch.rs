// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, InputPath, ReporterExitCode},
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
    script::Script,
};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::io;
use suite_reporter::{config::ReporterConfig, reporter::TreeReporter, verify::check_lines};
use tracing::{debug, info};

/// Stream hierarchical test runs as CI service messages.
#[derive(Debug, Parser)]
#[command(version, name = "suite-reporter", styles = clap_styles::style())]
pub struct SuiteReporterApp {
    #[command(flatten)]
    output: OutputOpts,

    /// Reporter config file [default: built-in defaults]
    #[arg(long, global = true, value_name = "PATH", env = "SUITE_REPORTER_CONFIG")]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a JSON script of a test run, writing service messages to stdout
    Replay {
        /// The script to replay, or `-` for standard input
        #[arg(value_name = "SCRIPT")]
        script: String,
    },

    /// Check that a captured stream of service messages is well nested
    ///
    /// Lines that aren't service messages are ignored, so the output of a whole CI step can be
    /// checked as is.
    Check {
        /// The captured stream, or `-` for standard input
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,
    },
}

impl SuiteReporterApp {
    /// Initializes the output context, including the logger.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code on success.
    pub fn exec(
        self,
        output: OutputContext,
        output_writer: &mut OutputWriter,
    ) -> Result<i32, ExpectedError> {
        let config = match &self.config {
            Some(path) => {
                ReporterConfig::from_path(path).map_err(ExpectedError::config_parse_error)?
            }
            None => ReporterConfig::default(),
        };

        match self.command {
            Command::Replay { script } => {
                replay(&config, &InputPath::from(script.as_str()), output_writer)
            }
            Command::Check { input } => check(&config, &InputPath::from(input.as_str()), output),
        }
    }
}

fn replay(
    config: &ReporterConfig,
    input: &InputPath,
    output_writer: &mut OutputWriter,
) -> Result<i32, ExpectedError> {
    let contents = read_input(input)?;
    let script = Script::from_json(&contents).map_err(|err| ExpectedError::ScriptParseError {
        input: input.to_string(),
        err,
    })?;
    let resolved = script.resolve().map_err(|err| ExpectedError::ScriptInvalid {
        input: input.to_string(),
        err,
    })?;
    debug!(
        "replaying {} events over {} nodes",
        resolved.events.len(),
        resolved.tree.node_count(),
    );

    let mut reporter = TreeReporter::new(&resolved.tree, config, output_writer.stdout_writer());
    let write_err = |err| ExpectedError::WriteEventError { err };
    if resolved.emit_tree {
        reporter.emit_tree().map_err(write_err)?;
    }
    reporter.run_started().map_err(write_err)?;
    for event in resolved.events {
        reporter.write_event(event).map_err(write_err)?;
    }
    reporter.run_finished().map_err(write_err)?;

    Ok(ReporterExitCode::OK)
}

fn check(
    config: &ReporterConfig,
    input: &InputPath,
    output: OutputContext,
) -> Result<i32, ExpectedError> {
    let contents = read_input(input)?;
    let summary = check_lines(contents.lines(), &config.protocol_name).map_err(|err| {
        ExpectedError::NestingCheckFailed {
            input: input.to_string(),
            err,
        }
    })?;

    let styles = output.stderr_styles();
    info!(
        "`{}` is well nested: {} suites, {} tests",
        input.style(styles.bold),
        summary.suites.style(styles.count),
        summary.tests.style(styles.count),
    );
    Ok(ReporterExitCode::OK)
}

fn read_input(input: &InputPath) -> Result<String, ExpectedError> {
    let contents = match input {
        InputPath::Stdin => io::read_to_string(io::stdin()),
        InputPath::Path(path) => std::fs::read_to_string(path),
    };
    contents.map_err(|err| ExpectedError::input_read_error(input, err))
}
