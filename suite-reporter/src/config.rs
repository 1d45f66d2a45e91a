// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Configuration is read from TOML. Every key is optional in a user file: anything left unset is
//! taken from the defaults embedded in this crate (`default-reporter-config.toml`). Unknown keys
//! are warned about and otherwise ignored.

use crate::{errors::ReporterConfigError, names::NameResolver};
use camino::Utf8Path;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Resolved reporter configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReporterConfig {
    /// The protocol name written after `##` on every line.
    pub protocol_name: String,

    /// A scheme prepended to location hints, e.g. `java`.
    pub location_protocol: Option<String>,

    /// Whether a run started without a tree dump still writes the `enteredTheMatrix` preamble.
    pub announce_untreed_runs: bool,

    /// Whether leaves directly under the root are wrapped in a suite for their class.
    pub wrap_orphan_leaves: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        DefaultReporterConfig::from_embedded().0
    }
}

impl ReporterConfig {
    /// Loads configuration from a TOML file, layered over the defaults.
    pub fn from_path(path: &Utf8Path) -> Result<Self, ReporterConfigError> {
        Self::from_path_with_warnings(path, &mut DefaultReporterConfigWarnings)
    }

    /// Parses configuration from TOML text, layered over the defaults.
    ///
    /// `path` is only used for error messages and warnings.
    pub fn from_toml_str(contents: &str, path: &Utf8Path) -> Result<Self, ReporterConfigError> {
        Self::from_toml_str_with_warnings(contents, path, &mut DefaultReporterConfigWarnings)
    }

    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl ReporterConfigWarnings,
    ) -> Result<Self, ReporterConfigError> {
        debug!("reporter config: loading from {path}");
        let contents = std::fs::read_to_string(path).map_err(|error| ReporterConfigError::Read {
            path: path.to_owned(),
            error,
        })?;
        Self::from_toml_str_with_warnings(&contents, path, warnings)
    }

    fn from_toml_str_with_warnings(
        contents: &str,
        path: &Utf8Path,
        warnings: &mut impl ReporterConfigWarnings,
    ) -> Result<Self, ReporterConfigError> {
        let (config, unknown) =
            DeserializedReporterConfig::deserialize_toml(contents).map_err(|error| {
                ReporterConfigError::Parse {
                    path: path.to_owned(),
                    error,
                }
            })?;
        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        let resolved = config.resolve(ReporterConfig::default());
        resolved.validate(path)?;
        debug!("reporter config: loaded successfully from {path}");
        Ok(resolved)
    }

    /// Returns a name resolver using this configuration's location protocol.
    pub fn name_resolver(&self) -> NameResolver {
        NameResolver::new(self.location_protocol.clone())
    }

    fn validate(&self, path: &Utf8Path) -> Result<(), ReporterConfigError> {
        let invalid = |key, reason: &str| ReporterConfigError::InvalidValue {
            path: path.to_owned(),
            key,
            reason: reason.to_owned(),
        };

        if self.protocol_name.is_empty() {
            return Err(invalid("messages.protocol-name", "must not be empty"));
        }
        if let Some(c) = self
            .protocol_name
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '[' | ']' | '\'' | '|'))
        {
            return Err(invalid(
                "messages.protocol-name",
                &format!("must not contain {c:?}"),
            ));
        }
        if let Some(protocol) = &self.location_protocol {
            if protocol.contains(':') || protocol.contains(char::is_whitespace) {
                return Err(invalid(
                    "messages.location-protocol",
                    "must not contain `:` or whitespace",
                ));
            }
        }
        Ok(())
    }
}

/// Trait for handling configuration warnings, so tests can collect them instead of logging.
trait ReporterConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

struct DefaultReporterConfigWarnings;

impl ReporterConfigWarnings for DefaultReporterConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        let mut iter = unknown.iter();
        match (iter.next(), unknown.len()) {
            (Some(key), 1) => {
                // Print this on the same line.
                unknown_str.push_str("key: ");
                unknown_str.push_str(key);
            }
            _ => {
                unknown_str.push_str("keys:\n");
                for ignored_key in unknown {
                    unknown_str.push('\n');
                    unknown_str.push_str("  - ");
                    unknown_str.push_str(ignored_key);
                }
            }
        }

        warn!("in reporter config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedReporterConfig {
    #[serde(default)]
    messages: DeserializedMessagesConfig,
    #[serde(default)]
    live: DeserializedLiveConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedMessagesConfig {
    protocol_name: Option<String>,
    location_protocol: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedLiveConfig {
    announce_untreed_runs: Option<bool>,
    wrap_orphan_leaves: Option<bool>,
}

impl DeserializedReporterConfig {
    fn deserialize_toml(contents: &str) -> Result<(Self, BTreeSet<String>), toml::de::Error> {
        let deserializer = toml::Deserializer::parse(contents)?;
        let mut unknown = BTreeSet::new();
        let config: DeserializedReporterConfig =
            serde_ignored::deserialize(deserializer, |path| {
                unknown.insert(path.to_string());
            })?;
        Ok((config, unknown))
    }

    fn resolve(self, defaults: ReporterConfig) -> ReporterConfig {
        let location_protocol = match self.messages.location_protocol {
            Some(protocol) => non_empty(protocol),
            None => defaults.location_protocol,
        };
        ReporterConfig {
            protocol_name: self
                .messages
                .protocol_name
                .unwrap_or(defaults.protocol_name),
            location_protocol,
            announce_untreed_runs: self
                .live
                .announce_untreed_runs
                .unwrap_or(defaults.announce_untreed_runs),
            wrap_orphan_leaves: self
                .live
                .wrap_orphan_leaves
                .unwrap_or(defaults.wrap_orphan_leaves),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// The embedded defaults, where every key is required.
#[derive(Clone, Debug)]
struct DefaultReporterConfig(ReporterConfig);

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedDefaultConfig {
    messages: DefaultMessagesConfig,
    live: DefaultLiveConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultMessagesConfig {
    protocol_name: String,
    location_protocol: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultLiveConfig {
    announce_untreed_runs: bool,
    wrap_orphan_leaves: bool,
}

impl DefaultReporterConfig {
    /// The embedded default reporter config TOML.
    const DEFAULT_CONFIG: &'static str = include_str!("../default-reporter-config.toml");

    /// Parses the default config.
    ///
    /// Panics if the embedded TOML is invalid or contains unknown keys.
    fn from_embedded() -> Self {
        let deserializer = toml::Deserializer::parse(Self::DEFAULT_CONFIG)
            .expect("embedded default reporter config should parse");
        let mut unknown = BTreeSet::new();
        let config: DeserializedDefaultConfig =
            serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .expect("embedded default reporter config should be valid");

        // The defaults ship with this crate, so unknown keys are a bug.
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default reporter config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        Self(ReporterConfig {
            protocol_name: config.messages.protocol_name,
            location_protocol: non_empty(config.messages.location_protocol),
            announce_untreed_runs: config.live.announce_untreed_runs,
            wrap_orphan_leaves: config.live.wrap_orphan_leaves,
        })
    }
}
