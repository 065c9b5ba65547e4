// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! name = "lstm_classifier"
//! batch_size = 1
//! add_batch_dim = true
//! inputs = ["FEATURES", "STATE_IN"]
//! outputs = ["LABELS"]
//! recurrent_tag_pairs = ["STATE_IN:STATE_OUT"]
//! missing_input = "skip"
//! max_concurrent_runs = 2
//! ```

use crate::{ModelSignature, RecurrentBinding, RuntimeError, Tag};
use run_throttle::ThrottleLimit;
use std::collections::BTreeSet;
use std::path::Path;

/// What to do when a required input is absent at a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingInputPolicy {
    /// Return [`RuntimeError::MissingInput`].
    #[default]
    Fail,
    /// Drop the whole timestamp and keep going.
    Skip,
}

/// Configuration for one engine-binding instance.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Instance name, used as the counter-name prefix.
    #[serde(default = "default_name")]
    pub name: String,
    /// Number of timestamps combined into one engine invocation (≥ 1).
    pub batch_size: usize,
    /// Insert a leading dimension of size 1 into every input and strip it
    /// from every output.
    #[serde(default = "default_true")]
    pub add_batch_dim: bool,
    /// Input ports, in the order their tensors are bound.
    pub inputs: Vec<Tag>,
    /// Output ports, in emission order.
    pub outputs: Vec<Tag>,
    /// `"FEED:FETCH"` pairs threading outputs back as inputs.
    #[serde(default)]
    pub recurrent_tag_pairs: Vec<String>,
    /// Policy for absent required inputs.
    #[serde(default)]
    pub missing_input: MissingInputPolicy,
    /// Maximum concurrent engine runs for a throttle built from this
    /// config; `0` means unbounded.
    #[serde(default)]
    pub max_concurrent_runs: u32,
}

fn default_name() -> String {
    "StreamEngine".to_string()
}

fn default_true() -> bool {
    true
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| RuntimeError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::Config(format!("TOML serialise error: {e}")))
    }

    /// Checks the configuration on its own, without a model signature.
    ///
    /// Rejects a zero batch size, empty or duplicated port lists, tags
    /// outside `[A-Z0-9_]`, malformed recurrent pairs, and recurrence
    /// combined with `batch_size > 1`.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.batch_size == 0 {
            return Err(RuntimeError::Config("batch_size must be at least 1".into()));
        }
        check_ports("inputs", &self.inputs)?;
        check_ports("outputs", &self.outputs)?;

        let bindings = self.recurrent_bindings()?;
        if self.batch_size != 1 && !bindings.is_empty() {
            return Err(RuntimeError::Config(format!(
                "recurrent_tag_pairs require batch_size 1, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }

    /// Checks that every configured tag is bound by `signature`.
    pub fn validate_against(&self, signature: &ModelSignature) -> Result<(), RuntimeError> {
        let bindings = self.recurrent_bindings()?;
        let tags = self
            .inputs
            .iter()
            .chain(&self.outputs)
            .chain(bindings.iter().flat_map(|b| [&b.feed, &b.fetch]));
        for tag in tags {
            if !signature.contains(tag) {
                return Err(RuntimeError::Config(format!(
                    "can't find tag '{tag}' in signature '{}'",
                    signature.name
                )));
            }
        }
        Ok(())
    }

    /// Parses `recurrent_tag_pairs` into bindings.
    ///
    /// Each pair must be two non-empty, valid tags separated by one colon,
    /// and a feed tag may be bound only once.
    pub fn recurrent_bindings(&self) -> Result<Vec<RecurrentBinding>, RuntimeError> {
        let mut feeds = BTreeSet::new();
        let mut bindings = Vec::with_capacity(self.recurrent_tag_pairs.len());
        for pair in &self.recurrent_tag_pairs {
            let binding = RecurrentBinding::parse(pair)?;
            if !feeds.insert(binding.feed.clone()) {
                return Err(RuntimeError::Config(format!(
                    "recurrent feed tag '{}' is bound more than once",
                    binding.feed
                )));
            }
            bindings.push(binding);
        }
        Ok(bindings)
    }

    /// Returns the throttle limit described by `max_concurrent_runs`.
    pub fn throttle_limit(&self) -> ThrottleLimit {
        ThrottleLimit::from_max(self.max_concurrent_runs)
    }
}

fn check_ports(kind: &str, ports: &[Tag]) -> Result<(), RuntimeError> {
    if ports.is_empty() {
        return Err(RuntimeError::Config(format!("{kind} must name at least one tag")));
    }
    let mut seen = BTreeSet::new();
    for tag in ports {
        if !tag.is_valid() {
            return Err(RuntimeError::Config(format!(
                "invalid tag '{tag}' in {kind}: tags must match [A-Z0-9_]+"
            )));
        }
        if !seen.insert(tag) {
            return Err(RuntimeError::Config(format!("duplicate tag '{tag}' in {kind}")));
        }
    }
    Ok(())
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            batch_size: 1,
            add_batch_dim: true,
            inputs: vec![Tag::from("INPUT")],
            outputs: vec![Tag::from("OUTPUT")],
            recurrent_tag_pairs: Vec::new(),
            missing_input: MissingInputPolicy::Fail,
            max_concurrent_runs: 0,
        }
    }
}
