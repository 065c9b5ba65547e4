// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! JSON model signature parsing.
//!
//! A signature lists the tags a loaded model binds and the engine tensor
//! name behind each one. Configuration is validated against it before an
//! engine starts.
//!
//! # Format
//! ```json
//! {
//!   "name": "lstm_classifier",
//!   "tags": {
//!     "FEATURES": "serving_default_features:0",
//!     "STATE_IN": "serving_default_state:0",
//!     "STATE_OUT": "StatefulPartitionedCall:1",
//!     "LABELS": "StatefulPartitionedCall:0"
//!   }
//! }
//! ```

use crate::{RuntimeError, Tag};
use std::collections::BTreeMap;
use std::path::Path;

/// Tag to tensor-name map describing a model's bindable ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ModelSignature {
    /// Model name, used in diagnostics.
    #[serde(default)]
    pub name: String,
    /// Engine tensor name for each tag.
    pub tags: BTreeMap<Tag, String>,
}

impl ModelSignature {
    /// Loads a signature from a JSON file path.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::Config(format!("cannot read signature '{}': {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parses a signature from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RuntimeError> {
        let signature: Self = serde_json::from_str(json)
            .map_err(|e| RuntimeError::Config(format!("signature JSON error: {e}")))?;
        if let Some(bad) = signature.tags.keys().find(|t| !t.is_valid()) {
            return Err(RuntimeError::Config(format!(
                "invalid tag '{bad}' in signature '{}'",
                signature.name
            )));
        }
        Ok(signature)
    }

    /// Builds a signature whose tensor names equal the tag names.
    pub fn from_tags<I, T>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        let tags = tags
            .into_iter()
            .map(|t| {
                let tag = t.into();
                let tensor = tag.as_str().to_string();
                (tag, tensor)
            })
            .collect();
        Self {
            name: name.into(),
            tags,
        }
    }

    /// Returns `true` if the model binds `tag`.
    pub fn contains(&self, tag: &Tag) -> bool {
        self.tags.contains_key(tag)
    }

    /// Returns the engine tensor name bound to `tag`.
    pub fn tensor_name(&self, tag: &Tag) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }
}
