// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Stream vocabulary: tags, timestamps, and emitted packets.

use std::collections::BTreeMap;
use std::fmt;
use tensor_core::Tensor;

/// Named logical input/output slot for tensors.
///
/// The batcher treats a tag as an opaque key. Hosts restrict tags to
/// `[A-Z0-9_]+`; [`Tag::is_valid`] checks that alphabet and configuration
/// validation enforces it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Creates a tag without validating its alphabet.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the tag is non-empty and uses only `A-Z`, `0-9`, `_`.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Position of an item in the stream. Totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Returns the raw value.
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

/// Tensors keyed by tag, as exchanged with an inference backend.
pub type TensorMap = BTreeMap<Tag, Tensor>;

/// One tensor emitted on an output port.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPacket {
    /// Output port the tensor belongs to.
    pub tag: Tag,
    /// Timestamp of the input row that produced it.
    pub timestamp: Timestamp,
    /// The per-timestamp output value.
    pub tensor: Tensor,
}
