// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Recurrent state threading.
//!
//! A [`RecurrentBinding`] pairs a feed tag (model input) with a fetch tag
//! (model output). After each invocation the fetch output becomes the feed
//! input of the next one, unless the stream supplies an explicit value on
//! the feed tag first.
//!
//! Stored values are already in engine shape: initial state and fed-back
//! outputs are passed to the engine as-is.

use crate::{RuntimeError, Tag, TensorMap};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tensor_core::Tensor;

/// One feed/fetch tag pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecurrentBinding {
    /// Input tag the stored state is bound to.
    pub feed: Tag,
    /// Output tag whose value becomes the next feed.
    pub fetch: Tag,
}

impl RecurrentBinding {
    /// Parses `"FEED:FETCH"`.
    pub fn parse(pair: &str) -> Result<Self, RuntimeError> {
        let parts: Vec<&str> = pair.split(':').collect();
        let [feed, fetch] = parts.as_slice() else {
            return Err(RuntimeError::Config(format!(
                "recurrent pair '{pair}' must be FEED:FETCH"
            )));
        };
        let binding = Self {
            feed: Tag::from(*feed),
            fetch: Tag::from(*fetch),
        };
        for tag in [&binding.feed, &binding.fetch] {
            if !tag.is_valid() {
                return Err(RuntimeError::Config(format!(
                    "recurrent pair '{pair}' has invalid tag '{tag}'"
                )));
            }
        }
        Ok(binding)
    }
}

impl fmt::Display for RecurrentBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.feed, self.fetch)
    }
}

/// Pending feed values for every binding of one engine instance.
#[derive(Debug, Default)]
pub struct RecurrentState {
    bindings: Vec<RecurrentBinding>,
    pending: BTreeMap<Tag, Tensor>,
    fresh: BTreeSet<Tag>,
}

impl RecurrentState {
    /// Creates empty state for `bindings`.
    pub fn new(bindings: Vec<RecurrentBinding>) -> Self {
        Self {
            bindings,
            pending: BTreeMap::new(),
            fresh: BTreeSet::new(),
        }
    }

    /// Stores initial state used by the first invocation.
    ///
    /// Every key must be a bound feed tag.
    pub fn seed(&mut self, initial: TensorMap) -> Result<(), RuntimeError> {
        for (tag, tensor) in initial {
            if !self.is_feed(&tag) {
                return Err(RuntimeError::Config(format!(
                    "initial state given for '{tag}', which is not a recurrent feed tag"
                )));
            }
            self.pending.insert(tag, tensor);
        }
        Ok(())
    }

    pub fn bindings(&self) -> &[RecurrentBinding] {
        &self.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Returns `true` if `tag` is a feed tag of some binding.
    pub fn is_feed(&self, tag: &Tag) -> bool {
        self.bindings.iter().any(|b| &b.feed == tag)
    }

    /// Fetch tags in binding order.
    pub fn fetch_tags(&self) -> impl Iterator<Item = &Tag> {
        self.bindings.iter().map(|b| &b.fetch)
    }

    /// Replaces the stored feed value with an explicit one for the next batch.
    pub fn override_feed(&mut self, tag: Tag, tensor: Tensor) {
        self.fresh.insert(tag.clone());
        self.pending.insert(tag, tensor);
    }

    /// Number of pending feed values that came from the stream rather than
    /// from the previous invocation.
    pub fn overridden(&self) -> usize {
        self.fresh.len()
    }

    /// Pending value for `tag`, if any.
    pub fn pending(&self, tag: &Tag) -> Option<&Tensor> {
        self.pending.get(tag)
    }

    /// Moves all pending feed values out for the next payload.
    ///
    /// Feeds without a value are simply absent from the result.
    pub fn take_feed_inputs(&mut self) -> TensorMap {
        self.fresh.clear();
        std::mem::take(&mut self.pending)
    }

    /// Stores each fetch output as the feed value for the next invocation.
    pub fn absorb(&mut self, outputs: &TensorMap) {
        for binding in &self.bindings {
            if let Some(value) = outputs.get(&binding.fetch) {
                self.pending.insert(binding.feed.clone(), value.clone());
            }
        }
    }
}
