// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the batching runtime.

use crate::{BackendError, Tag, Timestamp};

/// Errors that can occur while configuring or driving a stream engine.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Invalid configuration, unknown tag, or malformed recurrent binding.
    /// Fatal at setup; an engine refuses to start.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required (non-recurrent) input was absent at a timestamp under
    /// the fail-fast policy.
    #[error("tag '{tag}' not present at timestamp {timestamp}")]
    MissingInput { tag: Tag, timestamp: Timestamp },

    /// Tensors of one tag could not be padded, concatenated, split, or
    /// have their batch dimension added or removed.
    #[error("shape error on tag '{tag}': {source}")]
    Shape {
        tag: Tag,
        #[source]
        source: tensor_core::TensorError,
    },

    /// The inference backend failed. The in-progress batch is discarded.
    #[error("engine execution failed: {0}")]
    EngineExecution(#[from] BackendError),

    /// An item arrived behind the stream position or duplicated a tag at
    /// the same timestamp.
    #[error("out-of-order input on tag '{tag}': timestamp {timestamp} {detail}")]
    Ordering {
        tag: Tag,
        timestamp: Timestamp,
        detail: String,
    },

    /// The throttle rejected the acquisition.
    #[error("throttle error: {0}")]
    Throttle(#[from] run_throttle::ThrottleError),
}

impl RuntimeError {
    pub(crate) fn shape(tag: &Tag, source: tensor_core::TensorError) -> Self {
        RuntimeError::Shape {
            tag: tag.clone(),
            source,
        }
    }
}
