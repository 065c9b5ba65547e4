// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`InferenceBackend`] trait: the boundary to the opaque engine.

use crate::{Tag, TensorMap};
use std::sync::Arc;

/// Failure reported by an inference backend.
#[derive(Debug, thiserror::Error)]
#[error("{backend}: {detail}")]
pub struct BackendError {
    /// Name of the backend that failed.
    pub backend: String,
    /// What went wrong.
    pub detail: String,
}

impl BackendError {
    /// Creates a backend error.
    pub fn new(backend: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            detail: detail.into(),
        }
    }
}

/// An engine that executes a model given bound input tensors.
///
/// The batcher calls [`run`](InferenceBackend::run) at most once per batch,
/// synchronously, with the throttle held. Implementations own any model
/// state between calls. The returned map must contain a tensor for every
/// tag in `requested_outputs`; extra entries are ignored.
///
/// Backends are `Send + Sync` so one loaded model can be shared by several
/// engine instances through an `Arc`.
pub trait InferenceBackend: Send + Sync {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    /// Runs the model on `inputs`, producing `requested_outputs`.
    fn run(&self, inputs: &TensorMap, requested_outputs: &[Tag]) -> Result<TensorMap, BackendError>;
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, inputs: &TensorMap, requested_outputs: &[Tag]) -> Result<TensorMap, BackendError> {
        (**self).run(inputs, requested_outputs)
    }
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, inputs: &TensorMap, requested_outputs: &[Tag]) -> Result<TensorMap, BackendError> {
        (**self).run(inputs, requested_outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let e = BackendError::new("tflite", "tensor arena exhausted");
        assert_eq!(e.to_string(), "tflite: tensor arena exhausted");
    }
}
