// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A stand-in backend for driving the batcher without a real model.

use runtime::{BackendError, InferenceBackend, Tag, TensorMap};
use std::time::Duration;
use tensor_core::Tensor;

/// Sums every f32 input elementwise and returns the sum on each requested
/// output. All inputs must share one shape, which holds when data tensors
/// and recurrent state are shaped alike.
#[derive(Debug)]
pub struct SyntheticBackend {
    delay: Duration,
}

impl SyntheticBackend {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl InferenceBackend for SyntheticBackend {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn run(&self, inputs: &TensorMap, requested_outputs: &[Tag]) -> Result<TensorMap, BackendError> {
        let fail = |detail: String| BackendError::new(self.name(), detail);
        let (_, first) = inputs
            .iter()
            .next()
            .ok_or_else(|| fail("no inputs bound".into()))?;

        let mut sum = vec![0.0f32; first.shape().num_elements()];
        for (tag, tensor) in inputs {
            if tensor.shape() != first.shape() {
                return Err(fail(format!(
                    "input '{tag}' has shape {}, expected {}",
                    tensor.shape(),
                    first.shape()
                )));
            }
            let values = tensor.to_f32_vec().map_err(|e| fail(e.to_string()))?;
            for (acc, v) in sum.iter_mut().zip(values) {
                *acc += v;
            }
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        let out = Tensor::from_f32(first.shape().clone(), &sum).map_err(|e| fail(e.to_string()))?;
        Ok(requested_outputs
            .iter()
            .map(|tag| (tag.clone(), out.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::Shape;

    #[test]
    fn test_sums_inputs() {
        let backend = SyntheticBackend::new(Duration::ZERO);
        let inputs = TensorMap::from([
            (Tag::from("A"), Tensor::full_f32(Shape::vector(2), 1.0)),
            (Tag::from("B"), Tensor::full_f32(Shape::vector(2), 2.0)),
        ]);
        let out = backend.run(&inputs, &[Tag::from("OUT")]).unwrap();
        assert_eq!(out["OUT"].to_f32_vec().unwrap(), vec![3.0, 3.0]);
    }

    #[test]
    fn test_rejects_mixed_shapes() {
        let backend = SyntheticBackend::new(Duration::ZERO);
        let inputs = TensorMap::from([
            (Tag::from("A"), Tensor::full_f32(Shape::vector(2), 1.0)),
            (Tag::from("B"), Tensor::full_f32(Shape::vector(3), 2.0)),
        ]);
        assert!(backend.run(&inputs, &[Tag::from("OUT")]).is_err());
    }
}
