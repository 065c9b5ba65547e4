// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine payload construction.
//!
//! With `batch_size == 1` every column holds exactly one tensor and it is
//! passed through untouched. Otherwise each column is padded to
//! `batch_size` by repeating its first tensor and concatenated along the
//! leading dimension, so the engine always sees a fixed batch shape.

use crate::{RecurrentBinding, RuntimeConfig, RuntimeError, Tag, TensorMap};
use tensor_core::{concat_leading, Tensor, TensorError};

/// Builds engine inputs and the requested-output list for one batch.
#[derive(Debug, Clone)]
pub struct BatchAssembler {
    batch_size: usize,
    requested: Vec<Tag>,
}

impl BatchAssembler {
    pub fn new(config: &RuntimeConfig, bindings: &[RecurrentBinding]) -> Self {
        let mut requested = config.outputs.clone();
        for binding in bindings {
            if !requested.contains(&binding.fetch) {
                requested.push(binding.fetch.clone());
            }
        }
        Self {
            batch_size: config.batch_size,
            requested,
        }
    }

    /// Configured outputs in order, followed by fetch tags not already
    /// among them.
    pub fn requested_outputs(&self) -> &[Tag] {
        &self.requested
    }

    /// Moves the batch's columns and `feeds` into one engine payload.
    ///
    /// Columns with no tensors are omitted.
    pub fn assemble(
        &self,
        columns: Vec<(Tag, Vec<Tensor>)>,
        feeds: TensorMap,
    ) -> Result<TensorMap, RuntimeError> {
        let mut payload = feeds;
        for (tag, tensors) in columns {
            let stacked = if self.batch_size == 1 {
                tensors.into_iter().next()
            } else {
                stack(&tag, tensors, self.batch_size)?
            };
            if let Some(tensor) = stacked {
                payload.insert(tag, tensor);
            }
        }
        Ok(payload)
    }
}

/// Pads `tensors` to `batch_size` with copies of the first one and
/// concatenates them along dimension 0.
pub(crate) fn stack(
    tag: &Tag,
    mut tensors: Vec<Tensor>,
    batch_size: usize,
) -> Result<Option<Tensor>, RuntimeError> {
    let Some(first) = tensors.first().cloned() else {
        return Ok(None);
    };
    // Split later cuts the batch into equal parts, so every item must match
    // the first one exactly, leading dimension included.
    for other in &tensors[1..] {
        if other.dtype() != first.dtype() {
            let err = TensorError::DTypeMismatch {
                op: "stack",
                lhs: first.dtype(),
                rhs: other.dtype(),
            };
            return Err(RuntimeError::shape(tag, err));
        }
        if other.shape() != first.shape() {
            let err = TensorError::ShapeMismatch {
                op: "stack",
                lhs: first.shape().clone(),
                rhs: other.shape().clone(),
            };
            return Err(RuntimeError::shape(tag, err));
        }
    }
    if tensors.len() < batch_size {
        tensors.resize(batch_size, first);
    }
    concat_leading(&tensors)
        .map(Some)
        .map_err(|e| RuntimeError::shape(tag, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tensor_core::{DType, Shape};

    fn config(batch_size: usize) -> RuntimeConfig {
        RuntimeConfig {
            batch_size,
            inputs: vec![Tag::from("A"), Tag::from("B")],
            outputs: vec![Tag::from("OUT")],
            ..Default::default()
        }
    }

    fn row(v: f32) -> Tensor {
        Tensor::full_f32(Shape::matrix(1, 2), v)
    }

    #[test]
    fn test_requested_outputs_append_fetch_tags() {
        let bindings = vec![
            RecurrentBinding::parse("S_IN:S_OUT").unwrap(),
            RecurrentBinding::parse("H_IN:OUT").unwrap(),
        ];
        let a = BatchAssembler::new(&config(1), &bindings);
        assert_eq!(
            a.requested_outputs(),
            &[Tag::from("OUT"), Tag::from("S_OUT")]
        );
    }

    #[test]
    fn test_unit_batch_passes_through() {
        let a = BatchAssembler::new(&config(1), &[]);
        let x = row(1.0);
        let payload = a
            .assemble(vec![(Tag::from("A"), vec![x.clone()])], TensorMap::new())
            .unwrap();
        assert!(payload["A"].shares_buffer(&x));
    }

    #[test]
    fn test_concat_full_batch() {
        let a = BatchAssembler::new(&config(2), &[]);
        let payload = a
            .assemble(
                vec![
                    (Tag::from("A"), vec![row(0.0), row(1.0)]),
                    (Tag::from("B"), vec![row(2.0), row(3.0)]),
                ],
                TensorMap::new(),
            )
            .unwrap();
        assert_eq!(payload["A"].shape().dims(), &[2, 2]);
        assert_eq!(payload["B"].to_f32_vec().unwrap(), vec![2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_partial_batch_padded_with_first() {
        let a = BatchAssembler::new(&config(4), &[]);
        let payload = a
            .assemble(
                vec![(Tag::from("A"), vec![row(5.0), row(6.0)])],
                TensorMap::new(),
            )
            .unwrap();
        assert_eq!(payload["A"].shape().dims(), &[4, 2]);
        assert_eq!(
            payload["A"].to_f32_vec().unwrap(),
            vec![5.0, 5.0, 6.0, 6.0, 5.0, 5.0, 5.0, 5.0]
        );
    }

    #[test]
    fn test_feeds_included_and_empty_columns_omitted() {
        let a = BatchAssembler::new(&config(1), &[]);
        let feeds = TensorMap::from([(Tag::from("S_IN"), row(9.0))]);
        let payload = a
            .assemble(vec![(Tag::from("A"), vec![])], feeds)
            .unwrap();
        assert_eq!(payload.len(), 1);
        assert!(payload.contains_key("S_IN"));
    }

    #[test]
    fn test_inconsistent_shapes() {
        let a = BatchAssembler::new(&config(2), &[]);
        let other = Tensor::zeros(Shape::matrix(1, 3), DType::F32);
        let err = a
            .assemble(vec![(Tag::from("A"), vec![row(0.0), other])], TensorMap::new())
            .unwrap_err();
        match err {
            RuntimeError::Shape { tag, .. } => assert_eq!(tag, Tag::from("A")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_mismatched_leading_dims_rejected() {
        let a = BatchAssembler::new(&config(2), &[]);
        let tall = Tensor::from_f32(Shape::matrix(3, 1), &[1.0, 2.0, 3.0]).unwrap();
        let short = Tensor::from_f32(Shape::matrix(1, 1), &[9.0]).unwrap();
        let err = a
            .assemble(vec![(Tag::from("A"), vec![tall, short])], TensorMap::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Shape {
                source: TensorError::ShapeMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_inconsistent_dtypes() {
        let a = BatchAssembler::new(&config(2), &[]);
        let other = Tensor::zeros(Shape::matrix(1, 2), DType::I32);
        assert!(a
            .assemble(vec![(Tag::from("A"), vec![row(0.0), other])], TensorMap::new())
            .is_err());
    }

    proptest! {
        #[test]
        fn prop_padding_keeps_prefix(xs in prop::collection::vec(-10.0f32..10.0, 1..=4), extra in 0usize..4) {
            let tag = Tag::from("A");
            let rows: Vec<Tensor> = xs.iter().map(|v| row(*v)).collect();
            let batch_size = rows.len() + extra;
            let stacked = stack(&tag, rows.clone(), batch_size).unwrap().unwrap();
            prop_assert_eq!(stacked.shape().dims(), &[batch_size, 2][..]);

            let values = stacked.to_f32_vec().unwrap();
            for (i, v) in xs.iter().enumerate() {
                prop_assert_eq!(values[2 * i], *v);
            }
            for i in xs.len()..batch_size {
                prop_assert_eq!(values[2 * i], xs[0]);
            }
        }
    }
}
