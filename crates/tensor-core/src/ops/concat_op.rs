// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Concatenation along the leading dimension.

use crate::{Shape, Tensor, TensorError};

/// Concatenates `tensors` along dimension 0.
///
/// Every tensor must have rank ≥ 1, the same dtype, and identical trailing
/// dimensions. Leading dimensions may differ; the result's leading
/// dimension is their sum. A single input is returned as a cheap clone.
///
/// # Errors
/// Returns [`TensorError::Empty`] for an empty slice,
/// [`TensorError::DTypeMismatch`] or [`TensorError::ShapeMismatch`] when the
/// inputs are not uniform, and [`TensorError::LeadingDim`] for scalars.
///
/// # Examples
/// ```
/// use tensor_core::{concat_leading, Shape, Tensor};
/// let a = Tensor::from_f32(Shape::matrix(1, 2), &[1.0, 2.0]).unwrap();
/// let b = Tensor::from_f32(Shape::matrix(1, 2), &[3.0, 4.0]).unwrap();
/// let c = concat_leading(&[a, b]).unwrap();
/// assert_eq!(c.shape().dims(), &[2, 2]);
/// assert_eq!(c.to_f32_vec().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
/// ```
pub fn concat_leading(tensors: &[Tensor]) -> Result<Tensor, TensorError> {
    let first = tensors.first().ok_or(TensorError::Empty { op: "concat" })?;
    if first.shape().rank() == 0 {
        return Err(TensorError::LeadingDim {
            op: "concat",
            shape: first.shape().clone(),
            detail: "cannot concatenate scalars along dimension 0".into(),
        });
    }
    if tensors.len() == 1 {
        return Ok(first.clone());
    }

    let trailing = first.shape().trailing_dims();
    let mut leading = 0usize;
    for t in tensors {
        if t.dtype() != first.dtype() {
            return Err(TensorError::DTypeMismatch {
                op: "concat",
                lhs: first.dtype(),
                rhs: t.dtype(),
            });
        }
        if t.shape().rank() == 0 || t.shape().trailing_dims() != trailing {
            return Err(TensorError::ShapeMismatch {
                op: "concat",
                lhs: first.shape().clone(),
                rhs: t.shape().clone(),
            });
        }
        leading += t.shape().leading_dim().unwrap_or(0);
    }

    let total: usize = tensors.iter().map(Tensor::size_bytes).sum();
    let mut data = Vec::with_capacity(total);
    for t in tensors {
        data.extend_from_slice(t.as_bytes());
    }

    let shape = first
        .shape()
        .with_leading_replaced(leading)
        .unwrap_or_else(|| Shape::vector(leading));
    Tensor::from_bytes(shape, first.dtype(), data)
}
