// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Splitting along the leading dimension.

use crate::{Tensor, TensorError};

/// Splits `tensor` into `parts` equal slices along dimension 0.
///
/// The leading dimension must be divisible by `parts`; each slice keeps
/// the input's rank with leading dimension `dim0 / parts`. This is the
/// inverse of [`concat_leading`](crate::concat_leading) over equally
/// sized inputs.
///
/// # Errors
/// Returns [`TensorError::LeadingDim`] if the tensor is a scalar, `parts`
/// is zero, or the leading dimension is not divisible by `parts`.
pub fn split_leading(tensor: &Tensor, parts: usize) -> Result<Vec<Tensor>, TensorError> {
    let leading = tensor.shape().leading_dim().ok_or_else(|| TensorError::LeadingDim {
        op: "split",
        shape: tensor.shape().clone(),
        detail: "cannot split a scalar".into(),
    })?;
    if parts == 0 || leading % parts != 0 {
        return Err(TensorError::LeadingDim {
            op: "split",
            shape: tensor.shape().clone(),
            detail: format!("leading dimension {leading} is not divisible into {parts} parts"),
        });
    }
    if parts == 1 {
        return Ok(vec![tensor.clone()]);
    }

    let slice_leading = leading / parts;
    let slice_shape = tensor
        .shape()
        .with_leading_replaced(slice_leading)
        .ok_or_else(|| TensorError::LeadingDim {
            op: "split",
            shape: tensor.shape().clone(),
            detail: "cannot split a scalar".into(),
        })?;
    let slice_bytes = slice_shape.size_bytes(tensor.dtype());

    let bytes = tensor.as_bytes();
    (0..parts)
        .map(|i| {
            let start = i * slice_bytes;
            Tensor::from_bytes(
                slice_shape.clone(),
                tensor.dtype(),
                bytes[start..start + slice_bytes].to_vec(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{concat_leading, DType, Shape};

    #[test]
    fn test_split_unit_slices() {
        let t = Tensor::from_f32(Shape::matrix(3, 2), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let parts = split_leading(&t, 3).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].shape().dims(), &[1, 2]);
        assert_eq!(parts[1].to_f32_vec().unwrap(), vec![3.0, 4.0]);
        assert_eq!(parts[2].to_f32_vec().unwrap(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_split_wider_slices() {
        let t = Tensor::zeros(Shape::new(vec![4, 3]), DType::I64);
        let parts = split_leading(&t, 2).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].shape().dims(), &[2, 3]);
        assert_eq!(parts[0].size_bytes(), 2 * 3 * 8);
    }

    #[test]
    fn test_split_single_part_shares() {
        let t = Tensor::full_f32(Shape::matrix(1, 4), 2.0);
        let parts = split_leading(&t, 1).unwrap();
        assert!(parts[0].shares_buffer(&t));
    }

    #[test]
    fn test_split_not_divisible() {
        let t = Tensor::zeros(Shape::matrix(3, 2), DType::F32);
        assert!(matches!(
            split_leading(&t, 2),
            Err(TensorError::LeadingDim { .. })
        ));
        assert!(split_leading(&t, 0).is_err());
    }

    #[test]
    fn test_split_scalar() {
        let t = Tensor::zeros(Shape::scalar(), DType::F32);
        assert!(split_leading(&t, 1).is_err());
    }

    #[test]
    fn test_split_inverts_concat() {
        let a = Tensor::from_f32(Shape::matrix(1, 3), &[1.0, 2.0, 3.0]).unwrap();
        let b = Tensor::from_f32(Shape::matrix(1, 3), &[4.0, 5.0, 6.0]).unwrap();
        let joined = concat_leading(&[a.clone(), b.clone()]).unwrap();
        let parts = split_leading(&joined, 2).unwrap();
        assert_eq!(parts, vec![a, b]);
    }
}
