// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type.

use crate::{DType, Shape, TensorError};
use std::sync::Arc;

/// An immutable, n-dimensional tensor stored in contiguous memory.
///
/// `Tensor` is the value carried on every stream of the batcher. The byte
/// buffer is reference-counted, so cloning a tensor or changing only its
/// shape (see [`reshape`](Tensor::reshape)) never copies element data.
/// Only concatenation and splitting allocate.
///
/// # Memory Layout
/// Data is stored in row-major (C) order as a flat byte buffer in native
/// endianness. Typed access is provided via [`to_f32_vec`](Tensor::to_f32_vec).
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    dtype: DType,
    data: Arc<[u8]>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape, DType};
    /// let t = Tensor::zeros(Shape::matrix(2, 3), DType::F32);
    /// assert_eq!(t.size_bytes(), 24); // 2 * 3 * 4 bytes
    /// ```
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let size = shape.size_bytes(dtype);
        Self {
            shape,
            dtype,
            data: vec![0u8; size].into(),
        }
    }

    /// Creates a tensor from raw bytes.
    ///
    /// Returns an error if the buffer size does not match `shape.size_bytes(dtype)`.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self, TensorError> {
        let expected = shape.size_bytes(dtype);
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            shape,
            dtype,
            data: data.into(),
        })
    }

    /// Creates a tensor from a slice of `f32` values.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_f32(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.to_f32_vec().unwrap(), vec![1.0, 2.0, 3.0]);
    /// ```
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        let expected_elements = shape.num_elements();
        if values.len() != expected_elements {
            return Err(TensorError::BufferSizeMismatch {
                expected: expected_elements * DType::F32.size_bytes(),
                actual: values.len() * DType::F32.size_bytes(),
            });
        }
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        Ok(Self {
            shape,
            dtype: DType::F32,
            data: data.into(),
        })
    }

    /// Creates an `F32` tensor of the given shape with every element set to `value`.
    pub fn full_f32(shape: Shape, value: f32) -> Self {
        let n = shape.num_elements();
        let data: Vec<u8> = std::iter::repeat(value.to_ne_bytes())
            .take(n)
            .flatten()
            .collect();
        Self {
            shape,
            dtype: DType::F32,
            data: data.into(),
        }
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Returns the raw byte slice backing this tensor.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the memory footprint of this tensor in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if both tensors share the same underlying buffer.
    pub fn shares_buffer(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Copies the buffer out as `f32` values.
    ///
    /// Returns [`TensorError::UnsupportedDType`] for non-`F32` tensors.
    pub fn to_f32_vec(&self) -> Result<Vec<f32>, TensorError> {
        if self.dtype != DType::F32 {
            return Err(TensorError::UnsupportedDType {
                op: "to_f32_vec",
                dtype: self.dtype,
            });
        }
        Ok(self
            .data
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Returns a tensor with a new shape over the same buffer.
    ///
    /// The element count must be unchanged.
    pub fn reshape(&self, shape: Shape) -> Result<Tensor, TensorError> {
        if shape.num_elements() != self.shape.num_elements() {
            return Err(TensorError::ShapeMismatch {
                op: "reshape",
                lhs: self.shape.clone(),
                rhs: shape,
            });
        }
        Ok(Tensor {
            shape,
            dtype: self.dtype,
            data: Arc::clone(&self.data),
        })
    }

    /// Inserts a leading dimension of size 1 without copying.
    ///
    /// This is the inverse of [`without_batch_dim`](Tensor::without_batch_dim).
    pub fn with_batch_dim(&self) -> Tensor {
        Tensor {
            shape: self.shape.with_leading(1),
            dtype: self.dtype,
            data: Arc::clone(&self.data),
        }
    }

    /// Removes a leading dimension of size 1 without copying.
    ///
    /// # Errors
    /// Returns [`TensorError::LeadingDim`] if the tensor is a scalar or its
    /// leading dimension is not 1.
    pub fn without_batch_dim(&self) -> Result<Tensor, TensorError> {
        match self.shape.leading_dim() {
            Some(1) => {}
            Some(n) => {
                return Err(TensorError::LeadingDim {
                    op: "without_batch_dim",
                    shape: self.shape.clone(),
                    detail: format!("expected a leading dimension of 1, found {n}"),
                })
            }
            None => {
                return Err(TensorError::LeadingDim {
                    op: "without_batch_dim",
                    shape: self.shape.clone(),
                    detail: "scalar has no leading dimension".into(),
                })
            }
        }
        let shape = self
            .shape
            .without_leading()
            .unwrap_or_else(Shape::scalar);
        Ok(Tensor {
            shape,
            dtype: self.dtype,
            data: Arc::clone(&self.data),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let t = Tensor::zeros(Shape::matrix(2, 3), DType::F32);
        assert_eq!(t.size_bytes(), 24);
        assert_eq!(t.shape(), &Shape::matrix(2, 3));
        assert_eq!(t.dtype(), DType::F32);
        assert!(t.to_f32_vec().unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_from_f32() {
        let data = vec![1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let t = Tensor::from_f32(Shape::matrix(2, 3), &data).unwrap();
        assert_eq!(t.to_f32_vec().unwrap(), data);
    }

    #[test]
    fn test_from_f32_wrong_len() {
        let result = Tensor::from_f32(Shape::vector(4), &[1.0, 2.0]);
        assert!(matches!(result, Err(TensorError::BufferSizeMismatch { .. })));
    }

    #[test]
    fn test_from_bytes_size_mismatch() {
        let result = Tensor::from_bytes(Shape::matrix(2, 3), DType::F32, vec![0u8; 10]);
        assert!(result.is_err());
    }

    #[test]
    fn test_full_f32() {
        let t = Tensor::full_f32(Shape::vector(5), 3.5);
        assert_eq!(t.to_f32_vec().unwrap(), vec![3.5; 5]);
    }

    #[test]
    fn test_to_f32_wrong_dtype() {
        let t = Tensor::zeros(Shape::vector(2), DType::I64);
        assert!(matches!(
            t.to_f32_vec(),
            Err(TensorError::UnsupportedDType { .. })
        ));
    }

    #[test]
    fn test_clone_shares_buffer() {
        let t = Tensor::full_f32(Shape::vector(3), 1.0);
        let c = t.clone();
        assert!(t.shares_buffer(&c));
    }

    #[test]
    fn test_batch_dim_round_trip_is_zero_copy() {
        let t = Tensor::from_f32(Shape::matrix(2, 2), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let batched = t.with_batch_dim();
        assert_eq!(batched.shape().dims(), &[1, 2, 2]);
        assert!(batched.shares_buffer(&t));

        let back = batched.without_batch_dim().unwrap();
        assert_eq!(back, t);
        assert!(back.shares_buffer(&t));
    }

    #[test]
    fn test_without_batch_dim_rejects_non_unit() {
        let t = Tensor::zeros(Shape::matrix(3, 2), DType::F32);
        assert!(matches!(
            t.without_batch_dim(),
            Err(TensorError::LeadingDim { .. })
        ));
        let s = Tensor::zeros(Shape::scalar(), DType::F32);
        assert!(s.without_batch_dim().is_err());
    }

    #[test]
    fn test_scalar_batch_dim() {
        let s = Tensor::full_f32(Shape::scalar(), 7.0);
        let b = s.with_batch_dim();
        assert_eq!(b.shape(), &Shape::vector(1));
        assert_eq!(b.without_batch_dim().unwrap().shape(), &Shape::scalar());
    }

    #[test]
    fn test_reshape() {
        let t = Tensor::from_f32(Shape::vector(6), &[0.0; 6]).unwrap();
        let r = t.reshape(Shape::matrix(2, 3)).unwrap();
        assert!(r.shares_buffer(&t));
        assert!(t.reshape(Shape::matrix(4, 2)).is_err());
    }
}
