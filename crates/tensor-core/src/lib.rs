// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Immutable tensor values and the leading-dimension operations a
//! streaming batcher needs.
//!
//! This crate provides:
//! - [`Tensor`]: an n-dimensional tensor over a reference-counted byte buffer.
//! - [`Shape`]: shape descriptors with leading/trailing dimension helpers.
//! - [`DType`]: supported element data types.
//! - [`concat_leading`] / [`split_leading`]: batch assembly and disassembly.
//! - [`Tensor::with_batch_dim`] / [`Tensor::without_batch_dim`]: the
//!   zero-copy synthetic batch dimension.
//!
//! # Design Goals
//! - Cloning and reshaping are O(1) and never copy element data.
//! - Only concatenation and splitting allocate.
//! - Clean error types via `thiserror`.

mod dtype;
mod error;
mod ops;
mod shape;
mod tensor;

pub use dtype::DType;
pub use error::TensorError;
pub use ops::{concat_leading, split_leading};
pub use shape::Shape;
pub use tensor::Tensor;
