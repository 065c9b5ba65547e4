// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Leading-dimension operations used to build and unbuild batches.
//!
//! Both operations are dtype-agnostic: they move whole element rows as
//! bytes and never interpret values.

mod concat_op;
mod split_op;

pub use concat_op::concat_leading;
pub use split_op::split_leading;
