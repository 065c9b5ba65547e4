// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Synthetic batch dimension, applied on the way in and removed on the way
//! out. Both the unit-batch and concatenating paths go through this type.

use crate::{RuntimeError, Tag};
use tensor_core::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BatchDim {
    enabled: bool,
}

impl BatchDim {
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Prepends a leading dimension of 1 when enabled.
    pub(crate) fn attach(self, tensor: Tensor) -> Tensor {
        if self.enabled {
            tensor.with_batch_dim()
        } else {
            tensor
        }
    }

    /// Removes the leading dimension of 1 when enabled.
    pub(crate) fn detach(self, tag: &Tag, tensor: Tensor) -> Result<Tensor, RuntimeError> {
        if self.enabled {
            tensor
                .without_batch_dim()
                .map_err(|e| RuntimeError::shape(tag, e))
        } else {
            Ok(tensor)
        }
    }
}
