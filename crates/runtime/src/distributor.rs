// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Splits engine outputs back onto the timestamps that produced them.

use crate::batch_dim::BatchDim;
use crate::{BackendError, OutputPacket, RuntimeConfig, RuntimeError, Tag, TensorMap, Timestamp};
use tensor_core::{split_leading, Tensor};

/// Turns one engine result into per-timestamp [`OutputPacket`]s.
///
/// Packets are ordered by configured output tag, then by timestamp.
/// Padding slices beyond the batch's real timestamps are dropped.
#[derive(Debug, Clone)]
pub struct OutputDistributor {
    batch_size: usize,
    outputs: Vec<Tag>,
    batch_dim: BatchDim,
}

impl OutputDistributor {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            outputs: config.outputs.clone(),
            batch_dim: BatchDim::new(config.add_batch_dim),
        }
    }

    /// Builds every packet for `timestamps` before returning any, so a
    /// shape failure on one tag leaves nothing half-emitted.
    ///
    /// `outputs` must hold every configured output tag.
    pub fn distribute(
        &self,
        timestamps: &[Timestamp],
        outputs: &TensorMap,
    ) -> Result<Vec<OutputPacket>, RuntimeError> {
        let mut packets = Vec::with_capacity(self.outputs.len() * timestamps.len());
        for tag in &self.outputs {
            let tensor = outputs.get(tag).ok_or_else(|| {
                BackendError::new("distributor", format!("output '{tag}' was not produced"))
            })?;
            for (slice, &timestamp) in unstack(tag, tensor, self.batch_size, timestamps.len())?
                .into_iter()
                .zip(timestamps)
            {
                packets.push(OutputPacket {
                    tag: tag.clone(),
                    timestamp,
                    tensor: self.batch_dim.detach(tag, slice)?,
                });
            }
        }
        Ok(packets)
    }
}

/// Splits `tensor` into `batch_size` slices and keeps the first `keep`.
pub(crate) fn unstack(
    tag: &Tag,
    tensor: &Tensor,
    batch_size: usize,
    keep: usize,
) -> Result<Vec<Tensor>, RuntimeError> {
    if batch_size == 1 {
        return Ok(vec![tensor.clone()]);
    }
    let mut slices = split_leading(tensor, batch_size).map_err(|e| RuntimeError::shape(tag, e))?;
    slices.truncate(keep);
    Ok(slices)
}
