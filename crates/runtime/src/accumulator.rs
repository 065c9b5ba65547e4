// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-timestamp staging and batch buffers.
//!
//! Items arrive one `(tag, timestamp, value)` at a time. The accumulator
//! stages them in a *row* for the current timestamp. A row commits once
//! every configured input port has reported; ports that never report before
//! a later timestamp arrives, or before [`BatchAccumulator::finish`], count
//! as absent. Absent data ports are handled by the [`MissingInputPolicy`]:
//! a timestamp contributes all of its data tensors or nothing.
//!
//! Committed rows are appended to one column per data port plus a shared
//! timestamp list, so the buffers always stay in lock-step.

use crate::batch_dim::BatchDim;
use crate::{MissingInputPolicy, RecurrentBinding, RuntimeConfig, RuntimeError, Tag, TensorMap, Timestamp};
use std::collections::BTreeSet;
use tensor_core::Tensor;

/// A batch removed from the accumulator, ready for assembly.
#[derive(Debug, Clone, Default)]
pub struct PendingBatch {
    /// Committed timestamps, oldest first.
    pub timestamps: Vec<Timestamp>,
    /// One tensor list per data port, in configured input order. Every list
    /// has `timestamps.len()` entries.
    pub columns: Vec<(Tag, Vec<Tensor>)>,
    /// Explicit recurrent feed values delivered with these timestamps.
    pub feed_overrides: TensorMap,
}

impl PendingBatch {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[derive(Debug)]
struct StagedRow {
    timestamp: Timestamp,
    reported: BTreeSet<Tag>,
    values: Vec<Option<Tensor>>,
    overrides: TensorMap,
    voided: bool,
}

/// Buffers incoming items until `batch_size` timestamps are committed.
#[derive(Debug)]
pub struct BatchAccumulator {
    ports: Vec<Tag>,
    data_ports: Vec<Tag>,
    feeds: BTreeSet<Tag>,
    batch_size: usize,
    policy: MissingInputPolicy,
    batch_dim: BatchDim,
    columns: Vec<Vec<Tensor>>,
    timestamps: Vec<Timestamp>,
    overrides: TensorMap,
    row: Option<StagedRow>,
    last_closed: Option<Timestamp>,
}

impl BatchAccumulator {
    /// Creates an accumulator for `config`'s input ports.
    ///
    /// Feed tags of `bindings` are accepted even when they are not listed
    /// as input ports; they never occupy a column.
    pub fn new(config: &RuntimeConfig, bindings: &[RecurrentBinding]) -> Self {
        let feeds: BTreeSet<Tag> = bindings.iter().map(|b| b.feed.clone()).collect();
        let data_ports: Vec<Tag> = config
            .inputs
            .iter()
            .filter(|t| !feeds.contains(*t))
            .cloned()
            .collect();
        Self {
            ports: config.inputs.clone(),
            columns: vec![Vec::with_capacity(config.batch_size); data_ports.len()],
            data_ports,
            feeds,
            batch_size: config.batch_size,
            policy: config.missing_input,
            batch_dim: BatchDim::new(config.add_batch_dim),
            timestamps: Vec::with_capacity(config.batch_size),
            overrides: TensorMap::new(),
            row: None,
            last_closed: None,
        }
    }

    /// Data ports in configured order.
    pub fn data_ports(&self) -> &[Tag] {
        &self.data_ports
    }

    /// Number of committed timestamps waiting in the buffers.
    pub fn committed(&self) -> usize {
        self.timestamps.len()
    }

    /// Accepts one item.
    ///
    /// If `timestamp` is newer than the staged row, that row is closed
    /// first; a [`RuntimeError::MissingInput`] returned in that case refers
    /// to the older row, and the new item has still been staged.
    pub fn add(
        &mut self,
        tag: &Tag,
        timestamp: Timestamp,
        value: Option<Tensor>,
    ) -> Result<(), RuntimeError> {
        let is_feed = self.feeds.contains(tag);
        let data_index = self.data_ports.iter().position(|p| p == tag);
        if !is_feed && data_index.is_none() {
            return Err(RuntimeError::Config(format!(
                "tag '{tag}' is neither an input port nor a recurrent feed"
            )));
        }
        if let Some(last) = self.last_closed {
            if timestamp <= last {
                return Err(RuntimeError::Ordering {
                    tag: tag.clone(),
                    timestamp,
                    detail: format!("is not after already closed timestamp {last}"),
                });
            }
        }

        let staged = self
            .row
            .as_ref()
            .map(|row| (row.timestamp, row.reported.contains(tag)));
        let mut closed = Ok(());
        match staged {
            Some((current, _)) if timestamp < current => {
                return Err(RuntimeError::Ordering {
                    tag: tag.clone(),
                    timestamp,
                    detail: format!("precedes staged timestamp {current}"),
                });
            }
            Some((current, true)) if timestamp == current => {
                return Err(RuntimeError::Ordering {
                    tag: tag.clone(),
                    timestamp,
                    detail: "duplicates a value already staged".into(),
                });
            }
            Some((current, _)) if timestamp > current => closed = self.close_row(),
            _ => {}
        }

        let row = self.row.get_or_insert_with(|| StagedRow {
            timestamp,
            reported: BTreeSet::new(),
            values: vec![None; self.data_ports.len()],
            overrides: TensorMap::new(),
            voided: false,
        });
        row.reported.insert(tag.clone());
        tracing::trace!(%tag, %timestamp, present = value.is_some(), "staged input");

        match (value, data_index) {
            (Some(tensor), Some(index)) => row.values[index] = Some(self.batch_dim.attach(tensor)),
            (Some(tensor), None) => {
                row.overrides.insert(tag.clone(), self.batch_dim.attach(tensor));
            }
            (None, Some(_)) if !row.voided => {
                if self.policy == MissingInputPolicy::Fail {
                    // An earlier row failed to close: keep this one live so
                    // its own absence is reported when it closes.
                    closed?;
                    row.voided = true;
                    return Err(RuntimeError::MissingInput {
                        tag: tag.clone(),
                        timestamp,
                    });
                }
                row.voided = true;
                tracing::warn!(%tag, %timestamp, "input absent, skipping timestamp");
            }
            (None, _) => {}
        }

        let complete = self.ports.iter().all(|p| row.reported.contains(p));
        closed?;
        if complete {
            self.close_row()?;
        }
        Ok(())
    }

    /// Closes the staged row, treating ports that never reported as absent.
    pub fn finish(&mut self) -> Result<(), RuntimeError> {
        self.close_row()
    }

    /// Returns `true` once `batch_size` timestamps are committed.
    pub fn is_batch_ready(&self) -> bool {
        self.timestamps.len() >= self.batch_size
    }

    /// Removes up to `batch_size` committed timestamps and their tensors.
    pub fn pop_batch(&mut self) -> PendingBatch {
        let n = self.timestamps.len().min(self.batch_size);
        let timestamps: Vec<Timestamp> = self.timestamps.drain(..n).collect();
        let columns = self
            .data_ports
            .iter()
            .zip(self.columns.iter_mut())
            .map(|(tag, column)| (tag.clone(), column.drain(..n).collect()))
            .collect();
        PendingBatch {
            timestamps,
            columns,
            feed_overrides: std::mem::take(&mut self.overrides),
        }
    }

    fn close_row(&mut self) -> Result<(), RuntimeError> {
        let Some(row) = self.row.take() else {
            return Ok(());
        };
        self.last_closed = Some(row.timestamp);
        if row.voided {
            return Ok(());
        }

        let missing = self
            .data_ports
            .iter()
            .zip(&row.values)
            .find(|(_, v)| v.is_none())
            .map(|(tag, _)| tag.clone());
        if let Some(tag) = missing {
            return match self.policy {
                MissingInputPolicy::Fail => Err(RuntimeError::MissingInput {
                    tag,
                    timestamp: row.timestamp,
                }),
                MissingInputPolicy::Skip => {
                    tracing::warn!(%tag, timestamp = %row.timestamp, "input absent, skipping timestamp");
                    Ok(())
                }
            };
        }

        for (column, value) in self.columns.iter_mut().zip(row.values) {
            if let Some(tensor) = value {
                column.push(tensor);
            }
        }
        self.timestamps.push(row.timestamp);
        self.overrides.extend(row.overrides);
        Ok(())
    }
}
