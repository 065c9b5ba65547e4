// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! A streaming batcher between a timestamped sequence of tagged tensors and
//! an opaque inference backend.
//!
//! The runtime takes:
//! - A [`RuntimeConfig`] describing ports, batch size and recurrence.
//! - A [`ModelSignature`] listing the tags the model binds.
//! - An [`InferenceBackend`], a [`RunThrottle`](run_throttle::RunThrottle)
//!   shared with other instances, and a [`CounterSink`].
//!
//! Items are staged per timestamp until `batch_size` timestamps are
//! committed. The batch is then padded and concatenated, the backend runs
//! once while holding a throttle permit, and outputs are split back onto
//! the original timestamps. Recurrent fetch outputs are fed back as inputs
//! of the next run.
//!
//! # Type-State Pipeline
//! ```text
//! StreamEngine<Configured> → StreamEngine<Running> → StreamReport
//! ```
//! Transitions are compile-time checked.

mod accumulator;
mod assembler;
mod backend;
mod batch_dim;
mod config;
mod distributor;
mod engine;
mod error;
mod metrics;
mod recurrent;
mod signature;
mod types;

pub use accumulator::{BatchAccumulator, PendingBatch};
pub use assembler::BatchAssembler;
pub use backend::{BackendError, InferenceBackend};
pub use config::{MissingInputPolicy, RuntimeConfig};
pub use distributor::OutputDistributor;
pub use engine::{Configured, EngineState, Running, StreamEngine, StreamReport};
pub use error::RuntimeError;
pub use metrics::{CounterNames, CounterSink, EngineCounters, InMemoryCounterSink, TracingCounterSink};
pub use recurrent::{RecurrentBinding, RecurrentState};
pub use signature::ModelSignature;
pub use types::{OutputPacket, Tag, TensorMap, Timestamp};
