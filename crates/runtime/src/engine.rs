// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The stream engine with a type-state lifecycle.
//!
//! ```text
//! StreamEngine<Configured>
//!     │  .start(backend, throttle, sink)
//!     ▼
//! StreamEngine<Running>
//!     │  .add() / .process()   (flushes whenever a batch is full)
//!     │  .close()              (flushes the final partial batch)
//!     ▼
//!   StreamReport
//! ```
//!
//! Each state transition consumes the old value and returns a new one, so
//! items cannot be added before a backend is attached or after close.

use crate::{
    BackendError, BatchAccumulator, BatchAssembler, CounterNames, CounterSink, EngineCounters,
    InferenceBackend, ModelSignature, OutputDistributor, OutputPacket, RecurrentState,
    RuntimeConfig, RuntimeError, Tag, TensorMap, Timestamp,
};
use run_throttle::RunThrottle;
use std::sync::Arc;
use std::time::Instant;
use tensor_core::Tensor;

// ── Type-state markers ─────────────────────────────────────────

/// Engine is validated but has no backend yet.
#[derive(Debug)]
pub struct Configured;

/// Engine is attached to a backend, throttle and counter sink.
pub struct Running {
    backend: Arc<dyn InferenceBackend>,
    throttle: RunThrottle,
    sink: Arc<dyn CounterSink>,
}

impl std::fmt::Debug for Running {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Running")
            .field("backend", &self.backend.name())
            .field("throttle", &self.throttle)
            .finish()
    }
}

/// Sealed trait for engine states.
pub trait EngineState: std::fmt::Debug {}
impl EngineState for Configured {}
impl EngineState for Running {}

// ── Close output ───────────────────────────────────────────────

/// What a closed stream leaves behind.
#[derive(Debug)]
pub struct StreamReport {
    /// Packets emitted by the final flush.
    pub packets: Vec<OutputPacket>,
    /// Totals over the engine's whole lifetime.
    pub counters: EngineCounters,
}

// ── Engine ─────────────────────────────────────────────────────

/// Batches a timestamped tensor stream into engine invocations.
///
/// # Example
/// ```
/// use runtime::{
///     BackendError, InferenceBackend, InMemoryCounterSink, ModelSignature, RuntimeConfig,
///     StreamEngine, Tag, TensorMap, Timestamp,
/// };
/// use run_throttle::RunThrottle;
/// use std::sync::Arc;
/// use tensor_core::{Shape, Tensor};
///
/// struct Echo;
/// impl InferenceBackend for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn run(&self, inputs: &TensorMap, _: &[Tag]) -> Result<TensorMap, BackendError> {
///         Ok(TensorMap::from([(Tag::from("OUTPUT"), inputs["INPUT"].clone())]))
///     }
/// }
///
/// # fn main() -> Result<(), runtime::RuntimeError> {
/// let config = RuntimeConfig::default();
/// let signature = ModelSignature::from_tags("echo", ["INPUT", "OUTPUT"]);
/// let mut engine = StreamEngine::new(config, &signature)?.start(
///     Arc::new(Echo),
///     RunThrottle::unbounded(),
///     Arc::new(InMemoryCounterSink::new()),
/// );
/// let x = Tensor::full_f32(Shape::vector(3), 1.0);
/// let packets = engine.add(&Tag::from("INPUT"), Timestamp(0), Some(x.clone()))?;
/// assert_eq!(packets[0].tensor, x);
/// engine.close()?;
/// # Ok(())
/// # }
/// ```
pub struct StreamEngine<S: EngineState = Configured> {
    config: RuntimeConfig,
    names: CounterNames,
    accumulator: BatchAccumulator,
    recurrent: RecurrentState,
    assembler: BatchAssembler,
    distributor: OutputDistributor,
    counters: EngineCounters,
    state: S,
}

// ── Configured → Running ───────────────────────────────────────

impl StreamEngine<Configured> {
    /// Validates `config` against `signature` and builds the pipeline.
    pub fn new(config: RuntimeConfig, signature: &ModelSignature) -> Result<Self, RuntimeError> {
        config.validate()?;
        config.validate_against(signature)?;
        let bindings = config.recurrent_bindings()?;

        tracing::info!(
            name = %config.name,
            batch_size = config.batch_size,
            inputs = config.inputs.len(),
            outputs = config.outputs.len(),
            recurrent = bindings.len(),
            "stream engine configured"
        );

        Ok(Self {
            names: CounterNames::new(&config.name),
            accumulator: BatchAccumulator::new(&config, &bindings),
            assembler: BatchAssembler::new(&config, &bindings),
            distributor: OutputDistributor::new(&config),
            recurrent: RecurrentState::new(bindings),
            counters: EngineCounters::default(),
            config,
            state: Configured,
        })
    }

    /// Supplies initial recurrent state, keyed by feed tag, for the first
    /// invocation. Values are passed to the engine unchanged.
    pub fn with_initial_state(mut self, initial: TensorMap) -> Result<Self, RuntimeError> {
        self.recurrent.seed(initial)?;
        Ok(self)
    }

    /// Attaches the backend, shared throttle and counter sink.
    pub fn start(
        self,
        backend: Arc<dyn InferenceBackend>,
        throttle: RunThrottle,
        sink: Arc<dyn CounterSink>,
    ) -> StreamEngine<Running> {
        tracing::info!(
            name = %self.config.name,
            backend = backend.name(),
            limit = %throttle.limit(),
            "stream engine started"
        );
        StreamEngine {
            config: self.config,
            names: self.names,
            accumulator: self.accumulator,
            recurrent: self.recurrent,
            assembler: self.assembler,
            distributor: self.distributor,
            counters: self.counters,
            state: Running {
                backend,
                throttle,
                sink,
            },
        }
    }
}

// ── Running: accept items and flush ────────────────────────────

impl StreamEngine<Running> {
    /// Accepts one item and returns the packets of any batch it completed.
    ///
    /// `None` marks the tag as absent at `timestamp`.
    pub fn add(
        &mut self,
        tag: &Tag,
        timestamp: Timestamp,
        value: Option<Tensor>,
    ) -> Result<Vec<OutputPacket>, RuntimeError> {
        self.accumulator.add(tag, timestamp, value)?;
        self.drain_ready()
    }

    /// Delivers several ports of one timestamp at once.
    pub fn process<I>(&mut self, timestamp: Timestamp, items: I) -> Result<Vec<OutputPacket>, RuntimeError>
    where
        I: IntoIterator<Item = (Tag, Option<Tensor>)>,
    {
        let mut packets = Vec::new();
        for (tag, value) in items {
            packets.extend(self.add(&tag, timestamp, value)?);
        }
        Ok(packets)
    }

    /// Closes the stream, flushing any partial batch through the normal path.
    ///
    /// Timestamps committed before the stream ended are always run, even when
    /// the staged row turns out to be incomplete under
    /// [`MissingInputPolicy::Fail`](crate::MissingInputPolicy::Fail). That
    /// row's error is returned after the flush.
    pub fn close(mut self) -> Result<StreamReport, RuntimeError> {
        let finished = self.accumulator.finish();
        let mut packets = Vec::new();
        while self.accumulator.committed() > 0 {
            packets.extend(self.flush()?);
        }
        tracing::info!(name = %self.config.name, "{}", self.counters.summary());
        finished?;
        Ok(StreamReport {
            packets,
            counters: self.counters,
        })
    }

    /// Totals so far.
    pub fn counters(&self) -> &EngineCounters {
        &self.counters
    }

    /// The throttle this engine acquires before each run.
    pub fn throttle(&self) -> &RunThrottle {
        &self.state.throttle
    }

    /// Committed timestamps not yet flushed.
    pub fn pending(&self) -> usize {
        self.accumulator.committed()
    }

    fn drain_ready(&mut self) -> Result<Vec<OutputPacket>, RuntimeError> {
        let mut packets = Vec::new();
        while self.accumulator.is_batch_ready() {
            packets.extend(self.flush()?);
        }
        Ok(packets)
    }

    /// Runs one batch end to end. Nothing is emitted and no counter moves
    /// unless every step succeeds.
    fn flush(&mut self) -> Result<Vec<OutputPacket>, RuntimeError> {
        let started = Instant::now();
        let mut batch = self.accumulator.pop_batch();
        for (tag, value) in std::mem::take(&mut batch.feed_overrides) {
            self.recurrent.override_feed(tag, value);
        }
        let overridden = self.recurrent.overridden();
        let feeds = self.recurrent.take_feed_inputs();
        let inputs = self.assembler.assemble(batch.columns, feeds)?;
        let requested = self.assembler.requested_outputs();

        let (outputs, engine_time) = {
            let _permit = self.state.throttle.acquire(1)?;
            let run_started = Instant::now();
            let outputs = self.state.backend.run(&inputs, requested)?;
            (outputs, run_started.elapsed())
        };
        if let Some(missing) = requested.iter().find(|t| !outputs.contains_key(*t)) {
            return Err(BackendError::new(
                self.state.backend.name(),
                format!("requested output '{missing}' was not produced"),
            )
            .into());
        }

        let packets = self.distributor.distribute(&batch.timestamps, &outputs)?;
        self.recurrent.absorb(&outputs);
        self.counters.record_flush(
            &self.names,
            self.state.sink.as_ref(),
            started.elapsed(),
            engine_time,
            batch.timestamps.len(),
        );
        tracing::debug!(
            name = %self.config.name,
            timestamps = batch.timestamps.len(),
            packets = packets.len(),
            overridden,
            engine_us = engine_time.as_micros() as u64,
            "batch flushed"
        );
        Ok(packets)
    }
}

// ── Shared accessors ───────────────────────────────────────────

impl<S: EngineState> StreamEngine<S> {
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Tags requested from the backend on every run.
    pub fn requested_outputs(&self) -> &[Tag] {
        self.assembler.requested_outputs()
    }

    /// Recurrent bindings and their pending state.
    pub fn recurrent(&self) -> &RecurrentState {
        &self.recurrent
    }
}

impl<S: EngineState> std::fmt::Debug for StreamEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamEngine")
            .field("state", &self.state)
            .field("name", &self.config.name)
            .field("batch_size", &self.config.batch_size)
            .field("pending", &self.accumulator.committed())
            .finish()
    }
}
