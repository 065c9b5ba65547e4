// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `stream-infer run` command: stream synthetic timestamps through one or
//! more engine instances.
//!
//! Each instance walks the full type-state pipeline on a blocking worker:
//! ```text
//! StreamEngine<Configured> → start → <Running> → add × N → close
//! ```
//! All instances share one throttle and one counter sink.

use super::synthetic::SyntheticBackend;
use anyhow::Context;
use run_throttle::{RunThrottle, ThrottleLimit};
use runtime::{
    InMemoryCounterSink, InferenceBackend, ModelSignature, Running, RuntimeConfig, RuntimeError,
    StreamEngine, StreamReport, TensorMap, Timestamp,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tensor_core::{DType, Shape, Tensor};

pub struct RunArgs {
    pub config: PathBuf,
    pub signature: Option<PathBuf>,
    pub timestamps: i64,
    pub instances: usize,
    pub dims: String,
    pub throttle: Option<String>,
    pub engine_delay_us: u64,
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            stream-infer · Stream Runner              ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let (config, signature) = super::load(&args.config, args.signature.as_deref())?;
    let dims = super::parse_dims(&args.dims)?;
    anyhow::ensure!(args.instances > 0, "--instances must be at least 1");
    anyhow::ensure!(args.timestamps >= 0, "--timestamps must not be negative");

    let limit = match &args.throttle {
        Some(s) => ThrottleLimit::parse(s).map_err(|e| anyhow::anyhow!("invalid --throttle: {e}"))?,
        None => config.throttle_limit(),
    };
    let throttle = RunThrottle::new(limit);
    let sink = Arc::new(InMemoryCounterSink::new());
    let backend: Arc<dyn InferenceBackend> =
        Arc::new(SyntheticBackend::new(Duration::from_micros(args.engine_delay_us)));

    println!("  Config:");
    println!("   Name:       {}", config.name);
    println!("   Batch size: {}", config.batch_size);
    println!("   Throttle:   {}", throttle.limit());
    println!("   Instances:  {}", args.instances);
    println!("   Timestamps: {} per instance", args.timestamps);
    println!("   Shape:      {}", Shape::new(dims.clone()));
    println!();

    let wall = Instant::now();
    let mut handles = Vec::with_capacity(args.instances);
    for i in 0..args.instances {
        let mut instance = config.clone();
        if args.instances > 1 {
            instance.name = format!("{}{i}", config.name);
        }
        let name = instance.name.clone();
        let engine = configure(instance, &signature, &dims)
            .with_context(|| format!("configuring instance '{name}'"))?
            .start(backend.clone(), throttle.clone(), sink.clone());
        let dims = dims.clone();
        let timestamps = args.timestamps;
        handles.push((
            name,
            tokio::task::spawn_blocking(move || drive(engine, timestamps, &dims)),
        ));
    }

    println!(
        "  {:<20} {:>8} {:>8} {:>12} {:>12}",
        "Instance", "Packets", "Runs", "Engine ms", "Total ms",
    );
    println!("  {}", "-".repeat(64));
    for (name, handle) in handles {
        let (emitted, report) = handle
            .await
            .context("instance worker panicked")?
            .with_context(|| format!("instance '{name}' failed"))?;
        tracing::info!(instance = %name, "{}", report.counters.summary());
        let c = &report.counters;
        println!(
            "  {:<20} {:>8} {:>8} {:>12.2} {:>12.2}",
            name,
            emitted,
            c.engine_runs,
            c.engine_time.as_secs_f64() * 1000.0,
            c.total_time.as_secs_f64() * 1000.0,
        );
    }
    println!();

    println!("  Counters:");
    for (name, value) in sink.snapshot() {
        println!("   {name:<44} {value:>10}");
    }
    println!();
    println!("  Throttle: {}", throttle.stats().summary());
    println!("  Wall:     {:.2}ms", wall.elapsed().as_secs_f64() * 1000.0);

    Ok(())
}

/// Validates the instance and seeds zero recurrent state shaped like the
/// streamed tensors.
fn configure(
    config: RuntimeConfig,
    signature: &ModelSignature,
    dims: &[usize],
) -> Result<StreamEngine, RuntimeError> {
    let mut state = Tensor::zeros(Shape::new(dims.to_vec()), DType::F32);
    if config.add_batch_dim {
        state = state.with_batch_dim();
    }
    let initial: TensorMap = config
        .recurrent_bindings()?
        .into_iter()
        .map(|b| (b.feed, state.clone()))
        .collect();
    StreamEngine::new(config, signature)?.with_initial_state(initial)
}

/// Feeds `timestamps` rows to every data port, then closes the stream.
fn drive(
    mut engine: StreamEngine<Running>,
    timestamps: i64,
    dims: &[usize],
) -> Result<(usize, StreamReport), RuntimeError> {
    let ports: Vec<_> = engine
        .config()
        .inputs
        .iter()
        .filter(|t| !engine.recurrent().is_feed(t))
        .cloned()
        .collect();

    let mut emitted = 0;
    for ts in 0..timestamps {
        let value = Tensor::full_f32(Shape::new(dims.to_vec()), ts as f32);
        let items = ports.iter().map(|tag| (tag.clone(), Some(value.clone())));
        emitted += engine.process(Timestamp(ts), items)?.len();
    }
    let report = engine.close()?;
    emitted += report.packets.len();
    Ok((emitted, report))
}
