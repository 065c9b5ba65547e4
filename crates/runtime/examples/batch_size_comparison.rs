// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Compare batch sizes against a backend with fixed per-call cost.
//!
//! Each engine run sleeps for a fixed setup cost plus a small per-row cost,
//! which is roughly how accelerator delegates behave. Larger batches
//! amortise the setup cost; the counters show how much.
//!
//! ```bash
//! cargo run -p runtime --example batch_size_comparison
//! ```

use run_throttle::RunThrottle;
use runtime::{
    BackendError, InMemoryCounterSink, InferenceBackend, ModelSignature, RuntimeConfig,
    StreamEngine, Tag, TensorMap, Timestamp,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tensor_core::{Shape, Tensor};

struct DelegateLike {
    setup: Duration,
    per_row: Duration,
}

impl InferenceBackend for DelegateLike {
    fn name(&self) -> &str {
        "delegate-like"
    }

    fn run(&self, inputs: &TensorMap, _requested: &[Tag]) -> Result<TensorMap, BackendError> {
        let x = inputs
            .get("FRAME")
            .ok_or_else(|| BackendError::new(self.name(), "FRAME not bound"))?;
        let rows = x.shape().leading_dim().unwrap_or(1) as u32;
        std::thread::sleep(self.setup + self.per_row * rows);
        Ok(TensorMap::from([(Tag::from("SCORES"), x.clone())]))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let signature = ModelSignature::from_tags("detector", ["FRAME", "SCORES"]);
    let backend = Arc::new(DelegateLike {
        setup: Duration::from_millis(2),
        per_row: Duration::from_micros(100),
    });
    let frame = Tensor::full_f32(Shape::new(vec![64, 64, 3]), 0.5);
    let timestamps = 60;

    println!(
        "{:>6} {:>8} {:>12} {:>12} {:>10}",
        "Batch", "Runs", "Engine ms", "Total ms", "Wall ms",
    );
    println!("{}", "-".repeat(52));

    for batch_size in [1usize, 2, 4, 8, 16] {
        let config = RuntimeConfig {
            name: format!("Batch{batch_size}"),
            batch_size,
            inputs: vec![Tag::from("FRAME")],
            outputs: vec![Tag::from("SCORES")],
            ..Default::default()
        };
        let mut engine = StreamEngine::new(config, &signature)?.start(
            backend.clone(),
            RunThrottle::unbounded(),
            Arc::new(InMemoryCounterSink::new()),
        );

        let wall = Instant::now();
        let mut emitted = 0;
        for ts in 0..timestamps {
            emitted += engine
                .add(&Tag::from("FRAME"), Timestamp(ts), Some(frame.clone()))?
                .len();
        }
        let report = engine.close()?;
        emitted += report.packets.len();
        assert_eq!(emitted, timestamps as usize);

        let c = &report.counters;
        println!(
            "{:>6} {:>8} {:>12.2} {:>12.2} {:>10.2}",
            batch_size,
            c.engine_runs,
            c.engine_time.as_secs_f64() * 1000.0,
            c.total_time.as_secs_f64() * 1000.0,
            wall.elapsed().as_secs_f64() * 1000.0,
        );
    }

    Ok(())
}
