// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Flush instrumentation.
//!
//! [`EngineCounters`] accumulates four monotonically increasing totals per
//! engine instance. After each successful flush the same deltas are pushed
//! to a [`CounterSink`] under names prefixed with the instance name.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// Receives counter increments from engine instances.
pub trait CounterSink: Send + Sync {
    /// Adds `delta` to the counter called `name`.
    fn increment_counter(&self, name: &str, delta: u64);
}

/// Sink that keeps counters in memory. Useful for tests and for the CLI's
/// end-of-run report.
#[derive(Debug, Default)]
pub struct InMemoryCounterSink {
    counters: Mutex<BTreeMap<String, u64>>,
}

impl InMemoryCounterSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `name`, or 0 if it was never incremented.
    pub fn get(&self, name: &str) -> u64 {
        self.lock().get(name).copied().unwrap_or(0)
    }

    /// Copy of every counter.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, u64>> {
        self.counters
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CounterSink for InMemoryCounterSink {
    fn increment_counter(&self, name: &str, delta: u64) {
        *self.lock().entry(name.to_string()).or_insert(0) += delta;
    }
}

/// Sink that emits each increment as a `tracing` event at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCounterSink;

impl CounterSink for TracingCounterSink {
    fn increment_counter(&self, name: &str, delta: u64) {
        tracing::debug!(counter = name, delta, "counter incremented");
    }
}

/// Sink-facing counter names for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterNames {
    pub total_time: String,
    pub processed_timestamps: String,
    pub engine_time: String,
    pub engine_runs: String,
}

impl CounterNames {
    pub fn new(node: &str) -> Self {
        Self {
            total_time: format!("{node}-TotalTimeUsecs"),
            processed_timestamps: format!("{node}-TotalProcessedTimestamps"),
            engine_time: format!("{node}-TotalEngineRunsTimeUsecs"),
            engine_runs: format!("{node}-TotalNumEngineRuns"),
        }
    }
}

/// Running totals for one engine instance. Never reset.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct EngineCounters {
    /// Wall-clock time spent in flushes, from assembly to distribution.
    pub total_time: Duration,
    /// Time spent inside the backend's `run`.
    pub engine_time: Duration,
    /// Number of backend invocations.
    pub engine_runs: u64,
    /// Number of real (non-padding) timestamps processed.
    pub processed_timestamps: u64,
}

impl EngineCounters {
    /// Records one successful flush and pushes the deltas to `sink`.
    pub fn record_flush(
        &mut self,
        names: &CounterNames,
        sink: &dyn CounterSink,
        total: Duration,
        engine: Duration,
        timestamps: usize,
    ) {
        self.total_time += total;
        self.engine_time += engine;
        self.engine_runs += 1;
        self.processed_timestamps += timestamps as u64;

        sink.increment_counter(&names.total_time, micros(total));
        sink.increment_counter(&names.processed_timestamps, timestamps as u64);
        sink.increment_counter(&names.engine_time, micros(engine));
        sink.increment_counter(&names.engine_runs, 1);
    }

    /// Mean number of timestamps per engine run.
    pub fn mean_batch_fill(&self) -> f64 {
        if self.engine_runs == 0 {
            return 0.0;
        }
        self.processed_timestamps as f64 / self.engine_runs as f64
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{} timestamps in {} engine runs ({:.2} per run), \
             {:.2}ms total, {:.2}ms in engine",
            self.processed_timestamps,
            self.engine_runs,
            self.mean_batch_fill(),
            self.total_time.as_secs_f64() * 1000.0,
            self.engine_time.as_secs_f64() * 1000.0,
        )
    }
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_names() {
        let n = CounterNames::new("StreamEngine");
        assert_eq!(n.total_time, "StreamEngine-TotalTimeUsecs");
        assert_eq!(n.processed_timestamps, "StreamEngine-TotalProcessedTimestamps");
        assert_eq!(n.engine_time, "StreamEngine-TotalEngineRunsTimeUsecs");
        assert_eq!(n.engine_runs, "StreamEngine-TotalNumEngineRuns");
    }

    #[test]
    fn test_record_flush() {
        let names = CounterNames::new("n");
        let sink = InMemoryCounterSink::new();
        let mut c = EngineCounters::default();
        c.record_flush(&names, &sink, Duration::from_micros(500), Duration::from_micros(300), 4);
        c.record_flush(&names, &sink, Duration::from_micros(200), Duration::from_micros(100), 2);

        assert_eq!(c.engine_runs, 2);
        assert_eq!(c.processed_timestamps, 6);
        assert_eq!(c.engine_time, Duration::from_micros(400));
        assert_eq!(sink.get("n-TotalNumEngineRuns"), 2);
        assert_eq!(sink.get("n-TotalProcessedTimestamps"), 6);
        assert_eq!(sink.get("n-TotalTimeUsecs"), 700);
        assert_eq!(sink.get("n-TotalEngineRunsTimeUsecs"), 400);
        assert!((c.mean_batch_fill() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_format() {
        let c = EngineCounters {
            engine_runs: 2,
            processed_timestamps: 3,
            ..Default::default()
        };
        let s = c.summary();
        assert!(s.contains("3 timestamps"));
        assert!(s.contains("2 engine runs"));
    }

    #[test]
    fn test_empty_sink() {
        let sink = InMemoryCounterSink::new();
        assert_eq!(sink.get("missing"), 0);
        assert!(sink.snapshot().is_empty());
        TracingCounterSink.increment_counter("x", 1);
    }
}
