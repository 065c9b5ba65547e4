// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Throttle statistics for profiling and diagnostics.
//!
//! [`ThrottleStats`] tracks how often callers had to wait for units and
//! the highest concurrency actually reached. These numbers are what you
//! look at when tuning `max_concurrent_runs`.

/// Cumulative statistics about throttle usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ThrottleStats {
    /// Total number of successful acquisitions.
    pub total_acquisitions: u64,
    /// Acquisitions that had to wait for units to be released.
    pub contended_acquisitions: u64,
    /// Total number of permits returned.
    pub total_releases: u64,
    /// Highest number of units held at the same time.
    pub peak_in_flight: u32,
}

impl ThrottleStats {
    /// Returns the fraction of acquisitions that blocked, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if nothing has been acquired yet.
    pub fn contention_ratio(&self) -> f64 {
        if self.total_acquisitions == 0 {
            return 0.0;
        }
        self.contended_acquisitions as f64 / self.total_acquisitions as f64
    }

    /// Records a successful acquisition.
    pub(crate) fn record_acquire(&mut self, contended: bool, in_flight: u32) {
        self.total_acquisitions += 1;
        if contended {
            self.contended_acquisitions += 1;
        }
        if in_flight > self.peak_in_flight {
            self.peak_in_flight = in_flight;
        }
    }

    /// Records a permit being returned.
    pub(crate) fn record_release(&mut self) {
        self.total_releases += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Throttle: {} acquisitions ({} contended, {:.0}%), {} releases, peak {} in flight",
            self.total_acquisitions,
            self.contended_acquisitions,
            self.contention_ratio() * 100.0,
            self.total_releases,
            self.peak_in_flight,
        )
    }
}
