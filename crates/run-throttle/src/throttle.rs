// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Counting admission gate for engine invocations.
//!
//! The [`RunThrottle`] bounds how many engine runs execute at once across
//! every engine instance that holds a clone of it. It:
//!
//! 1. Blocks [`acquire`](RunThrottle::acquire) until enough units are free,
//!    then takes them atomically. There is no timeout: exhaustion is
//!    back-pressure, not failure.
//! 2. Returns units when the [`ThrottlePermit`] is dropped and wakes every
//!    waiter so each can re-check its own request size.
//! 3. Tracks contention statistics for profiling.
//!
//! # Ownership
//! A throttle is an explicit handle. Clones share one pool of units, so the
//! host decides which instances compete with each other by deciding who
//! gets a clone.

use crate::{ThrottleError, ThrottleLimit, ThrottlePermit, ThrottleStats};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Internal throttle state, shared between handles and permits via `Arc`.
pub(crate) struct ThrottleInner {
    limit: ThrottleLimit,
    /// Units currently held by live permits.
    in_flight: Mutex<u32>,
    /// Signalled whenever units are returned.
    released: Condvar,
    stats: Mutex<ThrottleStats>,
}

impl ThrottleInner {
    /// Called by `ThrottlePermit::drop` to return units.
    pub(crate) fn release(&self, units: u32) {
        {
            let mut in_flight = lock(&self.in_flight);
            *in_flight = in_flight.saturating_sub(units);
        }
        self.released.notify_all();
        lock(&self.stats).record_release();
    }
}

// The guarded values are plain counters that are never left half-updated,
// so a poisoned lock is still safe to use.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A cloneable handle to a shared counting throttle.
///
/// # Example
/// ```
/// use run_throttle::{RunThrottle, ThrottleLimit};
///
/// let throttle = RunThrottle::new(ThrottleLimit::Max(2));
/// let shared = throttle.clone();
///
/// let a = throttle.acquire(1).unwrap();
/// let b = shared.acquire(1).unwrap();
/// assert_eq!(throttle.available(), Some(0));
///
/// drop(a);
/// drop(b);
/// assert_eq!(shared.available(), Some(2));
/// ```
#[derive(Clone)]
pub struct RunThrottle {
    inner: Arc<ThrottleInner>,
}

impl RunThrottle {
    /// Creates a new throttle with the given limit.
    pub fn new(limit: ThrottleLimit) -> Self {
        Self {
            inner: Arc::new(ThrottleInner {
                limit,
                in_flight: Mutex::new(0),
                released: Condvar::new(),
                stats: Mutex::new(ThrottleStats::default()),
            }),
        }
    }

    /// Creates a throttle that never blocks.
    pub fn unbounded() -> Self {
        Self::new(ThrottleLimit::Unbounded)
    }

    /// Takes `units`, blocking the calling thread until they are available.
    ///
    /// # Errors
    /// Returns [`ThrottleError::ZeroUnits`] for a zero request and
    /// [`ThrottleError::ExceedsCapacity`] if `units` is larger than the
    /// limit, since such a request could never be satisfied.
    pub fn acquire(&self, units: u32) -> Result<ThrottlePermit, ThrottleError> {
        if units == 0 {
            return Err(ThrottleError::ZeroUnits);
        }

        let mut in_flight = lock(&self.inner.in_flight);
        let mut contended = false;

        if let Some(max) = self.inner.limit.max() {
            if units > max {
                return Err(ThrottleError::ExceedsCapacity {
                    requested: units,
                    max,
                });
            }
            while max - *in_flight < units {
                if !contended {
                    tracing::trace!(units, in_flight = *in_flight, max, "throttle exhausted, waiting");
                }
                contended = true;
                in_flight = self
                    .inner
                    .released
                    .wait(in_flight)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }

        *in_flight += units;
        let now = *in_flight;
        drop(in_flight);

        lock(&self.inner.stats).record_acquire(contended, now);
        Ok(ThrottlePermit::new(Arc::clone(&self.inner), units))
    }

    /// Returns the number of units currently held.
    pub fn in_flight(&self) -> u32 {
        *lock(&self.inner.in_flight)
    }

    /// Returns the number of free units, or `None` when unbounded.
    pub fn available(&self) -> Option<u32> {
        self.inner
            .limit
            .max()
            .map(|max| max.saturating_sub(self.in_flight()))
    }

    /// Returns the configured limit.
    pub fn limit(&self) -> ThrottleLimit {
        self.inner.limit
    }

    /// Returns a snapshot of throttle statistics.
    pub fn stats(&self) -> ThrottleStats {
        lock(&self.inner.stats).clone()
    }
}

impl std::fmt::Debug for RunThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunThrottle")
            .field("limit", &self.inner.limit)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
