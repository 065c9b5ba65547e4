// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII permit that returns throttle units on drop.
//!
//! Releasing through `Drop` means an engine call that fails, or panics and
//! unwinds, still gives its units back and wakes blocked acquirers.

use crate::throttle::ThrottleInner;
use std::sync::Arc;

/// Units held from a [`RunThrottle`](crate::RunThrottle).
///
/// # Example
/// ```
/// use run_throttle::{RunThrottle, ThrottleLimit};
///
/// let throttle = RunThrottle::new(ThrottleLimit::Max(1));
/// let permit = throttle.acquire(1).unwrap();
/// assert_eq!(throttle.in_flight(), 1);
/// drop(permit);
/// assert_eq!(throttle.in_flight(), 0);
/// ```
pub struct ThrottlePermit {
    /// Handle back to the throttle for the release.
    throttle: Arc<ThrottleInner>,
    units: u32,
}

impl ThrottlePermit {
    pub(crate) fn new(throttle: Arc<ThrottleInner>, units: u32) -> Self {
        Self { throttle, units }
    }

    /// Returns the number of units this permit holds.
    pub fn units(&self) -> u32 {
        self.units
    }
}

impl Drop for ThrottlePermit {
    fn drop(&mut self) {
        self.throttle.release(self.units);
    }
}

impl std::fmt::Debug for ThrottlePermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottlePermit")
            .field("units", &self.units)
            .finish()
    }
}
