// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # run-throttle
//!
//! A counting admission gate that bounds how many inference engine runs
//! execute concurrently across every engine instance sharing it.
//!
//! # Key Components
//!
//! - [`ThrottleLimit`]: the ceiling, with `0`/`"unbounded"` meaning no limit.
//! - [`RunThrottle`]: the cloneable handle: blocking acquire, statistics.
//! - [`ThrottlePermit`]: an RAII wrapper around held units. Dropping it
//!   returns the units and wakes blocked acquirers.
//! - [`ThrottleStats`]: cumulative contention metrics.
//!
//! # Ownership Model
//!
//! ```text
//! RunThrottle::acquire(n)      (blocks while fewer than n units are free)
//!       │
//!       ▼
//!   ThrottlePermit  ◄─── holds n units, holds Arc<ThrottleInner>
//!       │
//!       │  drop()
//!       ▼
//!   ThrottleInner::release(n)  ──► notify_all waiters
//! ```
//!
//! The throttle is never a process-wide singleton. The host constructs one
//! and passes clones to the instances that should compete for it.
//!
//! # Example
//! ```
//! use run_throttle::{RunThrottle, ThrottleLimit};
//!
//! let throttle = RunThrottle::new(ThrottleLimit::from_max(1));
//! {
//!     let _permit = throttle.acquire(1).unwrap();
//!     assert_eq!(throttle.available(), Some(0));
//! }
//! assert_eq!(throttle.available(), Some(1));
//! ```

mod error;
mod limit;
mod permit;
mod stats;
pub(crate) mod throttle;

pub use error::ThrottleError;
pub use limit::ThrottleLimit;
pub use permit::ThrottlePermit;
pub use stats::ThrottleStats;
pub use throttle::RunThrottle;
