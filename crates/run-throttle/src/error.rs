// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the run throttle.

/// Errors that can occur when acquiring throttle units.
///
/// Exhaustion is never an error: an acquisition that merely has to wait
/// blocks until units are released.
#[derive(Debug, thiserror::Error)]
pub enum ThrottleError {
    /// The request can never be satisfied because it exceeds the ceiling.
    #[error("cannot acquire {requested} units from a throttle limited to {max}")]
    ExceedsCapacity { requested: u32, max: u32 },

    /// Attempted to acquire zero units.
    #[error("cannot acquire zero throttle units")]
    ZeroUnits,

    /// The limit string could not be parsed.
    #[error("invalid throttle limit {0}")]
    InvalidLimit(String),
}
