// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Concurrency limit configuration and parsing.
//!
//! A [`ThrottleLimit`] is the ceiling on concurrently held units. The
//! configuration surface expresses it as an integer where `0` means
//! unbounded, so both forms are supported here.

use crate::ThrottleError;
use std::fmt;

/// The maximum number of units that may be held at once.
///
/// # Parsing
/// - `"unbounded"`, `"none"` or `"0"` → [`ThrottleLimit::Unbounded`]
/// - `"4"` → `ThrottleLimit::Max(4)`
///
/// # Examples
/// ```
/// use run_throttle::ThrottleLimit;
///
/// assert_eq!(ThrottleLimit::from_max(0), ThrottleLimit::Unbounded);
/// assert_eq!(ThrottleLimit::parse("2").unwrap(), ThrottleLimit::Max(2));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ThrottleLimit {
    /// Acquisitions never block.
    #[default]
    Unbounded,
    /// At most this many units may be held concurrently. Never zero.
    Max(u32),
}

impl ThrottleLimit {
    /// Builds a limit from the configuration integer, `0` meaning unbounded.
    pub fn from_max(max: u32) -> Self {
        if max == 0 {
            ThrottleLimit::Unbounded
        } else {
            ThrottleLimit::Max(max)
        }
    }

    /// Returns the ceiling, or `None` when unbounded.
    pub fn max(&self) -> Option<u32> {
        match self {
            ThrottleLimit::Unbounded => None,
            ThrottleLimit::Max(m) => Some(*m),
        }
    }

    /// Returns `true` if this limit never blocks.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, ThrottleLimit::Unbounded)
    }

    /// Parses a human-readable limit string. Case-insensitive.
    pub fn parse(s: &str) -> Result<Self, ThrottleError> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "unbounded" | "none" => return Ok(ThrottleLimit::Unbounded),
            _ => {}
        }
        let value: u32 = s.parse().map_err(|_| {
            ThrottleError::InvalidLimit(format!(
                "'{s}': expected a non-negative integer or 'unbounded'"
            ))
        })?;
        Ok(Self::from_max(value))
    }
}

impl fmt::Display for ThrottleLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThrottleLimit::Unbounded => write!(f, "unbounded"),
            ThrottleLimit::Max(m) => write!(f, "{m} concurrent"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_max() {
        assert_eq!(ThrottleLimit::from_max(0), ThrottleLimit::Unbounded);
        assert_eq!(ThrottleLimit::from_max(3), ThrottleLimit::Max(3));
        assert_eq!(ThrottleLimit::from_max(3).max(), Some(3));
        assert_eq!(ThrottleLimit::Unbounded.max(), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(ThrottleLimit::parse("8").unwrap(), ThrottleLimit::Max(8));
        assert_eq!(ThrottleLimit::parse(" 0 ").unwrap(), ThrottleLimit::Unbounded);
        assert_eq!(
            ThrottleLimit::parse("Unbounded").unwrap(),
            ThrottleLimit::Unbounded
        );
        assert!(ThrottleLimit::parse("-1").is_err());
        assert!(ThrottleLimit::parse("lots").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ThrottleLimit::Max(2).to_string(), "2 concurrent");
        assert_eq!(ThrottleLimit::Unbounded.to_string(), "unbounded");
    }
}
