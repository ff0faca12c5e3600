// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Human-readable memory sizes.
//!
//! A [`MemoryBudget`] is a byte count that can be written as `"512M"`,
//! `"1G"`, `"2048K"` or a raw number in configuration files and on the
//! command line.

use crate::BudgetError;
use std::fmt;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// A non-zero memory size in bytes.
///
/// # Examples
/// ```
/// use batch_planner::MemoryBudget;
///
/// let b = MemoryBudget::parse("64K").unwrap();
/// assert_eq!(b.as_bytes(), 65536);
/// assert_eq!(b.to_string(), "64 KB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct MemoryBudget {
    bytes: u64,
}

impl MemoryBudget {
    pub fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    pub fn from_kb(kb: u64) -> Self {
        Self::from_bytes(kb * KB)
    }

    pub fn from_mb(mb: u64) -> Self {
        Self::from_bytes(mb * MB)
    }

    pub fn from_gb(gb: u64) -> Self {
        Self::from_bytes(gb * GB)
    }

    pub fn as_bytes(&self) -> u64 {
        self.bytes
    }

    /// Whole megabytes, truncated.
    pub fn as_mb(&self) -> u64 {
        self.bytes / MB
    }

    /// Parses `"512M"`, `"512MB"`, `"1G"`, `"2048K"`, `"100B"` or a plain
    /// byte count. Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(s: &str) -> Result<Self, BudgetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BudgetError::Invalid(s.to_string()));
        }

        let upper = s.to_ascii_uppercase();
        let (digits, multiplier) = [("GB", GB), ("G", GB), ("MB", MB), ("M", MB), ("KB", KB), ("K", KB), ("B", 1)]
            .iter()
            .find_map(|&(suffix, mult)| upper.strip_suffix(suffix).map(|rest| (rest, mult)))
            .unwrap_or((upper.as_str(), 1));

        let value: u64 = digits
            .trim()
            .parse()
            .map_err(|_| BudgetError::Invalid(s.to_string()))?;
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| BudgetError::Overflow(s.to_string()))?;
        if bytes == 0 {
            return Err(BudgetError::Zero);
        }
        Ok(Self { bytes })
    }
}

impl fmt::Display for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bytes;
        if b >= GB && b % GB == 0 {
            write!(f, "{} GB", b / GB)
        } else if b >= MB && b % MB == 0 {
            write!(f, "{} MB", b / MB)
        } else if b >= KB && b % KB == 0 {
            write!(f, "{} KB", b / KB)
        } else {
            write!(f, "{b} B")
        }
    }
}
