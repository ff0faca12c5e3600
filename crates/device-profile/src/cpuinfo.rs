// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Host CPU description from `/proc/cpuinfo`.
//!
//! Only the first processor block is consulted; Linux repeats identical
//! `siblings`, `cpu MHz` and `cache size` lines for every logical CPU.
//! Fields that are absent or malformed stay `None` and the caller applies
//! defaults.

use crate::IntrospectionError;
use std::path::Path;

const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Parsed host CPU fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CpuInfo {
    /// `model name`.
    pub model_name: Option<String>,
    /// `siblings`: logical CPUs per package.
    pub siblings: Option<u64>,
    /// Integer part of `cpu MHz`.
    pub clock_mhz: Option<u64>,
    /// `cache size` converted from KB to bytes.
    pub cache_bytes: Option<u64>,
}

impl CpuInfo {
    /// Reads and parses `/proc/cpuinfo`.
    pub fn read() -> Result<Self, IntrospectionError> {
        Self::read_from(Path::new(CPUINFO_PATH))
    }

    /// Reads and parses a cpuinfo-formatted file.
    pub fn read_from(path: &Path) -> Result<Self, IntrospectionError> {
        let content = std::fs::read_to_string(path).map_err(|e| IntrospectionError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let info = Self::parse(&content);
        if info == Self::default() {
            return Err(IntrospectionError::NotAvailable {
                path: path.display().to_string(),
            });
        }
        Ok(info)
    }

    /// Parses cpuinfo text. Never fails; unknown lines are ignored.
    pub fn parse(content: &str) -> Self {
        let mut info = Self::default();
        for line in content.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "model name" if info.model_name.is_none() && !value.is_empty() => {
                    info.model_name = Some(value.to_string());
                }
                "siblings" if info.siblings.is_none() => {
                    info.siblings = value.parse().ok().filter(|&n| n > 0);
                }
                "cpu MHz" if info.clock_mhz.is_none() => {
                    info.clock_mhz = parse_integer_part(value);
                }
                "cache size" if info.cache_bytes.is_none() => {
                    info.cache_bytes = parse_cache_size(value);
                }
                _ => {}
            }
        }
        info
    }
}

/// `"3257.123"` → `3257`.
fn parse_integer_part(s: &str) -> Option<u64> {
    let int = s.split('.').next()?.trim();
    int.parse().ok()
}

/// `"6144 KB"` → `6291456`. A bare number is taken as KB.
fn parse_cache_size(s: &str) -> Option<u64> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    let kb: u64 = digits.parse().ok()?;
    kb.checked_mul(1024)
}
