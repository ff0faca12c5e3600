// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dispatch configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! memory_overhead = "64K"
//! unit_size = 8
//! corpus_path = "./bench/corpus.json"
//! fallback = "host"
//!
//! [[simulated_devices]]
//! identifier = "GeForce GTX 560"
//! device_kind = "accelerator"
//! device_class = "gpu"
//! compute_unit_count = 7
//! max_items_per_unit = 1024
//! clock_mhz = 1620
//! global_memory_bytes = 1073741824
//! local_memory_bytes = 49152
//! ```

use crate::{DispatchContext, DispatchError};
use batch_planner::{Batch, MemoryBudget};
use benchmark_corpus::BenchmarkCorpus;
use compute_backend::{ComputeBackend, SimulatedBackend};
use device_profile::DeviceProfile;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a workload does when no candidate has a prediction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Run the host implementation.
    #[default]
    Host,
    /// Surface the selection error.
    Fail,
}

/// Configuration for the dispatch layer.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DispatchConfig {
    /// Device memory reserved beyond a workload's input (e.g. `"64K"`).
    #[serde(default = "default_overhead")]
    pub memory_overhead: String,
    /// Bytes per batch entry; defaults to one packed vertex.
    pub unit_size: Option<u64>,
    /// Benchmark corpus JSON; the embedded corpus is used when absent.
    pub corpus_path: Option<PathBuf>,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// Devices exposed by the simulated backend.
    #[serde(default = "default_devices")]
    pub simulated_devices: Vec<DeviceProfile>,
}

fn default_overhead() -> String {
    "64K".to_string()
}

fn default_devices() -> Vec<DeviceProfile> {
    vec![DeviceProfile::accelerator(
        "GeForce GTX 560",
        7,
        1024,
        1620,
        1 << 30,
        48 * 1024,
    )]
}

impl DispatchConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DispatchError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, DispatchError> {
        toml::from_str(toml_str).map_err(|e| DispatchError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, DispatchError> {
        toml::to_string_pretty(self)
            .map_err(|e| DispatchError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the memory overhead string into bytes. `"0"` disables it.
    pub fn parse_overhead(&self) -> Result<u64, DispatchError> {
        if self.memory_overhead.trim() == "0" {
            return Ok(0);
        }
        MemoryBudget::parse(&self.memory_overhead)
            .map(|b| b.as_bytes())
            .map_err(|e| DispatchError::Config(format!("invalid memory overhead: {e}")))
    }

    /// Loads the configured corpus, or the shared embedded one.
    pub fn load_corpus(&self) -> Result<Arc<BenchmarkCorpus>, DispatchError> {
        match &self.corpus_path {
            Some(path) => Ok(Arc::new(BenchmarkCorpus::from_file(path)?)),
            None => Ok(BenchmarkCorpus::shared()),
        }
    }

    /// A simulated backend exposing `simulated_devices`.
    pub fn build_backend(&self) -> Arc<dyn ComputeBackend> {
        Arc::new(SimulatedBackend::new(self.simulated_devices.clone()))
    }

    /// Builds a context over `backend` with these settings.
    pub fn build_context(&self, backend: Arc<dyn ComputeBackend>) -> Result<Arc<DispatchContext>, DispatchError> {
        let unit_size = self.unit_size.unwrap_or(Batch::DEFAULT_UNIT_SIZE);
        if unit_size == 0 {
            return Err(DispatchError::Config("unit_size must be positive".to_string()));
        }
        Ok(DispatchContext::builder(backend)
            .corpus(self.load_corpus()?)
            .memory_overhead(self.parse_overhead()?)
            .unit_size(unit_size)
            .fallback(self.fallback)
            .build())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            memory_overhead: default_overhead(),
            unit_size: None,
            corpus_path: None,
            fallback: FallbackPolicy::Host,
            simulated_devices: default_devices(),
        }
    }
}
