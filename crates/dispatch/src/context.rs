// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The dispatch context: backend, corpus and per-device caches.
//!
//! A [`DispatchContext`] is built once and shared by `Arc`. Device profiles
//! and compiled programs are captured lazily on first use and live as long
//! as the context.

use crate::FallbackPolicy;
use batch_planner::Batch;
use benchmark_corpus::BenchmarkCorpus;
use compute_backend::{
    ComputeBackend, DeviceEntry, DeviceId, DeviceRegistry, KernelCompileError, KernelSource,
    ProgramCache, ProgramId,
};
use device_profile::{DeviceProfile, DeviceQueryError};
use std::sync::Arc;

/// Default bytes of device memory reserved for anything besides the input.
pub const DEFAULT_MEMORY_OVERHEAD: u64 = 64 * 1024;

/// Shared state for strategy selection and accelerator execution.
pub struct DispatchContext {
    backend: Arc<dyn ComputeBackend>,
    corpus: Arc<BenchmarkCorpus>,
    devices: DeviceRegistry,
    programs: ProgramCache,
    memory_overhead: u64,
    unit_size: u64,
    fallback: FallbackPolicy,
}

impl DispatchContext {
    /// Starts building a context around `backend`.
    pub fn builder(backend: Arc<dyn ComputeBackend>) -> ContextBuilder {
        ContextBuilder {
            backend,
            corpus: None,
            host: None,
            memory_overhead: DEFAULT_MEMORY_OVERHEAD,
            unit_size: Batch::DEFAULT_UNIT_SIZE,
            fallback: FallbackPolicy::Host,
        }
    }

    /// A context with the shared corpus and default settings.
    pub fn new(backend: Arc<dyn ComputeBackend>) -> Arc<Self> {
        Self::builder(backend).build()
    }

    pub fn backend(&self) -> &Arc<dyn ComputeBackend> {
        &self.backend
    }

    pub fn corpus(&self) -> &BenchmarkCorpus {
        &self.corpus
    }

    pub fn host_profile(&self) -> &DeviceProfile {
        self.devices.host()
    }

    /// All accelerators in enumeration order, captured on first call.
    pub fn accelerators(&self) -> Result<Arc<[DeviceEntry]>, DeviceQueryError> {
        self.devices.accelerators(self.backend.as_ref())
    }

    pub fn accelerator(&self, device: DeviceId) -> Result<DeviceProfile, DeviceQueryError> {
        self.devices.accelerator(self.backend.as_ref(), device)
    }

    /// The compiled program for `source` on `device`, compiled on first use.
    pub fn program(&self, device: DeviceId, source: &KernelSource) -> Result<ProgramId, KernelCompileError> {
        self.programs.get_or_compile(self.backend.as_ref(), device, source)
    }

    /// Device memory reserved beyond a workload's input, in bytes.
    pub fn memory_overhead(&self) -> u64 {
        self.memory_overhead
    }

    /// Bytes per entry used when this context creates batches.
    pub fn unit_size(&self) -> u64 {
        self.unit_size
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("backend", &self.backend.name())
            .field("corpus", &self.corpus.summary())
            .field("memory_overhead", &self.memory_overhead)
            .field("unit_size", &self.unit_size)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Builder for [`DispatchContext`].
pub struct ContextBuilder {
    backend: Arc<dyn ComputeBackend>,
    corpus: Option<Arc<BenchmarkCorpus>>,
    host: Option<DeviceProfile>,
    memory_overhead: u64,
    unit_size: u64,
    fallback: FallbackPolicy,
}

impl ContextBuilder {
    /// Uses `corpus` instead of the embedded one.
    pub fn corpus(mut self, corpus: Arc<BenchmarkCorpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Fixes the host profile instead of reading `/proc/cpuinfo`.
    pub fn host_profile(mut self, profile: DeviceProfile) -> Self {
        self.host = Some(profile);
        self
    }

    pub fn memory_overhead(mut self, bytes: u64) -> Self {
        self.memory_overhead = bytes;
        self
    }

    pub fn unit_size(mut self, bytes: u64) -> Self {
        self.unit_size = bytes;
        self
    }

    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    pub fn build(self) -> Arc<DispatchContext> {
        let devices = match self.host {
            Some(profile) => DeviceRegistry::with_host(profile),
            None => DeviceRegistry::new(),
        };
        let context = DispatchContext {
            backend: self.backend,
            corpus: self.corpus.unwrap_or_else(BenchmarkCorpus::shared),
            devices,
            programs: ProgramCache::new(),
            memory_overhead: self.memory_overhead,
            unit_size: self.unit_size,
            fallback: self.fallback,
        };
        tracing::info!(
            "dispatch context on '{}' backend: {}",
            context.backend.name(),
            context.corpus.summary()
        );
        Arc::new(context)
    }
}
