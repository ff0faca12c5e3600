// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Lazily populated device-profile and compiled-program caches.
//!
//! Both caches hold their lock across the expensive step (enumeration,
//! compilation), so concurrent first access from several threads performs
//! that step exactly once.

use crate::kernels::KernelSource;
use crate::{ComputeBackend, DeviceId, KernelCompileError, ProgramId};
use device_profile::{Capability, DeviceProfile, DeviceQueryError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// An enumerated accelerator and its captured profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub id: DeviceId,
    pub profile: DeviceProfile,
}

/// Host and accelerator profiles, captured once.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    host: OnceLock<DeviceProfile>,
    accelerators: Mutex<Option<Arc<[DeviceEntry]>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose host profile is fixed instead of introspected.
    pub fn with_host(profile: DeviceProfile) -> Self {
        let registry = Self::default();
        // A fresh OnceLock always accepts its first value.
        let _ = registry.host.set(profile);
        registry
    }

    /// The host profile, introspected on first use.
    pub fn host(&self) -> &DeviceProfile {
        self.host.get_or_init(|| {
            let profile = DeviceProfile::host();
            tracing::info!("host profile: {}", profile.summary());
            profile
        })
    }

    /// All accelerators in backend enumeration order.
    ///
    /// The first successful enumeration is cached. A failed capability
    /// query is returned and nothing is cached.
    pub fn accelerators(&self, backend: &dyn ComputeBackend) -> Result<Arc<[DeviceEntry]>, DeviceQueryError> {
        let mut slot = self.accelerators.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entries) = slot.as_ref() {
            return Ok(Arc::clone(entries));
        }

        let mut entries = Vec::new();
        for id in backend.enumerate_devices() {
            let identifier = backend.device_identifier(id).unwrap_or_else(|e| {
                tracing::warn!("device {id} has no identifier ({e}), using its handle");
                format!("device {id}")
            });
            let profile = DeviceProfile::from_capabilities(identifier, |capability| {
                backend.query_capability(id, capability)
            })?;
            tracing::info!("accelerator {id}: {}", profile.summary());
            entries.push(DeviceEntry { id, profile });
        }

        let entries: Arc<[DeviceEntry]> = entries.into();
        *slot = Some(Arc::clone(&entries));
        Ok(entries)
    }

    /// Profile of one enumerated accelerator.
    pub fn accelerator(&self, backend: &dyn ComputeBackend, id: DeviceId) -> Result<DeviceProfile, DeviceQueryError> {
        self.accelerators(backend)?
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.profile.clone())
            .ok_or_else(|| DeviceQueryError {
                device: id.to_string(),
                capability: Capability::DeviceType,
                detail: "device was not enumerated by the backend".to_string(),
            })
    }
}

/// Compiled programs keyed by device and source name.
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: Mutex<HashMap<(DeviceId, &'static str), ProgramId>>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached program or compiles `source` for `device`.
    pub fn get_or_compile(
        &self,
        backend: &dyn ComputeBackend,
        device: DeviceId,
        source: &KernelSource,
    ) -> Result<ProgramId, KernelCompileError> {
        let mut programs = self.programs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = programs.get(&(device, source.name)) {
            return Ok(*id);
        }
        let id = backend.compile(device, source)?;
        tracing::debug!("compiled '{}' for device {device}", source.name);
        programs.insert((device, source.name), id);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.programs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
