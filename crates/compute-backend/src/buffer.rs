// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! RAII device buffer that releases its allocation on drop.
//!
//! A [`DeviceBuffer`] ties a backend allocation to a Rust value, so an
//! early `?` return from a multi-pass dispatch cannot leak device memory.

use crate::{BackendError, BufferId, ComputeBackend, DeviceId};
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;

/// An owned allocation on one device.
pub struct DeviceBuffer {
    backend: Arc<dyn ComputeBackend>,
    device: DeviceId,
    id: BufferId,
    size_bytes: u64,
}

impl DeviceBuffer {
    /// Allocates `size_bytes` on `device`.
    pub fn allocate(
        backend: &Arc<dyn ComputeBackend>,
        device: DeviceId,
        size_bytes: u64,
    ) -> Result<Self, BackendError> {
        let id = backend.allocate_buffer(device, size_bytes)?;
        Ok(Self {
            backend: Arc::clone(backend),
            device,
            id,
            size_bytes,
        })
    }

    /// Allocates a buffer sized for `data` and uploads it.
    pub fn from_slice<T: Pod>(
        backend: &Arc<dyn ComputeBackend>,
        device: DeviceId,
        data: &[T],
    ) -> Result<Self, BackendError> {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let buffer = Self::allocate(backend, device, bytes.len() as u64)?;
        buffer.write(0, data)?;
        Ok(buffer)
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Uploads `data` starting at byte `offset`.
    pub fn write<T: Pod>(&self, offset: u64, data: &[T]) -> Result<(), BackendError> {
        self.backend
            .write_buffer(self.device, self.id, offset, bytemuck::cast_slice(data))
    }

    /// Downloads `count` elements starting at byte `offset`.
    pub fn read<T: Pod + Zeroable>(&self, offset: u64, count: usize) -> Result<Vec<T>, BackendError> {
        let mut out = vec![T::zeroed(); count];
        self.backend
            .read_buffer(self.device, self.id, offset, bytemuck::cast_slice_mut(&mut out))?;
        Ok(out)
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        self.backend.release_buffer(self.device, self.id);
    }
}

impl std::fmt::Debug for DeviceBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("backend", &self.backend.name())
            .field("device", &self.device)
            .field("id", &self.id)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}
