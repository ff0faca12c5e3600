// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Uploading batches to a device.
//!
//! The packed layout stores each polygon's vertices followed by a pivot
//! entry (a copy of its first vertex), so polygon `i` occupies entries
//! `starts[i] ..= starts[i] + len_i` and its closing edge is the ordinary
//! pair ending at the pivot. Empty polygons still take one entry.

use crate::{Batch, LoadError, Subbatch};
use compute_backend::{ComputeBackend, DeviceBuffer, DeviceId};
use device_profile::Capability;
use geometry::{Point2, SimplePolygon};
use std::ops::Range;
use std::sync::Arc;

/// Host-side packed entries and per-polygon start offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBatch {
    pub entries: Vec<Point2>,
    pub starts: Vec<u64>,
}

/// Packs `items` into the pivot-terminated layout.
pub fn pack(items: &[SimplePolygon]) -> PackedBatch {
    let total: usize = items.iter().map(|p| p.len() + 1).sum();
    let mut entries = Vec::with_capacity(total);
    let mut starts = Vec::with_capacity(items.len());
    for item in items {
        starts.push(entries.len() as u64);
        entries.extend_from_slice(item.vertices());
        entries.push(item.first().unwrap_or_default());
    }
    PackedBatch { entries, starts }
}

/// A batch (or subbatch) resident on a device.
///
/// The device buffer is released when this value is dropped.
#[derive(Debug)]
pub struct LoadedBatch {
    buffer: DeviceBuffer,
    starts: Vec<u64>,
    vertex_counts: Vec<usize>,
    entry_count: u64,
    items: Range<usize>,
}

impl LoadedBatch {
    pub fn buffer(&self) -> &DeviceBuffer {
        &self.buffer
    }

    /// Entry offset of each loaded polygon.
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    pub fn vertex_counts(&self) -> &[usize] {
        &self.vertex_counts
    }

    /// Number of packed entries, pivots included.
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Indices of the loaded polygons in the parent batch.
    pub fn item_range(&self) -> Range<usize> {
        self.items.clone()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl Batch<'_> {
    /// Uploads the whole batch to `device`.
    ///
    /// Fails with [`LoadError::Partitioned`] if the batch has a partition,
    /// and with [`LoadError::InsufficientMemory`] if its footprint (or the
    /// packed entry bytes, whichever is larger) plus `memory_overhead`
    /// exceeds the device's global memory.
    pub fn load(
        &self,
        backend: &Arc<dyn ComputeBackend>,
        device: DeviceId,
        memory_overhead: u64,
    ) -> Result<LoadedBatch, LoadError> {
        if self.is_partitioned() {
            return Err(LoadError::Partitioned {
                subbatches: self.subbatches().len(),
            });
        }
        upload(backend, device, self.items(), 0..self.len(), self.footprint(), memory_overhead)
    }

    /// Uploads one subbatch to `device`.
    pub fn load_subbatch(
        &self,
        subbatch: &Subbatch,
        backend: &Arc<dyn ComputeBackend>,
        device: DeviceId,
        memory_overhead: u64,
    ) -> Result<LoadedBatch, LoadError> {
        upload(
            backend,
            device,
            self.items_of(subbatch),
            subbatch.range(),
            subbatch.footprint_bytes(),
            memory_overhead,
        )
    }
}

fn upload(
    backend: &Arc<dyn ComputeBackend>,
    device: DeviceId,
    items: &[SimplePolygon],
    range: Range<usize>,
    footprint: u64,
    memory_overhead: u64,
) -> Result<LoadedBatch, LoadError> {
    let packed = pack(items);
    let packed_bytes = (packed.entries.len() as u64).saturating_mul(Point2::BYTES as u64);
    let required = footprint.max(packed_bytes);

    let available = backend.query_capability(device, Capability::GlobalMemory)?;
    if required.saturating_add(memory_overhead) > available {
        return Err(LoadError::InsufficientMemory {
            required,
            overhead: memory_overhead,
            available,
        });
    }

    let buffer = DeviceBuffer::from_slice(backend, device, &packed.entries)?;
    tracing::debug!(
        "loaded items {range:?} ({} entries) onto device {device}",
        packed.entries.len()
    );

    Ok(LoadedBatch {
        buffer,
        entry_count: packed.entries.len() as u64,
        starts: packed.starts,
        vertex_counts: items.iter().map(SimplePolygon::len).collect(),
        items: range,
    })
}
