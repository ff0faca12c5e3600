// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Areas of every polygon in a batch, on the host or an accelerator.
//!
//! The device path fits the batch into the device's global memory minus the
//! configured overhead, then uploads either the whole batch or one subbatch
//! at a time. One kernel launch per upload produces a cross-product term for
//! every adjacent pair of packed entries; the host sums each polygon's run of
//! terms. The term that crosses from one polygon's pivot into the next
//! polygon is never read.

use super::passes::WorkShape;
use crate::{DispatchContext, DispatchError};
use batch_planner::{Batch, LoadedBatch};
use compute_backend::{kernels, DeviceBuffer, DeviceId, KernelArg};
use device_profile::DeviceProfile;
use geometry::{halve, Area, Point2};

pub(crate) fn batch_area_host(batch: &Batch<'_>) -> Vec<Area> {
    batch.items().iter().map(|item| item.area()).collect()
}

/// Batch areas on `device`.
///
/// Returns [`DispatchError::BatchTooLarge`] when a single polygon does not
/// fit; the caller decides whether to fall back.
pub(crate) fn batch_area_device(
    context: &DispatchContext,
    device: DeviceId,
    batch: &mut Batch<'_>,
) -> Result<Vec<Area>, DispatchError> {
    let profile = context.accelerator(device)?;
    let budget = planning_budget(
        profile.global_memory_bytes.saturating_sub(context.memory_overhead()),
        batch.unit_size(),
    );
    batch.ensure_fit(budget)?;
    let program = context.program(device, &kernels::BATCH_AREA)?;
    let backend = context.backend();

    let mut areas = Vec::with_capacity(batch.len());
    if batch.is_partitioned() {
        tracing::info!("batch split into {} subbatches for {}", batch.subbatches().len(), profile.identifier);
        for subbatch in batch.subbatches() {
            let loaded = batch.load_subbatch(subbatch, backend, device, context.memory_overhead())?;
            areas.extend(run_loaded(context, device, program, &profile, &loaded)?);
        }
    } else {
        let loaded = batch.load(backend, device, context.memory_overhead())?;
        areas.extend(run_loaded(context, device, program, &profile, &loaded)?);
    }
    Ok(areas)
}

/// The budget to plan against so packed entries fit `device_bytes`.
///
/// Uploads always use [`Point2::BYTES`] per entry; a smaller unit size
/// scales the budget down by the same ratio.
fn planning_budget(device_bytes: u64, unit_size: u64) -> u64 {
    let entry = Point2::BYTES as u64;
    if unit_size >= entry {
        device_bytes
    } else {
        device_bytes / entry * unit_size
    }
}

fn run_loaded(
    context: &DispatchContext,
    device: DeviceId,
    program: compute_backend::ProgramId,
    profile: &DeviceProfile,
    loaded: &LoadedBatch,
) -> Result<Vec<Area>, DispatchError> {
    let term_count = loaded.entry_count().saturating_sub(1);
    if term_count == 0 {
        return Ok(vec![0; loaded.item_count()]);
    }

    let backend = context.backend();
    let terms_buffer = DeviceBuffer::allocate(backend, device, term_count * 8)?;
    let shape = WorkShape::for_items(profile, term_count, 0);
    tracing::debug!(
        "batch_edge_terms: items {:?}, {} terms, {} groups of {}",
        loaded.item_range(),
        term_count,
        shape.groups,
        shape.local_size
    );
    backend.enqueue_kernel(
        device,
        program,
        kernels::BATCH_AREA_KERNEL,
        &[
            KernelArg::Buffer(loaded.buffer().id()),
            KernelArg::U64(loaded.entry_count()),
            KernelArg::Buffer(terms_buffer.id()),
        ],
        shape.global_size,
        shape.local_size,
    )?;
    backend.finish(device)?;
    let terms: Vec<i64> = terms_buffer.read(0, term_count as usize)?;

    Ok(loaded
        .starts()
        .iter()
        .zip(loaded.vertex_counts())
        .map(|(&start, &count)| {
            let start = start as usize;
            let doubled = terms[start..start + count]
                .iter()
                .fold(0i64, |acc, &t| acc.wrapping_add(t));
            halve(doubled as i128)
        })
        .collect())
}
