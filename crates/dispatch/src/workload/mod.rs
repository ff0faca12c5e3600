// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Logical operations and their host/accelerator implementations.
//!
//! Each operation offers a fixed pair of candidates to the
//! [`StrategySelector`] and runs whichever it picks:
//!
//! | Operation    | Host              | Accelerator         |
//! |--------------|-------------------|---------------------|
//! | `area`       | `area_host`       | `area_device`       |
//! | `contains`   | `contains_host`   | `contains_device`   |
//! | `batch_area` | `batch_area_host` | `batch_area_device` |

mod area;
mod batch_area;
mod contains;
pub mod passes;

use crate::{DispatchContext, DispatchError, FallbackPolicy, SelectError, StrategySelector, TargetKind};
use batch_planner::Batch;
use bytemuck::{Pod, Zeroable};
use compute_backend::{BufferId, DeviceBuffer, DeviceId, DeviceTarget, KernelArg, KernelSource};
use geometry::{tally_edges, Area, EdgeInclusion, FillType, Point2, Polygon, SimplePolygon, WindingTally};
use passes::{pass_capacity, plan_passes, PassPlan, WorkShape};
use std::sync::Arc;

pub const AREA_CANDIDATES: [&str; 2] = ["area_host", "area_device"];
pub const CONTAINS_CANDIDATES: [&str; 2] = ["contains_host", "contains_device"];
pub const BATCH_AREA_CANDIDATES: [&str; 2] = ["batch_area_host", "batch_area_device"];

/// Built-in algorithms and the devices they run on.
pub const BUILTIN_ALGORITHMS: [(&str, TargetKind); 6] = [
    ("area_host", TargetKind::Host),
    ("area_device", TargetKind::Accelerator),
    ("contains_host", TargetKind::Host),
    ("contains_device", TargetKind::Accelerator),
    ("batch_area_host", TargetKind::Host),
    ("batch_area_device", TargetKind::Accelerator),
];

/// Runs polygon workloads on whichever implementation is predicted fastest.
pub struct Dispatcher {
    selector: StrategySelector,
}

impl Dispatcher {
    pub fn new(context: Arc<DispatchContext>) -> Self {
        Self::with_selector(StrategySelector::new(context))
    }

    pub fn with_selector(selector: StrategySelector) -> Self {
        Self { selector }
    }

    pub fn context(&self) -> &Arc<DispatchContext> {
        self.selector.context()
    }

    pub fn selector(&self) -> &StrategySelector {
        &self.selector
    }

    /// Signed area of `polygon`: positive when counter-clockwise.
    pub fn area(&self, polygon: &SimplePolygon) -> Result<Area, DispatchError> {
        if polygon.len() < 3 {
            return Ok(polygon.area());
        }
        match self.route(&AREA_CANDIDATES, &[polygon.len() as u64])? {
            DeviceTarget::Host => Ok(polygon.area()),
            DeviceTarget::Accelerator(device) => area::area_device(self.context(), device, polygon.vertices()),
        }
    }

    /// Sum of the signed areas of every boundary.
    pub fn polygon_area(&self, polygon: &Polygon) -> Result<Area, DispatchError> {
        let mut total: Area = 0;
        for boundary in polygon.iter() {
            total = total.saturating_add(self.area(boundary)?);
        }
        Ok(total)
    }

    /// Whether `point` lies inside `polygon` under `fill`, with boundary
    /// points decided by `inclusion`.
    pub fn contains(
        &self,
        polygon: &SimplePolygon,
        point: Point2,
        inclusion: EdgeInclusion,
        fill: FillType,
    ) -> Result<bool, DispatchError> {
        if polygon.len() < 3 {
            return Ok(polygon.contains(point, inclusion, fill));
        }
        match self.route(&CONTAINS_CANDIDATES, &[polygon.len() as u64])? {
            DeviceTarget::Host => Ok(polygon.contains(point, inclusion, fill)),
            DeviceTarget::Accelerator(device) => {
                let tally = contains::tally_device(self.context(), device, polygon.vertices(), point)?;
                Ok(tally.resolve(inclusion, fill))
            }
        }
    }

    /// Containment against an outer boundary and its holes, with winding
    /// numbers summed across boundaries.
    pub fn polygon_contains(
        &self,
        polygon: &Polygon,
        point: Point2,
        inclusion: EdgeInclusion,
        fill: FillType,
    ) -> Result<bool, DispatchError> {
        if let [only] = polygon.boundaries() {
            return self.contains(only, point, inclusion, fill);
        }
        let target = self.route(&CONTAINS_CANDIDATES, &[polygon.vertex_count() as u64])?;
        let mut tally = WindingTally::default();
        for boundary in polygon.iter().filter(|b| !b.is_empty()) {
            let part = match target {
                DeviceTarget::Accelerator(device) if boundary.len() >= 3 => {
                    contains::tally_device(self.context(), device, boundary.vertices(), point)?
                }
                _ => tally_edges(boundary.vertices(), point),
            };
            tally = tally.merge(part);
        }
        Ok(tally.resolve(inclusion, fill))
    }

    /// Signed area of every polygon in `batch`, in input order.
    ///
    /// On an accelerator the batch may be partitioned to fit device memory;
    /// the partition stays on `batch` for later calls.
    pub fn batch_area(&self, batch: &mut Batch<'_>) -> Result<Vec<Area>, DispatchError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        match self.route(&BATCH_AREA_CANDIDATES, &batch.problem_size())? {
            DeviceTarget::Host => Ok(batch_area::batch_area_host(batch)),
            DeviceTarget::Accelerator(device) => {
                match batch_area::batch_area_device(self.context(), device, batch) {
                    Err(DispatchError::BatchTooLarge(e)) => {
                        tracing::warn!("{e}; computing batch areas on the host");
                        Ok(batch_area::batch_area_host(batch))
                    }
                    other => other,
                }
            }
        }
    }

    fn route(&self, candidates: &[&str], problem_size: &[u64]) -> Result<DeviceTarget, DispatchError> {
        match self.selector.choose(candidates, problem_size) {
            Ok(strategy) => Ok(strategy.device),
            Err(SelectError::AllPredictionsMissing { candidates })
                if self.context().fallback() == FallbackPolicy::Host =>
            {
                tracing::warn!("no predictions for {candidates:?}, running on the host");
                Ok(DeviceTarget::Host)
            }
            Err(SelectError::DeviceQuery(e)) => Err(DispatchError::DeviceQuery(e)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Runs a reducing kernel over `vertices` in as many passes as device
/// memory requires and returns every work-group's partial result.
///
/// `args` receives the input buffer, the pass's edge count, the output
/// buffer and the local scratch size in bytes.
fn reduce_in_passes<T: Pod + Zeroable>(
    context: &DispatchContext,
    device: DeviceId,
    source: &KernelSource,
    kernel: &str,
    vertices: &[Point2],
    args: impl Fn(BufferId, u64, BufferId, u64) -> Vec<KernelArg>,
) -> Result<Vec<T>, DispatchError> {
    let profile = context.accelerator(device)?;
    let capacity = pass_capacity(&profile, context.memory_overhead());
    if capacity < 2 {
        return Err(DispatchError::DeviceTooSmall {
            device: profile.identifier,
            capacity,
        });
    }
    let program = context.program(device, source)?;

    let slot = std::mem::size_of::<T>() as u64;
    let passes = plan_passes(vertices.len(), capacity);
    let shapes: Vec<WorkShape> = passes
        .iter()
        .map(|p| WorkShape::for_items(&profile, p.edges as u64, slot))
        .collect();
    let max_entries = passes.iter().map(PassPlan::entries).max().unwrap_or(1) as u64;
    let max_groups = shapes.iter().map(|s| s.groups).max().unwrap_or(1);

    let backend = context.backend();
    let input = DeviceBuffer::allocate(backend, device, max_entries * Point2::BYTES as u64)?;
    let output = DeviceBuffer::allocate(backend, device, max_groups * slot)?;

    let mut partials = Vec::new();
    for (index, (pass, shape)) in passes.iter().zip(&shapes).enumerate() {
        input.write(0, &pass.gather(vertices))?;
        tracing::debug!(
            "{kernel} pass {}/{}: edges {}..{}, {} groups of {}",
            index + 1,
            passes.len(),
            pass.start,
            pass.start + pass.edges,
            shape.groups,
            shape.local_size
        );
        backend.enqueue_kernel(
            device,
            program,
            kernel,
            &args(input.id(), pass.edges as u64, output.id(), shape.local_size * slot),
            shape.global_size,
            shape.local_size,
        )?;
        backend.finish(device)?;
        partials.extend(output.read::<T>(0, shape.groups as usize)?);
    }
    Ok(partials)
}
