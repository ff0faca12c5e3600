// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pass planning and work-group sizing for the accelerator workloads.
//!
//! A pass uploads a contiguous run of vertices followed by one pivot vertex:
//! the first vertex of the next pass, or the polygon's first vertex for the
//! final pass. Each uploaded entry but the last starts one edge, so a pass
//! holding `k + 1` entries evaluates `k` edges and no edge is lost at a pass
//! boundary.

use device_profile::DeviceProfile;
use geometry::Point2;

/// One pass over a closed polygon of `n` vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassPlan {
    /// Index of the first vertex in this pass.
    pub start: usize,
    /// Number of edges evaluated.
    pub edges: usize,
    /// Index of the vertex appended after `vertices[start..start + edges]`.
    pub pivot: usize,
}

impl PassPlan {
    /// Entries uploaded for this pass, pivot included.
    pub fn entries(&self) -> usize {
        self.edges + 1
    }

    /// Copies this pass's vertices and pivot out of `vertices`.
    pub fn gather(&self, vertices: &[Point2]) -> Vec<Point2> {
        let mut out = Vec::with_capacity(self.entries());
        out.extend_from_slice(&vertices[self.start..self.start + self.edges]);
        out.push(vertices[self.pivot]);
        out
    }
}

/// Vertices one pass can hold on `profile` after `memory_overhead` bytes.
pub fn pass_capacity(profile: &DeviceProfile, memory_overhead: u64) -> u64 {
    profile.global_memory_bytes.saturating_sub(memory_overhead) / Point2::BYTES as u64
}

/// Splits the `n` edges of a closed polygon into passes of at most
/// `capacity` entries each.
///
/// Returns an empty plan when `n == 0` or `capacity < 2`.
pub fn plan_passes(n: usize, capacity: u64) -> Vec<PassPlan> {
    if n == 0 || capacity < 2 {
        return Vec::new();
    }
    let per_pass = usize::try_from(capacity - 1).unwrap_or(usize::MAX);
    let mut passes = Vec::with_capacity(n.div_ceil(per_pass));
    let mut start = 0;
    while start < n {
        let edges = per_pass.min(n - start);
        passes.push(PassPlan {
            start,
            edges,
            pivot: (start + edges) % n,
        });
        start += edges;
    }
    passes
}

/// Work-group geometry for one kernel launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkShape {
    pub groups: u64,
    pub local_size: u64,
    pub global_size: u64,
}

impl WorkShape {
    /// Spreads `items` work-items across the compute units of `profile`.
    ///
    /// The group size is capped by the device's items-per-unit limit and,
    /// when `scratch_bytes > 0`, by how many scratch slots fit in local
    /// memory. The global size is rounded up to a whole number of groups;
    /// surplus work-items contribute nothing.
    pub fn for_items(profile: &DeviceProfile, items: u64, scratch_bytes: u64) -> Self {
        let items = items.max(1);
        let groups = profile.compute_unit_count.min(items).max(1);
        let mut local_size = items.div_ceil(groups).min(profile.max_items_per_unit);
        if scratch_bytes > 0 {
            local_size = local_size.min(profile.local_memory_bytes / scratch_bytes);
        }
        let local_size = local_size.max(1);
        let groups = items.div_ceil(local_size);
        Self {
            groups,
            local_size,
            global_size: groups * local_size,
        }
    }
}
