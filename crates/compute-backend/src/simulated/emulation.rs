// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Software execution of the shipped kernels with work-group semantics.
//!
//! Each work-group is run in turn: every work-item writes its value into a
//! scratch array the size of the group, then the scratch array is reduced
//! with the same power-of-two tree the OpenCL sources use. Per-edge values
//! come from the `geometry` crate so host and device apply identical rules.

use super::BufferTable;
use crate::kernels::{AREA_KERNEL, BATCH_AREA_KERNEL, CONTAINS_KERNEL};
use crate::{BackendError, BufferId, DeviceId, KernelArg};
use geometry::{classify_edge, edge_term_wrapping, Point2};

/// Kernels the simulator knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuiltinKernel {
    AreaReduce,
    WindingReduce,
    BatchEdgeTerms,
}

impl BuiltinKernel {
    pub(crate) fn from_entry_point(name: &str) -> Option<Self> {
        match name {
            AREA_KERNEL => Some(Self::AreaReduce),
            CONTAINS_KERNEL => Some(Self::WindingReduce),
            BATCH_AREA_KERNEL => Some(Self::BatchEdgeTerms),
            _ => None,
        }
    }

    pub(crate) fn entry_point(self) -> &'static str {
        match self {
            Self::AreaReduce => AREA_KERNEL,
            Self::WindingReduce => CONTAINS_KERNEL,
            Self::BatchEdgeTerms => BATCH_AREA_KERNEL,
        }
    }
}

/// One kernel launch.
pub(crate) struct Launch<'a> {
    pub kernel: BuiltinKernel,
    pub device: DeviceId,
    pub args: &'a [KernelArg],
    pub global_size: u64,
    pub local_size: u64,
}

impl Launch<'_> {
    fn invalid(&self, detail: impl Into<String>) -> BackendError {
        BackendError::InvalidArguments {
            kernel: self.kernel.entry_point().to_string(),
            detail: detail.into(),
        }
    }

    fn expect_arity(&self, n: usize) -> Result<(), BackendError> {
        if self.args.len() != n {
            return Err(self.invalid(format!("expected {n} arguments, got {}", self.args.len())));
        }
        Ok(())
    }

    fn buffer(&self, index: usize) -> Result<BufferId, BackendError> {
        match self.args.get(index) {
            Some(KernelArg::Buffer(id)) => Ok(*id),
            other => Err(self.invalid(format!("argument {index} must be a buffer, got {other:?}"))),
        }
    }

    fn scalar(&self, index: usize) -> Result<u64, BackendError> {
        match self.args.get(index) {
            Some(KernelArg::U64(v)) => Ok(*v),
            other => Err(self.invalid(format!("argument {index} must be a ulong, got {other:?}"))),
        }
    }

    fn point(&self, index: usize) -> Result<Point2, BackendError> {
        match self.args.get(index) {
            Some(KernelArg::Point(p)) => Ok(*p),
            other => Err(self.invalid(format!("argument {index} must be an int2, got {other:?}"))),
        }
    }

    /// Checks the local scratch argument holds one `elem_bytes` slot per item.
    fn scratch(&self, index: usize, elem_bytes: u64) -> Result<(), BackendError> {
        match self.args.get(index) {
            Some(KernelArg::Local(bytes)) if *bytes >= self.local_size * elem_bytes => Ok(()),
            Some(KernelArg::Local(bytes)) => Err(self.invalid(format!(
                "local scratch of {bytes} bytes is too small for {} items",
                self.local_size
            ))),
            other => Err(self.invalid(format!("argument {index} must be local memory, got {other:?}"))),
        }
    }

    fn group_count(&self) -> usize {
        (self.global_size / self.local_size) as usize
    }

    fn input_points(&self, buffers: &BufferTable, id: BufferId, count: u64) -> Result<Vec<Point2>, BackendError> {
        let bytes = buffers.bytes(self.device, id)?;
        let needed = count
            .checked_mul(Point2::BYTES as u64)
            .ok_or_else(|| self.invalid("input length overflows"))?;
        if (bytes.len() as u64) < needed {
            return Err(self.invalid(format!(
                "input buffer holds {} bytes, {needed} needed",
                bytes.len()
            )));
        }
        Ok(bytemuck::pod_collect_to_vec(&bytes[..needed as usize]))
    }
}

/// Runs `launch` against the buffer table.
pub(crate) fn execute(launch: &Launch<'_>, buffers: &mut BufferTable) -> Result<(), BackendError> {
    match launch.kernel {
        BuiltinKernel::AreaReduce => area_reduce(launch, buffers),
        BuiltinKernel::WindingReduce => winding_reduce(launch, buffers),
        BuiltinKernel::BatchEdgeTerms => batch_edge_terms(launch, buffers),
    }
}

/// Sums `scratch` into `scratch[0]` with a power-of-two tree.
pub(crate) fn tree_reduce<T: Copy>(scratch: &mut [T], combine: impl Fn(T, T) -> T) {
    let len = scratch.len();
    let mut stride = len.next_power_of_two() / 2;
    while stride > 0 {
        for lid in 0..stride {
            if lid + stride < len {
                scratch[lid] = combine(scratch[lid], scratch[lid + stride]);
            }
        }
        stride /= 2;
    }
}

fn area_reduce(launch: &Launch<'_>, buffers: &mut BufferTable) -> Result<(), BackendError> {
    launch.expect_arity(4)?;
    let input = launch.buffer(0)?;
    let edge_count = launch.scalar(1)?;
    let output = launch.buffer(2)?;
    launch.scratch(3, 8)?;

    let vertices = launch.input_points(buffers, input, edge_count + 1)?;
    let local = launch.local_size as usize;
    let mut partials = Vec::with_capacity(launch.group_count());
    let mut scratch = vec![0i64; local];

    for group in 0..launch.group_count() {
        for (lid, slot) in scratch.iter_mut().enumerate() {
            let gid = group * local + lid;
            *slot = if (gid as u64) < edge_count {
                edge_term_wrapping(vertices[gid], vertices[gid + 1])
            } else {
                0
            };
        }
        tree_reduce(&mut scratch, i64::wrapping_add);
        partials.push(scratch[0]);
    }

    buffers.write(launch.device, output, 0, bytemuck::cast_slice(&partials))
}

fn winding_reduce(launch: &Launch<'_>, buffers: &mut BufferTable) -> Result<(), BackendError> {
    launch.expect_arity(5)?;
    let input = launch.buffer(0)?;
    let edge_count = launch.scalar(1)?;
    let point = launch.point(2)?;
    let output = launch.buffer(3)?;
    launch.scratch(4, 8)?;

    let vertices = launch.input_points(buffers, input, edge_count + 1)?;
    let local = launch.local_size as usize;
    let mut partials: Vec<[i32; 2]> = Vec::with_capacity(launch.group_count());
    let mut scratch = vec![[0i32; 2]; local];

    for group in 0..launch.group_count() {
        for (lid, slot) in scratch.iter_mut().enumerate() {
            let gid = group * local + lid;
            *slot = if (gid as u64) < edge_count {
                let crossing = classify_edge(vertices[gid], vertices[gid + 1], point);
                [crossing.winding_delta(), crossing.is_boundary() as i32]
            } else {
                [0, 0]
            };
        }
        tree_reduce(&mut scratch, |a, b| [a[0] + b[0], a[1] + b[1]]);
        partials.push(scratch[0]);
    }

    buffers.write(launch.device, output, 0, bytemuck::cast_slice(&partials))
}

fn batch_edge_terms(launch: &Launch<'_>, buffers: &mut BufferTable) -> Result<(), BackendError> {
    launch.expect_arity(3)?;
    let input = launch.buffer(0)?;
    let entry_count = launch.scalar(1)?;
    let output = launch.buffer(2)?;

    let entries = launch.input_points(buffers, input, entry_count)?;
    let term_count = (entry_count as usize).saturating_sub(1);
    let terms: Vec<i64> = (0..term_count.min(launch.global_size as usize))
        .map(|gid| edge_term_wrapping(entries[gid], entries[gid + 1]))
        .collect();

    buffers.write(launch.device, output, 0, bytemuck::cast_slice(&terms))
}
