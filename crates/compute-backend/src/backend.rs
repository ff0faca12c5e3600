// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The compute backend interface.
//!
//! A [`ComputeBackend`] exposes the primitives an OpenCL-style accelerator
//! runtime offers: device enumeration, capability queries, program
//! compilation, buffers and kernel dispatch. The trait is object-safe and
//! callers hold it as `Arc<dyn ComputeBackend>`.

use crate::kernels::KernelSource;
use crate::{BackendError, KernelCompileError};
use device_profile::Capability;
use geometry::Point2;
use std::fmt;

/// Backend-assigned device handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub u64);

/// Where a workload executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceTarget {
    Host,
    Accelerator(DeviceId),
}

impl DeviceTarget {
    pub fn is_host(&self) -> bool {
        matches!(self, DeviceTarget::Host)
    }
}

impl fmt::Display for DeviceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceTarget::Host => f.write_str("host"),
            DeviceTarget::Accelerator(id) => write!(f, "accelerator {id}"),
        }
    }
}

/// One kernel argument, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelArg {
    Buffer(BufferId),
    U64(u64),
    Point(Point2),
    /// Work-group local scratch of the given size in bytes.
    Local(u64),
}

/// Primitives of an accelerator runtime.
///
/// Calls are blocking from the caller's point of view only at
/// [`ComputeBackend::finish`]; an implementation may execute enqueued work
/// eagerly.
pub trait ComputeBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Devices in a stable enumeration order.
    fn enumerate_devices(&self) -> Vec<DeviceId>;

    fn device_identifier(&self, device: DeviceId) -> Result<String, BackendError>;

    fn query_capability(&self, device: DeviceId, capability: Capability) -> Result<u64, BackendError>;

    /// Builds `source` for `device`. On failure the error carries the build log.
    fn compile(&self, device: DeviceId, source: &KernelSource) -> Result<ProgramId, KernelCompileError>;

    fn allocate_buffer(&self, device: DeviceId, size_bytes: u64) -> Result<BufferId, BackendError>;

    fn write_buffer(&self, device: DeviceId, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), BackendError>;

    fn read_buffer(&self, device: DeviceId, buffer: BufferId, offset: u64, out: &mut [u8]) -> Result<(), BackendError>;

    /// Releases a buffer. Unknown buffers are ignored.
    fn release_buffer(&self, device: DeviceId, buffer: BufferId);

    /// Enqueues `kernel` from `program` over `global_size` work-items in
    /// groups of `local_size`.
    fn enqueue_kernel(
        &self,
        device: DeviceId,
        program: ProgramId,
        kernel: &str,
        args: &[KernelArg],
        global_size: u64,
        local_size: u64,
    ) -> Result<(), BackendError>;

    /// Blocks until all work enqueued on `device` has completed.
    fn finish(&self, device: DeviceId) -> Result<(), BackendError>;
}
