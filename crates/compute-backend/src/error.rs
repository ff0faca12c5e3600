// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for compute backends.

use crate::{BufferId, DeviceId, ProgramId};
use device_profile::Capability;

/// Failures reported by a [`crate::ComputeBackend`].
///
/// None of these are retried: a failed transfer or dispatch is surfaced to
/// the caller with whatever status the backend gave.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("unknown device {0}")]
    UnknownDevice(DeviceId),

    #[error("capability '{capability}' unavailable on device {device}: {detail}")]
    CapabilityUnavailable {
        device: DeviceId,
        capability: Capability,
        detail: String,
    },

    #[error("buffer {buffer:?} does not exist on device {device}")]
    UnknownBuffer { device: DeviceId, buffer: BufferId },

    #[error("program {program:?} does not exist on device {device}")]
    UnknownProgram { device: DeviceId, program: ProgramId },

    #[error("kernel '{kernel}' is not part of program {program:?}")]
    UnknownKernel { program: ProgramId, kernel: String },

    /// A single allocation larger than the device's global memory, or zero.
    #[error("cannot allocate {requested} bytes on device {device} (limit {limit} bytes)")]
    InvalidAllocation {
        device: DeviceId,
        requested: u64,
        limit: u64,
    },

    #[error("access of {len} bytes at offset {offset} overruns buffer of {size} bytes")]
    OutOfBounds { offset: u64, len: u64, size: u64 },

    #[error("invalid work size for '{kernel}': {detail}")]
    InvalidWorkSize { kernel: String, detail: String },

    #[error("invalid arguments for '{kernel}': {detail}")]
    InvalidArguments { kernel: String, detail: String },

    #[error("local memory request of {requested} bytes exceeds the device limit of {limit} bytes")]
    LocalMemoryExceeded { requested: u64, limit: u64 },

    /// An opaque status code from a hardware backend.
    #[error("backend status {status}: {detail}")]
    Status { status: i32, detail: String },
}

/// A kernel source failed to build. Carries the backend's build log.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to compile '{source_name}' for device {device}:\n{build_log}")]
pub struct KernelCompileError {
    pub device: DeviceId,
    pub source_name: String,
    pub build_log: String,
}
