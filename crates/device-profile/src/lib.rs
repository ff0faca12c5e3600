// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # device-profile
//!
//! Capability snapshots of compute devices.
//!
//! - [`DeviceProfile::host`] reads `/proc/cpuinfo` and degrades gracefully
//!   to defaults, so it works in containers and on non-Linux hosts.
//! - [`DeviceProfile::from_capabilities`] builds an accelerator profile
//!   from a backend's capability queries and fails on the first
//!   unreadable field.

mod cpuinfo;
mod error;
mod profile;

pub use cpuinfo::CpuInfo;
pub use error::{DeviceQueryError, IntrospectionError};
pub use profile::{
    Capability, DeviceClass, DeviceKind, DeviceProfile, DEFAULT_HOST_LOCAL_MEMORY,
    DEVICE_TYPE_CPU, DEVICE_TYPE_GPU, UNKNOWN_IDENTIFIER,
};
