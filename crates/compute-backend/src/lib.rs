// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # compute-backend
//!
//! The accelerator side of polygon dispatch.
//!
//! This crate provides:
//! - [`ComputeBackend`]: object-safe trait over an OpenCL-style runtime.
//! - [`SimulatedBackend`]: a software accelerator that enforces device
//!   limits and runs the shipped kernels with work-group semantics.
//! - [`DeviceBuffer`]: RAII allocation released on drop.
//! - [`DeviceRegistry`] and [`ProgramCache`]: capture device profiles and
//!   compile programs once per context.
//! - [`kernels`]: the OpenCL C sources.

mod backend;
mod buffer;
mod cache;
mod error;
pub mod kernels;
mod simulated;

pub use backend::{BufferId, ComputeBackend, DeviceId, DeviceTarget, KernelArg, ProgramId};
pub use buffer::DeviceBuffer;
pub use cache::{DeviceEntry, DeviceRegistry, ProgramCache};
pub use error::{BackendError, KernelCompileError};
pub use kernels::KernelSource;
pub use simulated::SimulatedBackend;
