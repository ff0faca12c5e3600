// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for device introspection.

use crate::Capability;

/// An accelerator capability could not be read.
///
/// Accelerators must answer every capability query; unlike the host there
/// is no sensible default to fall back on.
#[derive(Debug, Clone, thiserror::Error)]
#[error("device '{device}' did not report {capability}: {detail}")]
pub struct DeviceQueryError {
    pub device: String,
    pub capability: Capability,
    pub detail: String,
}

/// Errors raised while reading host CPU information.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError {
    /// Failed to read a procfs file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// The file was readable but carried none of the expected fields.
    #[error("no CPU description found in {path}")]
    NotAvailable { path: String },
}
