// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for geometry input.

/// Errors raised while reading polygon data.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// The polygon file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The document is not a list of `[x, y]` pairs (or a list of such lists).
    #[error("invalid polygon JSON: {0}")]
    Json(#[from] serde_json::Error),
}
