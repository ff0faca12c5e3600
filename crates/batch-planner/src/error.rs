// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for batch planning and loading.

use compute_backend::BackendError;

/// A single item does not fit the memory budget on its own.
///
/// Items are never split across groups, so no partition exists. The batch
/// is left unpartitioned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("item {item_index} needs {item_bytes} bytes but the budget is {max_memory} bytes")]
pub struct BatchTooLarge {
    pub item_index: usize,
    pub item_bytes: u64,
    pub max_memory: u64,
}

/// Errors that can occur when uploading a batch to a device.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The batch was partitioned; load each subbatch instead.
    #[error("batch is partitioned into {subbatches} subbatches; load them one at a time")]
    Partitioned { subbatches: usize },

    /// The footprint plus the reserved overhead exceeds device memory.
    #[error("batch needs {required} bytes plus {overhead} bytes overhead, device has {available} bytes")]
    InsufficientMemory {
        required: u64,
        overhead: u64,
        available: u64,
    },

    #[error("device error while loading batch: {0}")]
    Backend(#[from] BackendError),
}

/// A memory budget string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BudgetError {
    #[error("memory budget must be non-zero")]
    Zero,

    #[error("invalid budget string '{0}': expected a number followed by an optional suffix (K, M, G)")]
    Invalid(String),

    #[error("budget overflow: '{0}'")]
    Overflow(String),
}
