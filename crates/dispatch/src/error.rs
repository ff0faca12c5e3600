// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for strategy selection and workload dispatch.

use batch_planner::{BatchTooLarge, LoadError};
use benchmark_corpus::CorpusError;
use compute_backend::{BackendError, KernelCompileError};
use device_profile::DeviceQueryError;

/// Errors from [`crate::StrategySelector::choose`].
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    /// The candidate list was empty.
    #[error("no candidate algorithms were given")]
    NoStrategyAvailable,

    /// No (algorithm, device) pair has a prediction. Recoverable: the
    /// workload falls back to its host implementation.
    #[error("no prediction for any of {candidates:?} on any device")]
    AllPredictionsMissing { candidates: Vec<String> },

    #[error("device query failed: {0}")]
    DeviceQuery(#[from] DeviceQueryError),
}

/// Errors that can occur while dispatching a workload.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("strategy selection failed: {0}")]
    Select(#[from] SelectError),

    #[error("device query failed: {0}")]
    DeviceQuery(#[from] DeviceQueryError),

    #[error("kernel compilation failed: {0}")]
    KernelCompile(#[from] KernelCompileError),

    /// A transfer or kernel dispatch failed. Never retried.
    #[error("device failure: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    BatchTooLarge(#[from] BatchTooLarge),

    #[error("batch load failed: {0}")]
    Load(#[from] LoadError),

    /// Not even one edge plus its pivot fits in device memory.
    #[error("device '{device}' holds {capacity} vertices per pass, at least 2 are needed")]
    DeviceTooSmall { device: String, capacity: u64 },

    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("configuration error: {0}")]
    Config(String),
}
