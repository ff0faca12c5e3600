// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # dispatch
//!
//! Runs polygon workloads on the implementation predicted to be fastest.
//!
//! The dispatch layer takes:
//! - A [`compute_backend::ComputeBackend`] exposing zero or more accelerators.
//! - A [`benchmark_corpus::BenchmarkCorpus`] with regression coefficients
//!   per algorithm.
//!
//! And for every call to [`Dispatcher::area`], [`Dispatcher::contains`] or
//! [`Dispatcher::batch_area`] it asks the [`StrategySelector`] for the
//! cheapest (algorithm, device) pair, then runs it. Accelerator runs split
//! large inputs into passes (single polygons) or subbatches (batches) so no
//! upload exceeds device memory.
//!
//! # Shared State
//! Device profiles and compiled programs are cached in a [`DispatchContext`]
//! shared by `Arc`. The first call that needs them fills the cache; later
//! calls reuse it.

mod config;
mod context;
mod error;
mod selector;
pub mod workload;

pub use config::{DispatchConfig, FallbackPolicy};
pub use context::{ContextBuilder, DispatchContext, DEFAULT_MEMORY_OVERHEAD};
pub use error::{DispatchError, SelectError};
pub use selector::{Prediction, Strategy, StrategySelector, TargetKind};
pub use workload::Dispatcher;
