// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # batch-planner
//!
//! Partitions collections of polygons into groups that each fit a device
//! memory budget, and uploads them.
//!
//! - [`Batch::ensure_fit`]: greedy, order-preserving, single-pass
//!   partitioning; fails with [`BatchTooLarge`] when one polygon alone is
//!   over budget.
//! - [`Batch::load`] / [`Batch::load_subbatch`]: pivot-terminated upload
//!   into an RAII device buffer.
//! - [`MemoryBudget`]: human-readable sizes (`"64K"`, `"512M"`).

mod batch;
mod budget;
mod error;
mod load;

pub use batch::{Batch, Subbatch};
pub use budget::MemoryBudget;
pub use error::{BatchTooLarge, BudgetError, LoadError};
pub use load::{pack, LoadedBatch, PackedBatch};
