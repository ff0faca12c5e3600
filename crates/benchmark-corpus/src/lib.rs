// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # benchmark-corpus
//!
//! Recorded benchmark timings and the linear runtime predictor fitted from
//! them. The predictor estimates how long an algorithm takes on a device
//! from the device's [`DeviceProfile`](device_profile::DeviceProfile) and
//! the problem size, so the fastest implementation can be chosen without
//! re-benchmarking.

mod corpus;
mod error;
mod feature;

pub use corpus::{BenchmarkCorpus, BenchmarkRecord, PredictorCoefficients};
pub use error::CorpusError;
pub use feature::Feature;
