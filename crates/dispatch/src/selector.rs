// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Chooses an (algorithm, device) pair by predicted run time.
//!
//! Selection never times anything: it evaluates the corpus predictor for
//! every candidate on every eligible device and keeps the fastest. The device
//! set is the context's accelerators in enumeration order followed by the
//! host, so on exact ties the earlier candidate, then the earlier device,
//! wins.

use crate::{DispatchContext, SelectError};
use compute_backend::DeviceTarget;
use device_profile::DeviceProfile;
use std::collections::HashMap;
use std::sync::Arc;

/// Which devices an algorithm can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Host,
    Accelerator,
}

impl TargetKind {
    fn accepts(self, target: DeviceTarget) -> bool {
        match self {
            Self::Host => target.is_host(),
            Self::Accelerator => !target.is_host(),
        }
    }
}

/// A chosen algorithm implementation and the device to run it on.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Strategy {
    pub algorithm: String,
    pub device: DeviceTarget,
    pub predicted_seconds: f64,
}

/// One evaluated (algorithm, device) pair.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Prediction {
    pub algorithm: String,
    pub device: DeviceTarget,
    pub device_identifier: String,
    /// `None` when the corpus has no complete coefficients for the algorithm.
    pub predicted_seconds: Option<f64>,
}

/// Predictor-driven strategy selection.
pub struct StrategySelector {
    context: Arc<DispatchContext>,
    targets: HashMap<String, TargetKind>,
}

impl StrategySelector {
    /// A selector with the built-in workloads registered.
    pub fn new(context: Arc<DispatchContext>) -> Self {
        let mut selector = Self {
            context,
            targets: HashMap::new(),
        };
        for (name, kind) in crate::workload::BUILTIN_ALGORITHMS {
            selector.register(name, kind);
        }
        selector
    }

    pub fn context(&self) -> &Arc<DispatchContext> {
        &self.context
    }

    /// Restricts `algorithm` to devices of `kind`.
    ///
    /// Unregistered algorithms are paired with every device.
    pub fn register(&mut self, algorithm: impl Into<String>, kind: TargetKind) {
        self.targets.insert(algorithm.into(), kind);
    }

    pub fn target_kind(&self, algorithm: &str) -> Option<TargetKind> {
        self.targets.get(algorithm).copied()
    }

    /// Picks the pair with the strictly smallest predicted time.
    pub fn choose(&self, candidates: &[&str], problem_size: &[u64]) -> Result<Strategy, SelectError> {
        if candidates.is_empty() {
            return Err(SelectError::NoStrategyAvailable);
        }

        let mut best: Option<Strategy> = None;
        for prediction in self.predictions(candidates, problem_size)? {
            let Some(seconds) = prediction.predicted_seconds else {
                continue;
            };
            if best.as_ref().map_or(true, |b| seconds < b.predicted_seconds) {
                best = Some(Strategy {
                    algorithm: prediction.algorithm,
                    device: prediction.device,
                    predicted_seconds: seconds,
                });
            }
        }

        match best {
            Some(strategy) => {
                tracing::info!(
                    "selected '{}' on {} ({:.3e} s predicted, size {:?})",
                    strategy.algorithm,
                    strategy.device,
                    strategy.predicted_seconds,
                    problem_size
                );
                Ok(strategy)
            }
            None => Err(SelectError::AllPredictionsMissing {
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    /// Every eligible (algorithm, device) pair in selection order.
    pub fn predictions(&self, candidates: &[&str], problem_size: &[u64]) -> Result<Vec<Prediction>, SelectError> {
        let size = problem_size.first().copied().unwrap_or(0);
        let devices = self.device_set()?;
        let corpus = self.context.corpus();

        let mut out = Vec::with_capacity(candidates.len() * devices.len());
        for &algorithm in candidates {
            let kind = self.target_kind(algorithm);
            for (target, profile) in &devices {
                if kind.is_some_and(|k| !k.accepts(*target)) {
                    continue;
                }
                out.push(Prediction {
                    algorithm: algorithm.to_string(),
                    device: *target,
                    device_identifier: profile.identifier.clone(),
                    predicted_seconds: corpus.predict(algorithm, profile, size),
                });
            }
        }
        Ok(out)
    }

    fn device_set(&self) -> Result<Vec<(DeviceTarget, DeviceProfile)>, SelectError> {
        let accelerators = self.context.accelerators()?;
        let mut devices: Vec<_> = accelerators
            .iter()
            .map(|entry| (DeviceTarget::Accelerator(entry.id), entry.profile.clone()))
            .collect();
        devices.push((DeviceTarget::Host, self.context.host_profile().clone()));
        Ok(devices)
    }
}
