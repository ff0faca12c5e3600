// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The benchmark corpus and the runtime predictor.
//!
//! # JSON layout
//!
//! ```json
//! {
//!   "devices":   [ { "identifier": "GeForce GTX 560", "device_kind": "accelerator", ... } ],
//!   "records":   [ { "algorithm": "area_device", "device": "GeForce GTX 560",
//!                    "problem_size": 1000, "elapsed_seconds": 0.0009 } ],
//!   "predictor": { "area_host": { "constant": 5.0e-7, "size": 1.36e-8, ... } }
//! }
//! ```
//!
//! Every section is optional. Weights are fitted offline; loading never
//! re-fits them.

use crate::feature::Feature;
use crate::CorpusError;
use device_profile::DeviceProfile;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// The corpus compiled into the crate.
const EMBEDDED_CORPUS: &str = include_str!("../data/corpus.json");

/// One recorded timing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkRecord {
    pub algorithm: String,
    /// Identifier of the device the timing was taken on.
    pub device: String,
    pub problem_size: u64,
    pub elapsed_seconds: f64,
}

/// Regression weights of one algorithm.
///
/// A missing weight means the algorithm has no model for that feature and
/// therefore yields no prediction at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictorCoefficients {
    weights: [Option<f64>; Feature::COUNT],
}

impl PredictorCoefficients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one weight (builder style).
    pub fn with(mut self, feature: Feature, weight: f64) -> Self {
        self.weights[feature.index()] = Some(weight);
        self
    }

    pub fn get(&self, feature: Feature) -> Option<f64> {
        self.weights[feature.index()]
    }

    /// `true` when every feature has a weight.
    pub fn is_complete(&self) -> bool {
        self.weights.iter().all(Option::is_some)
    }

    /// Predicted seconds, or `None` if any weight is missing.
    pub fn evaluate(&self, profile: &DeviceProfile, size: u64) -> Option<f64> {
        Feature::ALL.iter().try_fold(0.0, |acc, &feature| {
            Some(acc + self.get(feature)? * feature.value(profile, size))
        })
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct CorpusDocument {
    #[serde(default)]
    devices: Vec<DeviceProfile>,
    #[serde(default)]
    records: Vec<BenchmarkRecord>,
    #[serde(default)]
    predictor: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Historical timings plus per-algorithm predictor weights. Read-only once
/// loaded.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkCorpus {
    devices: Vec<DeviceProfile>,
    records: Vec<BenchmarkRecord>,
    predictor: BTreeMap<String, PredictorCoefficients>,
}

impl BenchmarkCorpus {
    /// An empty corpus: every prediction is `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The process-wide corpus parsed from the embedded document.
    ///
    /// Parsed on first call; later calls return the same instance.
    pub fn shared() -> Arc<BenchmarkCorpus> {
        static SHARED: OnceLock<Arc<BenchmarkCorpus>> = OnceLock::new();
        let corpus = SHARED.get_or_init(|| {
            let corpus = Self::embedded().unwrap_or_else(|e| {
                tracing::error!("embedded benchmark corpus is invalid, predictions disabled: {e}");
                Self::empty()
            });
            Arc::new(corpus)
        });
        Arc::clone(corpus)
    }

    /// Parses the embedded document into a fresh corpus.
    pub fn embedded() -> Result<Self, CorpusError> {
        Self::from_json(EMBEDDED_CORPUS)
    }

    /// Reads a corpus JSON file.
    pub fn from_file(path: &Path) -> Result<Self, CorpusError> {
        let content = std::fs::read_to_string(path).map_err(|e| CorpusError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates a corpus document.
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        let doc: CorpusDocument = serde_json::from_str(json)?;

        for record in &doc.records {
            if !record.elapsed_seconds.is_finite() || record.elapsed_seconds < 0.0 {
                return Err(CorpusError::InvalidValue {
                    context: format!(
                        "record {}@{} size {}",
                        record.algorithm, record.device, record.problem_size
                    ),
                    value: record.elapsed_seconds,
                });
            }
        }

        let mut predictor = BTreeMap::new();
        for (algorithm, weights) in doc.predictor {
            let mut coefficients = PredictorCoefficients::new();
            for (name, weight) in weights {
                let feature: Feature = name.parse().map_err(|feature| CorpusError::UnknownFeature {
                    algorithm: algorithm.clone(),
                    feature,
                })?;
                if !weight.is_finite() {
                    return Err(CorpusError::InvalidValue {
                        context: format!("predictor {algorithm}.{name}"),
                        value: weight,
                    });
                }
                coefficients = coefficients.with(feature, weight);
            }
            predictor.insert(algorithm, coefficients);
        }

        tracing::debug!(
            "benchmark corpus: {} devices, {} records, {} predictors",
            doc.devices.len(),
            doc.records.len(),
            predictor.len()
        );

        Ok(Self {
            devices: doc.devices,
            records: doc.records,
            predictor,
        })
    }

    /// Adds or replaces an algorithm's weights (builder style).
    pub fn with_predictor(mut self, algorithm: impl Into<String>, coefficients: PredictorCoefficients) -> Self {
        self.predictor.insert(algorithm.into(), coefficients);
        self
    }

    /// Predicted execution time of `algorithm` on `profile` at `problem_size`.
    ///
    /// Returns `None` when the algorithm is unknown or any of its weights
    /// is missing.
    pub fn predict(&self, algorithm: &str, profile: &DeviceProfile, problem_size: u64) -> Option<f64> {
        self.predictor.get(algorithm)?.evaluate(profile, problem_size)
    }

    pub fn coefficients(&self, algorithm: &str) -> Option<&PredictorCoefficients> {
        self.predictor.get(algorithm)
    }

    /// Algorithms with predictor weights, in name order.
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.predictor.keys().map(String::as_str)
    }

    /// Device specs recorded alongside the timings.
    pub fn devices(&self) -> &[DeviceProfile] {
        &self.devices
    }

    pub fn records(&self) -> &[BenchmarkRecord] {
        &self.records
    }

    /// Records of `algorithm` on `device`, sorted by problem size.
    pub fn records_for(&self, algorithm: &str, device: &str) -> Vec<&BenchmarkRecord> {
        let mut matching: Vec<&BenchmarkRecord> = self
            .records
            .iter()
            .filter(|r| r.algorithm == algorithm && r.device == device)
            .collect();
        matching.sort_by_key(|r| r.problem_size);
        matching
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        format!(
            "{} devices, {} timing records, {} predictors",
            self.devices.len(),
            self.records.len(),
            self.predictor.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpu() -> DeviceProfile {
        DeviceProfile::accelerator("GeForce GTX 560", 7, 1024, 1620, 1 << 30, 49152)
    }

    fn linear(constant: f64, size: f64) -> PredictorCoefficients {
        Feature::ALL
            .iter()
            .fold(PredictorCoefficients::new(), |c, &f| c.with(f, 0.0))
            .with(Feature::Constant, constant)
            .with(Feature::Size, size)
    }

    #[test]
    fn test_embedded_parses() {
        let corpus = BenchmarkCorpus::embedded().unwrap();
        assert_eq!(corpus.devices().len(), 2);
        assert_eq!(corpus.records().len(), 30);
        for name in [
            "area_host",
            "area_device",
            "contains_host",
            "contains_device",
            "batch_area_host",
            "batch_area_device",
        ] {
            assert!(corpus.coefficients(name).unwrap().is_complete(), "{name}");
        }
    }

    #[test]
    fn test_shared_is_singleton() {
        assert!(Arc::ptr_eq(&BenchmarkCorpus::shared(), &BenchmarkCorpus::shared()));
    }

    #[test]
    fn test_predict_linear() {
        let corpus = BenchmarkCorpus::empty().with_predictor("a", linear(1.0, 0.5));
        assert_eq!(corpus.predict("a", &gpu(), 10), Some(6.0));
        assert_eq!(corpus.predict("b", &gpu(), 10), None);
    }

    #[test]
    fn test_predict_missing_weight_is_none() {
        let partial = PredictorCoefficients::new().with(Feature::Constant, 1.0);
        let corpus = BenchmarkCorpus::empty().with_predictor("a", partial);
        assert_eq!(corpus.predict("a", &gpu(), 10), None);
    }

    #[test]
    fn test_unknown_feature_rejected() {
        let json = r#"{ "predictor": { "area_host": { "constant": 1.0, "cache_lines": 2.0 } } }"#;
        let err = BenchmarkCorpus::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            CorpusError::UnknownFeature { ref feature, .. } if feature == "cache_lines"
        ));
    }

    #[test]
    fn test_negative_timing_rejected() {
        let json = r#"{ "records": [ { "algorithm": "a", "device": "d", "problem_size": 1, "elapsed_seconds": -1.0 } ] }"#;
        assert!(matches!(
            BenchmarkCorpus::from_json(json),
            Err(CorpusError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_records_for_sorted() {
        let json = r#"{ "records": [
            { "algorithm": "a", "device": "d", "problem_size": 100, "elapsed_seconds": 2.0 },
            { "algorithm": "a", "device": "e", "problem_size": 5, "elapsed_seconds": 9.0 },
            { "algorithm": "a", "device": "d", "problem_size": 10, "elapsed_seconds": 1.0 }
        ] }"#;
        let corpus = BenchmarkCorpus::from_json(json).unwrap();
        let sizes: Vec<u64> = corpus.records_for("a", "d").iter().map(|r| r.problem_size).collect();
        assert_eq!(sizes, vec![10, 100]);
    }

    #[test]
    fn test_embedded_crossover() {
        let corpus = BenchmarkCorpus::embedded().unwrap();
        let host = DeviceProfile::host_from(&device_profile::CpuInfo::default());
        let small_host = corpus.predict("area_host", &host, 100).unwrap();
        let small_gpu = corpus.predict("area_device", &gpu(), 100).unwrap();
        assert!(small_host < small_gpu);
        let big_host = corpus.predict("area_host", &host, 8_000_000).unwrap();
        let big_gpu = corpus.predict("area_device", &gpu(), 8_000_000).unwrap();
        assert!(big_gpu < big_host);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BenchmarkCorpus::from_file(Path::new("/nonexistent/corpus.json")),
            Err(CorpusError::ReadError { .. })
        ));
    }
}
