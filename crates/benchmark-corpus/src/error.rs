// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for corpus loading.

/// Errors that can occur when loading a benchmark corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// The corpus file could not be read.
    #[error("failed to read corpus {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// The corpus JSON is malformed.
    #[error("failed to parse corpus: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A predictor names a feature the model does not know.
    #[error("predictor '{algorithm}' uses unknown feature '{feature}'")]
    UnknownFeature { algorithm: String, feature: String },

    /// A weight or timing is NaN, infinite, or a negative duration.
    #[error("invalid value {value} in {context}")]
    InvalidValue { context: String, value: f64 },
}
