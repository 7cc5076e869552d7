//! Error taxonomy for feature derivation and inference

use crate::models::artifacts::ArtifactKind;
use thiserror::Error;

/// Errors raised while turning a request into a revenue prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The request date is not a valid calendar date
    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    /// The season label is not one of Fall, Spring, Summer, Winter
    #[error("invalid season '{0}': expected one of Fall, Spring, Summer, Winter")]
    InvalidSeason(String),

    /// An operational value lies outside its documented range
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// An artifact could not be read or parsed at startup
    #[error("failed to load {artifact} artifact from {path}: {reason}")]
    ArtifactLoad {
        artifact: ArtifactKind,
        path: String,
        reason: String,
    },

    /// A vector handed to a stage has the wrong number of features
    #[error("shape mismatch at {stage}: expected {expected} features, got {actual}")]
    ShapeMismatch {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The artifacts were fitted against a different column order
    #[error("feature order mismatch at column {index}: artifacts expect '{expected}', record has '{actual}'")]
    FeatureOrderMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    /// An ONNX-backed artifact failed while running
    #[error("{artifact} inference failed: {reason}")]
    Inference {
        artifact: ArtifactKind,
        reason: String,
    },
}

impl PredictError {
    /// Whether the error was caused by the request itself.
    ///
    /// Caller errors reject a single request; everything else is a fault in
    /// the loaded artifacts or the pipeline wiring.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            PredictError::InvalidDate { .. }
                | PredictError::InvalidSeason(_)
                | PredictError::InvalidInput { .. }
        )
    }

    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::InvalidDate { .. } => "invalid_date",
            PredictError::InvalidSeason(_) => "invalid_season",
            PredictError::InvalidInput { .. } => "invalid_input",
            PredictError::ArtifactLoad { .. } => "artifact_load",
            PredictError::ShapeMismatch { .. } => "shape_mismatch",
            PredictError::FeatureOrderMismatch { .. } => "feature_order_mismatch",
            PredictError::Inference { .. } => "inference",
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
