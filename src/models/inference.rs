//! Scale → select → predict inference pipeline

use crate::config::ArtifactsConfig;
use crate::error::{PredictError, Result};
use crate::feature_extractor::{verify_feature_order, FeatureRecord, FEATURE_COUNT};
use crate::models::artifacts::{check_dim, Predictor, Scaler, Selector};
use crate::models::loader::{ArtifactLoader, LoadedArtifacts};
use tracing::{debug, info};

/// Runs a feature record through the fitted artifacts.
///
/// Stages always run scaler, selector, predictor. The pipeline holds no
/// mutable state and can be shared across threads once constructed.
pub struct InferencePipeline {
    scaler: Box<dyn Scaler>,
    selector: Box<dyn Selector>,
    predictor: Box<dyn Predictor>,
}

impl InferencePipeline {
    /// Assemble a pipeline, checking that the stages fit together.
    pub fn new(
        scaler: Box<dyn Scaler>,
        selector: Box<dyn Selector>,
        predictor: Box<dyn Predictor>,
    ) -> Result<Self> {
        if let Some(inputs) = scaler.input_dim() {
            check_dim("scaler", inputs, FEATURE_COUNT)?;
        }
        if let Some(names) = scaler.feature_names() {
            verify_feature_order(names)?;
        }
        if let (Some(scaled), Some(inputs)) = (scaler.output_dim(), selector.input_dim()) {
            check_dim("selector", inputs, scaled)?;
        }
        if let (Some(selected), Some(inputs)) = (selector.output_dim(), predictor.input_dim()) {
            check_dim("predictor", inputs, selected)?;
        }

        info!(
            features = FEATURE_COUNT,
            selected = ?selector.output_dim(),
            "Inference pipeline initialized"
        );

        Ok(Self {
            scaler,
            selector,
            predictor,
        })
    }

    pub fn from_artifacts(artifacts: LoadedArtifacts) -> Result<Self> {
        Self::new(artifacts.scaler, artifacts.selector, artifacts.predictor)
    }

    /// Load the configured artifacts and build the pipeline.
    ///
    /// A configured feature order is verified before any artifact is read.
    pub fn from_config(config: &ArtifactsConfig) -> Result<Self> {
        if let Some(order) = &config.feature_order {
            verify_feature_order(order.as_slice())?;
        }

        let mut loader = ArtifactLoader::with_threads(config.onnx_threads);
        Self::from_artifacts(loader.load_all(config)?)
    }

    /// Predict revenue for one record
    pub fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        self.predict_vector(&record.to_vector())
    }

    /// Predict revenue for a raw vector already in fitted column order
    pub fn predict_vector(&self, features: &[f64]) -> Result<f64> {
        check_dim("feature record", FEATURE_COUNT, features.len())?;

        let scaled = self.scaler.transform(features)?;
        if let Some(expected) = self.scaler.output_dim() {
            check_dim("scaler output", expected, scaled.len())?;
        }

        let selected = self.selector.transform(&scaled)?;
        if let Some(expected) = self.selector.output_dim() {
            check_dim("selector output", expected, selected.len())?;
        }

        let prediction = self.predictor.predict(&selected)?;

        debug!(
            selected_features = selected.len(),
            prediction = prediction,
            "Revenue inference complete"
        );

        Ok(prediction)
    }

    /// Run inference on a batch of records
    pub fn predict_batch(&self, records: &[FeatureRecord]) -> Vec<Result<f64>> {
        records.iter().map(|r| self.predict(r)).collect()
    }

    /// Number of columns reaching the regression model, when known
    pub fn selected_count(&self) -> Option<usize> {
        self.selector.output_dim()
    }
}

impl std::fmt::Debug for InferencePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferencePipeline")
            .field("scaler_inputs", &self.scaler.input_dim())
            .field("selected", &self.selector.output_dim())
            .field("predictor_inputs", &self.predictor.input_dim())
            .finish()
    }
}

/// Whether an error comes from mis-wired artifacts rather than the request.
pub fn is_contract_violation(error: &PredictError) -> bool {
    matches!(
        error,
        PredictError::ShapeMismatch { .. } | PredictError::FeatureOrderMismatch { .. }
    )
}
