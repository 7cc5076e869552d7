//! ONNX Runtime backed artifacts

use crate::error::{PredictError, Result};
use crate::models::artifacts::{ArtifactKind, Predictor, Scaler, Selector};
use anyhow::Context;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// A single exported estimator run through ONNX Runtime.
///
/// Any of the three stages can be backed by an ONNX graph: a scaler or
/// selector maps `[1, n]` to `[1, m]`, a regressor maps `[1, n]` to `[1, 1]`.
pub struct OnnxArtifact {
    kind: ArtifactKind,
    /// `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxArtifact {
    /// Load an ONNX graph from file
    pub fn load<P: AsRef<Path>>(path: P, kind: ArtifactKind, onnx_threads: usize) -> anyhow::Result<Self> {
        let path = path.as_ref();

        info!(artifact = %kind, path = %path.display(), threads = onnx_threads, "Loading ONNX artifact");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load ONNX graph from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        info!(
            artifact = %kind,
            input = %input_name,
            output = %output_name,
            "ONNX artifact loaded"
        );

        Ok(Self {
            kind,
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    fn failure(&self, reason: impl std::fmt::Display) -> PredictError {
        PredictError::Inference {
            artifact: self.kind,
            reason: reason.to_string(),
        }
    }

    /// Run the graph on a single row
    fn run(&self, features: &[f64]) -> Result<Vec<f64>> {
        let row: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let shape = vec![1_i64, row.len() as i64];
        let input_tensor = Tensor::from_array((shape, row)).map_err(|e| self.failure(e))?;

        let mut session = self.session.lock().map_err(|e| self.failure(e))?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| self.failure(e))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| self.failure(format!("missing output '{}'", self.output_name)))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| self.failure(e))?;

        debug!(artifact = %self.kind, inputs = features.len(), outputs = data.len(), "ONNX run complete");

        Ok(data.iter().map(|&v| v as f64).collect())
    }
}

impl Scaler for OnnxArtifact {
    fn input_dim(&self) -> Option<usize> {
        None
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.run(features)
    }
}

impl Selector for OnnxArtifact {
    fn input_dim(&self) -> Option<usize> {
        None
    }

    fn output_dim(&self) -> Option<usize> {
        None
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.run(features)
    }
}

impl Predictor for OnnxArtifact {
    fn input_dim(&self) -> Option<usize> {
        None
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        let output = self.run(features)?;
        match output.as_slice() {
            [value] => Ok(*value),
            _ => Err(PredictError::ShapeMismatch {
                stage: "predictor output",
                expected: 1,
                actual: output.len(),
            }),
        }
    }
}
