//! Artifact loader.
//!
//! Reads the scaler, selector and regression model once at startup.
//! `.onnx` files go through ONNX Runtime; anything else is read as the
//! JSON export of the fitted estimator.

use crate::config::ArtifactsConfig;
use crate::error::{PredictError, Result};
use crate::models::artifacts::{
    ArtifactKind, FeatureSelector, LinearRegression, Predictor, Scaler, Selector, StandardScaler,
};
use crate::models::onnx::OnnxArtifact;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;

/// The three fitted artifacts, loaded and ready to share
pub struct LoadedArtifacts {
    pub scaler: Box<dyn Scaler>,
    pub selector: Box<dyn Selector>,
    pub predictor: Box<dyn Predictor>,
}

/// Loader for fitted artifacts
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
    onnx_initialized: bool,
}

impl ArtifactLoader {
    /// Create a loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
            onnx_initialized: false,
        }
    }

    /// Load all three artifacts named in the configuration.
    ///
    /// Fails on the first artifact that cannot be loaded; there is no
    /// partial result.
    pub fn load_all(&mut self, config: &ArtifactsConfig) -> Result<LoadedArtifacts> {
        let dir = Path::new(&config.dir);

        let scaler = self.load_scaler(dir.join(&config.scaler))?;
        let selector = self.load_selector(dir.join(&config.selector))?;
        let predictor = self.load_predictor(dir.join(&config.predictor))?;

        info!(dir = %dir.display(), "Loaded scaler, selector and predictor");

        Ok(LoadedArtifacts {
            scaler,
            selector,
            predictor,
        })
    }

    pub fn load_scaler<P: AsRef<Path>>(&mut self, path: P) -> Result<Box<dyn Scaler>> {
        let path = path.as_ref();
        if is_onnx(path) {
            return Ok(Box::new(self.load_onnx(path, ArtifactKind::Scaler)?));
        }

        let scaler: StandardScaler = read_json(path, ArtifactKind::Scaler)?;
        scaler
            .validate()
            .map_err(|reason| load_error(ArtifactKind::Scaler, path, reason))?;

        info!(path = %path.display(), columns = scaler.mean.len(), "Scaler loaded");
        Ok(Box::new(scaler))
    }

    pub fn load_selector<P: AsRef<Path>>(&mut self, path: P) -> Result<Box<dyn Selector>> {
        let path = path.as_ref();
        if is_onnx(path) {
            return Ok(Box::new(self.load_onnx(path, ArtifactKind::Selector)?));
        }

        let selector: FeatureSelector = read_json(path, ArtifactKind::Selector)?;
        selector
            .validate()
            .map_err(|reason| load_error(ArtifactKind::Selector, path, reason))?;

        info!(
            path = %path.display(),
            inputs = selector.n_features_in,
            selected = ?selector.selected,
            "Selector loaded"
        );
        Ok(Box::new(selector))
    }

    pub fn load_predictor<P: AsRef<Path>>(&mut self, path: P) -> Result<Box<dyn Predictor>> {
        let path = path.as_ref();
        if is_onnx(path) {
            return Ok(Box::new(self.load_onnx(path, ArtifactKind::Predictor)?));
        }

        let model: LinearRegression = read_json(path, ArtifactKind::Predictor)?;
        model
            .validate()
            .map_err(|reason| load_error(ArtifactKind::Predictor, path, reason))?;

        info!(
            path = %path.display(),
            coefficients = model.coef.len(),
            intercept = model.intercept,
            "Predictor loaded"
        );
        Ok(Box::new(model))
    }

    fn load_onnx(&mut self, path: &Path, kind: ArtifactKind) -> Result<OnnxArtifact> {
        if !self.onnx_initialized {
            ort::init()
                .commit()
                .map_err(|e| load_error(kind, path, e))?;
            info!(onnx_threads = self.onnx_threads, "ONNX Runtime initialized");
            self.onnx_initialized = true;
        }

        OnnxArtifact::load(path, kind, self.onnx_threads)
            .map_err(|e| load_error(kind, path, format!("{:#}", e)))
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_onnx(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
}

fn load_error(artifact: ArtifactKind, path: &Path, reason: impl ToString) -> PredictError {
    PredictError::ArtifactLoad {
        artifact,
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, artifact: ArtifactKind) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| load_error(artifact, path, e))?;
    serde_json::from_str(&text).map_err(|e| load_error(artifact, path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_names_kind() {
        let mut loader = ArtifactLoader::new();
        let err = loader
            .load_selector("does/not/exist/feature_selector.json")
            .err()
            .unwrap();

        match err {
            PredictError::ArtifactLoad { artifact, path, .. } => {
                assert_eq!(artifact, ArtifactKind::Selector);
                assert!(path.ends_with("feature_selector.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_onnx_extension() {
        assert!(is_onnx(Path::new("models/coffee_sales_model.onnx")));
        assert!(is_onnx(Path::new("models/SCALER.ONNX")));
        assert!(!is_onnx(Path::new("models/scaler.json")));
        assert!(!is_onnx(Path::new("models/scaler")));
    }
}
