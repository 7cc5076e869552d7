//! Pre-fitted preprocessing and regression artifacts.
//!
//! The three stages are traits so the pipeline can run against the native
//! JSON exports below, ONNX exports, or test doubles.

use crate::error::{PredictError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the three artifacts a value or error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Scaler,
    Selector,
    Predictor,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Selector => "selector",
            ArtifactKind::Predictor => "predictor",
        })
    }
}

/// Normalizes raw feature magnitudes with parameters fixed at training time.
pub trait Scaler: Send + Sync {
    /// Number of input features, when the artifact declares it
    fn input_dim(&self) -> Option<usize>;

    fn output_dim(&self) -> Option<usize> {
        self.input_dim()
    }

    /// Column names the scaler was fitted on, when recorded
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// Projects a scaled vector onto the columns chosen at training time.
pub trait Selector: Send + Sync {
    fn input_dim(&self) -> Option<usize>;

    fn output_dim(&self) -> Option<usize>;

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// Produces the scalar revenue estimate.
pub trait Predictor: Send + Sync {
    fn input_dim(&self) -> Option<usize>;

    fn predict(&self, features: &[f64]) -> Result<f64>;
}

pub(crate) fn check_dim(stage: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(PredictError::ShapeMismatch {
            stage,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Standardization with per-column mean and scale: `(x - mean) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            mean,
            scale,
            feature_names: None,
        }
    }

    /// Check internal consistency of a deserialized scaler.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} columns but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(format!(
                    "{} feature names for {} columns",
                    names.len(),
                    self.mean.len()
                ));
            }
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("mean and scale must be finite".to_string());
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn input_dim(&self) -> Option<usize> {
        Some(self.mean.len())
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_dim("scaler", self.mean.len(), features.len())?;

        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&x, (&mean, &scale))| {
                // Zero-variance columns were fitted with unit scale
                let scale = if scale == 0.0 { 1.0 } else { scale };
                (x - mean) / scale
            })
            .collect())
    }
}

/// Column projection onto a fixed, ascending set of indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSelector {
    pub n_features_in: usize,
    pub selected: Vec<usize>,
}

impl FeatureSelector {
    pub fn new(n_features_in: usize, selected: Vec<usize>) -> Self {
        Self {
            n_features_in,
            selected,
        }
    }

    /// Selector that keeps every column
    pub fn passthrough(n_features_in: usize) -> Self {
        Self::new(n_features_in, (0..n_features_in).collect())
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.selected.is_empty() {
            return Err("no columns selected".to_string());
        }
        if let Some(&index) = self.selected.iter().find(|&&i| i >= self.n_features_in) {
            return Err(format!(
                "selected column {} is out of range for {} inputs",
                index, self.n_features_in
            ));
        }
        if self.selected.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err("selected columns must be strictly ascending".to_string());
        }
        Ok(())
    }
}

impl Selector for FeatureSelector {
    fn input_dim(&self) -> Option<usize> {
        Some(self.n_features_in)
    }

    fn output_dim(&self) -> Option<usize> {
        Some(self.selected.len())
    }

    fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_dim("selector", self.n_features_in, features.len())?;
        Ok(self.selected.iter().map(|&i| features[i]).collect())
    }
}

/// Ordinary least squares model: `intercept + Σ coef[i] * x[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.coef.is_empty() {
            return Err("model has no coefficients".to_string());
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err("coefficients must be finite".to_string());
        }
        Ok(())
    }
}

impl Predictor for LinearRegression {
    fn input_dim(&self) -> Option<usize> {
        Some(self.coef.len())
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_dim("predictor", self.coef.len(), features.len())?;

        Ok(self.intercept
            + features
                .iter()
                .zip(&self.coef)
                .map(|(x, c)| x * c)
                .sum::<f64>())
    }
}
