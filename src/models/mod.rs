//! Fitted artifacts and the inference pipeline

pub mod artifacts;
pub mod inference;
pub mod loader;
pub mod onnx;

pub use artifacts::{ArtifactKind, FeatureSelector, LinearRegression, Predictor, Scaler, Selector, StandardScaler};
pub use inference::InferencePipeline;
pub use loader::{ArtifactLoader, LoadedArtifacts};
