//! Request and response types for the revenue predictor

pub mod prediction;
pub mod request;

pub use prediction::{PredictionReply, RevenuePrediction, RevenueTier, TierThresholds};
pub use request::PredictionRequest;
