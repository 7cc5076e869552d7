//! Coffee Shop Revenue Predictor Library
//!
//! Derives calendar features for a date, assembles the 21-column feature
//! record and runs it through a pre-fitted scaler, feature selector and
//! linear regression model to predict daily revenue.

pub mod calendar;
pub mod config;
pub mod consumer;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod service;
pub mod types;

pub use calendar::{CalendarFeatures, Season};
pub use config::AppConfig;
pub use consumer::RequestConsumer;
pub use error::PredictError;
pub use feature_extractor::{FeatureExtractor, FeatureRecord, FEATURE_COUNT, FEATURE_NAMES};
pub use models::inference::InferencePipeline;
pub use producer::PredictionProducer;
pub use service::RevenuePredictor;
pub use types::{
    prediction::{PredictionReply, RevenuePrediction, RevenueTier, TierThresholds},
    request::PredictionRequest,
};
