//! Configuration management for the revenue predictor

use crate::types::prediction::TierThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub tiers: TierThresholds,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming prediction requests
    pub request_subject: String,
    /// Subject for predictions of requests sent without a reply subject
    pub prediction_subject: String,
    /// Queue group shared by predictor instances
    #[serde(default)]
    pub queue_group: Option<String>,
}

/// Fitted artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the artifact files
    pub dir: String,
    /// Scaler file name (`.json` or `.onnx`)
    #[serde(default = "default_scaler")]
    pub scaler: String,
    /// Feature selector file name
    #[serde(default = "default_selector")]
    pub selector: String,
    /// Regression model file name
    #[serde(default = "default_predictor")]
    pub predictor: String,
    /// Number of threads for ONNX inference per artifact (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Column order the artifacts were fitted with, checked at startup
    #[serde(default)]
    pub feature_order: Option<Vec<String>>,
}

fn default_scaler() -> String {
    "scaler.json".to_string()
}

fn default_selector() -> String {
    "feature_selector.json".to_string()
}

fn default_predictor() -> String {
    "coffee_sales_model.json".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of requests processed concurrently
    pub workers: usize,
    /// Seconds between metrics summaries
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

fn default_metrics_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    ///
    /// `REVENUE__SECTION__KEY` environment variables override file values,
    /// e.g. `REVENUE__ARTIFACTS__DIR=/srv/models`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("REVENUE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "revenue.requests".to_string(),
                prediction_subject: "revenue.predictions".to_string(),
                queue_group: Some("revenue-predictor".to_string()),
            },
            artifacts: ArtifactsConfig {
                dir: "models".to_string(),
                scaler: default_scaler(),
                selector: default_selector(),
                predictor: default_predictor(),
                onnx_threads: 1,
                feature_order: None,
            },
            tiers: TierThresholds::default(),
            pipeline: PipelineConfig {
                workers: 4,
                metrics_interval_secs: default_metrics_interval(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
