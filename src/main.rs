//! Revenue Predictor - Main Entry Point
//!
//! Loads the fitted artifacts once, then answers prediction requests
//! arriving over NATS.

use anyhow::{Context, Result};
use coffee_revenue_pipeline::{
    config::{AppConfig, LoggingConfig},
    consumer::RequestConsumer,
    metrics::{MetricsReporter, PredictionMetrics},
    models::inference::InferencePipeline,
    producer::PredictionProducer,
    service::RevenuePredictor,
    types::prediction::PredictionReply,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: the library and this binary log at
/// the configured level.
fn default_directives(level: &str) -> String {
    format!("coffee_revenue_pipeline={0},revenue_predictor={0}", level)
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(&logging.level))
            .context("Invalid log level")?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/config.toml".to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    init_logging(&config.logging)?;
    info!(config = %config_path, "Starting Revenue Predictor");
    info!(
        "Revenue tiers: excellent > {:.2}, good > {:.2}",
        config.tiers.excellent, config.tiers.good
    );

    // All three artifacts must load before any request is served
    let pipeline = match InferencePipeline::from_config(&config.artifacts) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "Failed to initialize inference pipeline, refusing to start");
            return Err(e.into());
        }
    };
    info!(
        selected_features = ?pipeline.selected_count(),
        "Inference pipeline ready"
    );

    let predictor = Arc::new(RevenuePredictor::new(pipeline, config.tiers.clone()));
    let metrics = Arc::new(PredictionMetrics::new());

    let client = async_nats::connect(&config.nats.url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats.url))?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = RequestConsumer::new(
        client.clone(),
        &config.nats.request_subject,
        config.nats.queue_group.as_deref(),
    );
    let producer = Arc::new(PredictionProducer::new(
        client.clone(),
        &config.nats.prediction_subject,
    ));

    let num_workers = config.pipeline.workers.max(1);
    info!(
        workers = num_workers,
        requests = %consumer.subject(),
        predictions = %producer.subject(),
        "Starting request processing loop"
    );

    let semaphore = Arc::new(Semaphore::new(num_workers));

    let reporter = MetricsReporter::new(metrics.clone(), config.pipeline.metrics_interval_secs);
    tokio::spawn(reporter.start());

    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(error = %e, "Worker semaphore closed");
                break;
            }
        };

        let predictor = predictor.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            let reply = predictor.handle_payload(&message.payload);
            let processing_time = start_time.elapsed();

            match &reply {
                PredictionReply::Predicted(prediction) => {
                    metrics.record_prediction(
                        processing_time,
                        prediction.predicted_revenue,
                        prediction.tier,
                    );
                    info!(
                        request_id = ?prediction.request_id,
                        date = %prediction.date,
                        predicted_revenue = prediction.predicted_revenue,
                        tier = prediction.tier.label(),
                        processing_time_us = processing_time.as_micros(),
                        "Revenue predicted"
                    );
                }
                PredictionReply::Rejected(rejected) => {
                    if rejected.caller_error {
                        metrics.record_rejection();
                        debug!(request_id = ?rejected.request_id, error = %rejected.error, "Request rejected");
                    } else {
                        metrics.record_failure();
                        warn!(request_id = ?rejected.request_id, error = %rejected.error, "Prediction failed");
                    }
                }
            }

            if let Err(e) = producer.publish(&reply, message.reply.clone()).await {
                error!(error = %e, "Failed to publish prediction reply");
            }

            drop(permit);
        });
    }

    info!("Revenue Predictor shutting down...");
    metrics.print_summary();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_binary_target() {
        assert_eq!(module_path!(), "revenue_predictor::tests");

        let directives = default_directives("info");
        assert!(directives.contains("coffee_revenue_pipeline=info"));
        assert!(directives.contains("revenue_predictor=info"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
