//! End-to-end tests: JSON artifacts on disk → loader → pipeline → prediction
//!
//! Run with: cargo test --test pipeline_tests

use coffee_revenue_pipeline::config::ArtifactsConfig;
use coffee_revenue_pipeline::models::ArtifactKind;
use coffee_revenue_pipeline::{
    InferencePipeline, PredictError, PredictionRequest, RevenuePredictor, RevenueTier,
    TierThresholds, FEATURE_COUNT, FEATURE_NAMES,
};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: serde_json::Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn artifacts_config(dir: &Path) -> ArtifactsConfig {
    ArtifactsConfig {
        dir: dir.display().to_string(),
        scaler: "scaler.json".to_string(),
        selector: "feature_selector.json".to_string(),
        predictor: "coffee_sales_model.json".to_string(),
        onnx_threads: 1,
        feature_order: None,
    }
}

/// Identity scaler, pass-through selector, summing regression
fn write_summing_artifacts(dir: &Path) {
    write_json(
        dir,
        "scaler.json",
        json!({ "mean": vec![0.0; FEATURE_COUNT], "scale": vec![1.0; FEATURE_COUNT] }),
    );
    write_json(
        dir,
        "feature_selector.json",
        json!({ "n_features_in": FEATURE_COUNT, "selected": (0..FEATURE_COUNT).collect::<Vec<_>>() }),
    );
    write_json(
        dir,
        "coffee_sales_model.json",
        json!({ "coef": vec![1.0; FEATURE_COUNT], "intercept": 0.0 }),
    );
}

fn reference_request() -> PredictionRequest {
    let mut request = PredictionRequest::new("2024-03-15", "Spring");
    request.temperature_c = 25.0;
    request.promotion_active = true;
    request.staff_count = 4;
    request.num_customers = 150;
    request.coffee_sales = 70;
    request.pastry_sales = 35;
    request.sandwich_sales = 25;
    request.customer_satisfaction = 8.5;
    request
}

#[test]
fn test_reference_day_with_summing_artifacts() {
    let dir = TempDir::new().unwrap();
    write_summing_artifacts(dir.path());

    let pipeline = InferencePipeline::from_config(&artifacts_config(dir.path())).unwrap();
    let predictor = RevenuePredictor::new(pipeline, TierThresholds::default());

    let prediction = predictor.predict(&reference_request()).unwrap();
    assert_eq!(prediction.predicted_revenue, 414.5);
    assert_eq!(prediction.formatted_revenue, "$414.50");
    assert_eq!(prediction.tier, RevenueTier::BelowAverage);
    assert_eq!(prediction.day_name, "Friday");
}

#[test]
fn test_fitted_style_artifacts() {
    let dir = TempDir::new().unwrap();

    // Centre every column on 1 and halve it, keep customers and coffee sales
    let customers = FEATURE_NAMES.iter().position(|n| *n == "Num_Customers").unwrap();
    let coffee = FEATURE_NAMES.iter().position(|n| *n == "Coffee_Sales").unwrap();
    write_json(
        dir.path(),
        "scaler.json",
        json!({
            "mean": vec![1.0; FEATURE_COUNT],
            "scale": vec![2.0; FEATURE_COUNT],
            "feature_names": FEATURE_NAMES,
        }),
    );
    write_json(
        dir.path(),
        "feature_selector.json",
        json!({ "n_features_in": FEATURE_COUNT, "selected": [customers, coffee] }),
    );
    write_json(
        dir.path(),
        "coffee_sales_model.json",
        json!({ "coef": [4.0, 10.0], "intercept": 100.0 }),
    );

    let mut config = artifacts_config(dir.path());
    config.feature_order = Some(FEATURE_NAMES.iter().map(|n| n.to_string()).collect());

    let pipeline = InferencePipeline::from_config(&config).unwrap();
    assert_eq!(pipeline.selected_count(), Some(2));

    let predictor = RevenuePredictor::new(pipeline, TierThresholds::default());
    let prediction = predictor.predict(&reference_request()).unwrap();

    // 100 + 4 * (150 - 1) / 2 + 10 * (70 - 1) / 2
    assert_eq!(prediction.predicted_revenue, 100.0 + 298.0 + 345.0);
    assert_eq!(prediction.tier, RevenueTier::Good);
}

#[test]
fn test_missing_predictor_fails_startup() {
    let dir = TempDir::new().unwrap();
    write_summing_artifacts(dir.path());
    fs::remove_file(dir.path().join("coffee_sales_model.json")).unwrap();

    let err = InferencePipeline::from_config(&artifacts_config(dir.path())).unwrap_err();
    match err {
        PredictError::ArtifactLoad { artifact, .. } => assert_eq!(artifact, ArtifactKind::Predictor),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_corrupt_scaler_fails_startup() {
    let dir = TempDir::new().unwrap();
    write_summing_artifacts(dir.path());
    fs::write(dir.path().join("scaler.json"), b"\x80\x04\x95 pickled").unwrap();

    let err = InferencePipeline::from_config(&artifacts_config(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        PredictError::ArtifactLoad { artifact: ArtifactKind::Scaler, .. }
    ));
}

#[test]
fn test_selector_wider_than_model_fails_startup() {
    let dir = TempDir::new().unwrap();
    write_summing_artifacts(dir.path());
    write_json(
        dir.path(),
        "coffee_sales_model.json",
        json!({ "coef": [1.0, 2.0, 3.0], "intercept": 0.0 }),
    );

    let err = InferencePipeline::from_config(&artifacts_config(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        PredictError::ShapeMismatch { stage: "predictor", expected: 3, actual: 21 }
    ));
}

#[test]
fn test_configured_feature_order_is_verified() {
    let dir = TempDir::new().unwrap();
    write_summing_artifacts(dir.path());

    let mut order: Vec<String> = FEATURE_NAMES.iter().map(|n| n.to_string()).collect();
    order.swap(19, 20);
    let mut config = artifacts_config(dir.path());
    config.feature_order = Some(order);

    let err = InferencePipeline::from_config(&config).unwrap_err();
    assert!(matches!(err, PredictError::FeatureOrderMismatch { index: 19, .. }));
}
