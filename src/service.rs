//! Request handling: validate → derive features → infer → classify

use crate::error::{PredictError, Result};
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::{is_contract_violation, InferencePipeline};
use crate::types::prediction::{PredictionReply, RejectedRequest, RevenuePrediction, TierThresholds};
use crate::types::request::PredictionRequest;
use tracing::{debug, error};

/// Produces revenue predictions from requests.
///
/// Holds only read-only state and is shared between request tasks.
pub struct RevenuePredictor {
    extractor: FeatureExtractor,
    pipeline: InferencePipeline,
    thresholds: TierThresholds,
}

impl RevenuePredictor {
    pub fn new(pipeline: InferencePipeline, thresholds: TierThresholds) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            pipeline,
            thresholds,
        }
    }

    /// Predict revenue for one request
    pub fn predict(&self, request: &PredictionRequest) -> Result<RevenuePrediction> {
        request.validate()?;

        let (calendar, record) = self.extractor.extract(request)?;
        debug!(
            request_id = ?request.request_id,
            features = ?record.named_values(),
            "Feature record assembled"
        );

        let revenue = self.pipeline.predict(&record)?;

        Ok(RevenuePrediction::new(
            request.request_id.clone(),
            &calendar,
            revenue,
            &self.thresholds,
        ))
    }

    /// Decode a JSON request and build the reply to publish.
    ///
    /// Contract violations are logged at error level: they mean the loaded
    /// artifacts do not match the feature record, not that the request was bad.
    pub fn handle_payload(&self, payload: &[u8]) -> PredictionReply {
        let request: PredictionRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(e) => {
                let error = PredictError::InvalidInput {
                    field: "payload",
                    reason: e.to_string(),
                };
                return PredictionReply::Rejected(RejectedRequest::new(None, &error));
            }
        };

        match self.predict(&request) {
            Ok(prediction) => PredictionReply::Predicted(prediction),
            Err(e) => {
                if is_contract_violation(&e) {
                    error!(request_id = ?request.request_id, error = %e, "Feature record does not match artifacts");
                }
                PredictionReply::Rejected(RejectedRequest::new(request.request_id.clone(), &e))
            }
        }
    }

    pub fn thresholds(&self) -> &TierThresholds {
        &self.thresholds
    }

    pub fn pipeline(&self) -> &InferencePipeline {
        &self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_extractor::FEATURE_COUNT;
    use crate::models::artifacts::{FeatureSelector, LinearRegression, StandardScaler};
    use crate::types::prediction::RevenueTier;

    fn summing_predictor() -> RevenuePredictor {
        let pipeline = InferencePipeline::new(
            Box::new(StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT])),
            Box::new(FeatureSelector::passthrough(FEATURE_COUNT)),
            Box::new(LinearRegression::new(vec![1.0; FEATURE_COUNT], 0.0)),
        )
        .unwrap();
        RevenuePredictor::new(pipeline, TierThresholds::default())
    }

    #[test]
    fn test_handle_payload() {
        let payload = br#"{
            "request_id": "req-42",
            "date": "2024-03-15",
            "season": "Spring",
            "temperature_c": 25.0,
            "promotion_active": true,
            "staff_count": 4,
            "num_customers": 150,
            "coffee_sales": 70,
            "pastry_sales": 35,
            "sandwich_sales": 25,
            "customer_satisfaction": 8.5
        }"#;

        match summing_predictor().handle_payload(payload) {
            PredictionReply::Predicted(prediction) => {
                assert_eq!(prediction.request_id.as_deref(), Some("req-42"));
                assert_eq!(prediction.predicted_revenue, 414.5);
                assert_eq!(prediction.tier, RevenueTier::BelowAverage);
                assert_eq!(prediction.day_name, "Friday");
            }
            PredictionReply::Rejected(rejected) => panic!("rejected: {}", rejected.error),
        }
    }

    #[test]
    fn test_rejects_bad_requests() {
        let predictor = summing_predictor();

        match predictor.handle_payload(br#"{"request_id": "r1", "date": "2024-02-30"}"#) {
            PredictionReply::Rejected(rejected) => {
                assert_eq!(rejected.kind, "invalid_date");
                assert_eq!(rejected.request_id.as_deref(), Some("r1"));
            }
            PredictionReply::Predicted(_) => panic!("invalid date accepted"),
        }

        match predictor.handle_payload(br#"{"season": "Monsoon"}"#) {
            PredictionReply::Rejected(rejected) => assert_eq!(rejected.kind, "invalid_season"),
            PredictionReply::Predicted(_) => panic!("invalid season accepted"),
        }

        match predictor.handle_payload(b"not json") {
            PredictionReply::Rejected(rejected) => assert_eq!(rejected.kind, "invalid_input"),
            PredictionReply::Predicted(_) => panic!("garbage accepted"),
        }
    }

    #[test]
    fn test_out_of_range_input_rejected() {
        let mut request = PredictionRequest::new("2024-03-15", "Spring");
        request.staff_count = 25;

        let err = summing_predictor().predict(&request).unwrap_err();
        assert!(err.is_caller_error());
    }
}
