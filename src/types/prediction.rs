//! Revenue prediction results

use crate::calendar::CalendarFeatures;
use crate::error::PredictError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Qualitative revenue tier shown next to the predicted figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevenueTier {
    Excellent,
    Good,
    BelowAverage,
}

impl RevenueTier {
    /// Classify a prediction.
    ///
    /// `> excellent` is Excellent, `(good, excellent]` is Good and anything
    /// at or below `good` (including NaN) is BelowAverage.
    pub fn from_prediction(prediction: f64, thresholds: &TierThresholds) -> Self {
        if prediction > thresholds.excellent {
            RevenueTier::Excellent
        } else if prediction > thresholds.good {
            RevenueTier::Good
        } else {
            RevenueTier::BelowAverage
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RevenueTier::Excellent => "excellent",
            RevenueTier::Good => "good",
            RevenueTier::BelowAverage => "below-average",
        }
    }

    /// Operator advice displayed with the tier
    pub fn advice(&self) -> &'static str {
        match self {
            RevenueTier::Excellent => {
                "This is an excellent revenue day! Consider increasing staff to handle the volume."
            }
            RevenueTier::Good => "This is a good revenue day. Typical performance for your shop.",
            RevenueTier::BelowAverage => {
                "Revenue is below average. Consider promotions or checking operational issues."
            }
        }
    }
}

/// Tier boundaries in currency units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierThresholds {
    pub excellent: f64,
    pub good: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent: 1000.0,
            good: 600.0,
        }
    }
}

/// Format an amount as dollars with thousands separators, e.g. `$1,234.56`
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${}", amount);
    }

    let fixed = format!("{:.2}", amount.abs());
    let (digits, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}

/// Predicted revenue for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePrediction {
    /// Unique prediction identifier
    pub prediction_id: String,

    /// Request correlation identifier, if the caller sent one
    pub request_id: Option<String>,

    pub date: NaiveDate,

    pub day_name: String,

    /// Raw model output, never clamped
    pub predicted_revenue: f64,

    /// Display form of the prediction, e.g. `$1,234.56`
    pub formatted_revenue: String,

    pub tier: RevenueTier,

    pub advice: String,

    pub timestamp: DateTime<Utc>,
}

impl RevenuePrediction {
    pub fn new(
        request_id: Option<String>,
        calendar: &CalendarFeatures,
        predicted_revenue: f64,
        thresholds: &TierThresholds,
    ) -> Self {
        let tier = RevenueTier::from_prediction(predicted_revenue, thresholds);

        Self {
            prediction_id: uuid::Uuid::new_v4().to_string(),
            request_id,
            date: calendar.date,
            day_name: calendar.day_name().to_string(),
            predicted_revenue,
            formatted_revenue: format_currency(predicted_revenue),
            tier,
            advice: tier.advice().to_string(),
            timestamp: Utc::now(),
        }
    }

    /// One-line description, e.g. `March 15, 2024 (Friday): $414.50`
    pub fn headline(&self) -> String {
        format!(
            "{} ({}): {}",
            self.date.format("%B %d, %Y"),
            self.day_name,
            self.formatted_revenue
        )
    }
}

/// A request that could not be turned into a prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRequest {
    pub request_id: Option<String>,
    /// Machine-readable error kind
    pub kind: String,
    pub error: String,
    /// False when the failure lies with the service rather than the request
    pub caller_error: bool,
    pub timestamp: DateTime<Utc>,
}

impl RejectedRequest {
    pub fn new(request_id: Option<String>, error: &PredictError) -> Self {
        Self {
            request_id,
            kind: error.kind().to_string(),
            error: error.to_string(),
            caller_error: error.is_caller_error(),
            timestamp: Utc::now(),
        }
    }
}

/// Reply published for every processed request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PredictionReply {
    Predicted(RevenuePrediction),
    Rejected(RejectedRequest),
}
