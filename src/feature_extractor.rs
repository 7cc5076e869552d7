//! Feature assembly for revenue model inference.
//!
//! Builds the 21-column record the scaler, selector and regression model
//! were fitted on. Column order is positional and must match [`FEATURE_NAMES`].

use crate::calendar::CalendarFeatures;
use crate::error::{PredictError, Result};
use crate::types::request::PredictionRequest;
use serde::Serialize;

pub const FEATURE_COUNT: usize = 21;

/// Column names in the order the artifacts were fitted with.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Day_of_Week",
    "Is_Weekend",
    "Month",
    "Temperature_C",
    "Is_Raining",
    "Rainfall_mm",
    "Is_Holiday",
    "Promotion_Active",
    "Nearby_Events",
    "Staff_Count",
    "Machine_Issues",
    "Num_Customers",
    "Coffee_Sales",
    "Pastry_Sales",
    "Sandwich_Sales",
    "Customer_Satisfaction",
    "Day_of_Year",
    "Week_of_Year",
    "Quarter",
    "Day_Name_Encoded",
    "Season_Encoded",
];

/// One fully populated model input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub day_of_week: u32,
    pub is_weekend: u8,
    pub month: u32,
    pub temperature_c: f64,
    pub is_raining: u8,
    pub rainfall_mm: f64,
    pub is_holiday: u8,
    pub promotion_active: u8,
    pub nearby_events: u8,
    pub staff_count: u32,
    pub machine_issues: u8,
    pub num_customers: u32,
    pub coffee_sales: u32,
    pub pastry_sales: u32,
    pub sandwich_sales: u32,
    pub customer_satisfaction: f64,
    pub day_of_year: u32,
    pub week_of_year: u32,
    pub quarter: u32,
    pub day_name_encoded: u8,
    pub season_encoded: u8,
}

impl FeatureRecord {
    /// Merge derived calendar fields with the operator-supplied values.
    pub fn new(calendar: &CalendarFeatures, request: &PredictionRequest) -> Self {
        Self {
            day_of_week: calendar.day_of_week,
            is_weekend: calendar.is_weekend,
            month: calendar.month,
            temperature_c: request.temperature_c,
            is_raining: u8::from(request.is_raining),
            rainfall_mm: if request.is_raining {
                request.rainfall_mm
            } else {
                0.0
            },
            is_holiday: u8::from(request.is_holiday),
            promotion_active: u8::from(request.promotion_active),
            nearby_events: u8::from(request.nearby_events),
            staff_count: request.staff_count,
            machine_issues: u8::from(request.machine_issues),
            num_customers: request.num_customers,
            coffee_sales: request.coffee_sales,
            pastry_sales: request.pastry_sales,
            sandwich_sales: request.sandwich_sales,
            customer_satisfaction: request.customer_satisfaction,
            day_of_year: calendar.day_of_year,
            week_of_year: calendar.week_of_year,
            quarter: calendar.quarter,
            day_name_encoded: calendar.day_name_encoded,
            season_encoded: calendar.season_encoded,
        }
    }

    /// Serialize in [`FEATURE_NAMES`] order.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.day_of_week as f64,
            self.is_weekend as f64,
            self.month as f64,
            self.temperature_c,
            self.is_raining as f64,
            self.rainfall_mm,
            self.is_holiday as f64,
            self.promotion_active as f64,
            self.nearby_events as f64,
            self.staff_count as f64,
            self.machine_issues as f64,
            self.num_customers as f64,
            self.coffee_sales as f64,
            self.pastry_sales as f64,
            self.sandwich_sales as f64,
            self.customer_satisfaction,
            self.day_of_year as f64,
            self.week_of_year as f64,
            self.quarter as f64,
            self.day_name_encoded as f64,
            self.season_encoded as f64,
        ]
    }

    /// Column name / value pairs, for logging
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.to_vector()).collect()
    }
}

/// Check a declared column order against [`FEATURE_NAMES`].
pub fn verify_feature_order<S: AsRef<str>>(expected: &[S]) -> Result<()> {
    if expected.len() != FEATURE_COUNT {
        return Err(PredictError::ShapeMismatch {
            stage: "feature order",
            expected: expected.len(),
            actual: FEATURE_COUNT,
        });
    }

    for (index, (want, have)) in expected.iter().zip(FEATURE_NAMES).enumerate() {
        if want.as_ref() != have {
            return Err(PredictError::FeatureOrderMismatch {
                index,
                expected: want.as_ref().to_string(),
                actual: have.to_string(),
            });
        }
    }
    Ok(())
}

/// Turns prediction requests into feature records.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Derive calendar fields and assemble the full record.
    ///
    /// Returns the calendar features alongside the record so callers can
    /// report the day name and date summary.
    pub fn extract(&self, request: &PredictionRequest) -> Result<(CalendarFeatures, FeatureRecord)> {
        let calendar = CalendarFeatures::parse(&request.date, &request.season)?;
        let record = FeatureRecord::new(&calendar, request);
        Ok((calendar, record))
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_request() -> PredictionRequest {
        PredictionRequest {
            request_id: None,
            date: "2024-03-15".to_string(),
            season: "Spring".to_string(),
            temperature_c: 25.0,
            is_raining: false,
            rainfall_mm: 0.0,
            is_holiday: false,
            promotion_active: true,
            nearby_events: false,
            staff_count: 4,
            machine_issues: false,
            num_customers: 150,
            coffee_sales: 70,
            pastry_sales: 35,
            sandwich_sales: 25,
            customer_satisfaction: 8.5,
        }
    }

    fn position(name: &str) -> usize {
        FEATURE_NAMES.iter().position(|n| *n == name).unwrap()
    }

    #[test]
    fn test_vector_order() {
        let (_, record) = FeatureExtractor::new().extract(&reference_request()).unwrap();
        let vector = record.to_vector();

        assert_eq!(vector.len(), FEATURE_COUNT);
        assert_eq!(vector[position("Day_of_Week")], 5.0);
        assert_eq!(vector[position("Month")], 3.0);
        assert_eq!(vector[position("Temperature_C")], 25.0);
        assert_eq!(vector[position("Promotion_Active")], 1.0);
        assert_eq!(vector[position("Staff_Count")], 4.0);
        assert_eq!(vector[position("Num_Customers")], 150.0);
        assert_eq!(vector[position("Coffee_Sales")], 70.0);
        assert_eq!(vector[position("Pastry_Sales")], 35.0);
        assert_eq!(vector[position("Sandwich_Sales")], 25.0);
        assert_eq!(vector[position("Customer_Satisfaction")], 8.5);
        assert_eq!(vector[position("Day_of_Year")], 75.0);
        assert_eq!(vector[position("Week_of_Year")], 11.0);
        assert_eq!(vector[position("Quarter")], 1.0);
        assert_eq!(vector[position("Day_Name_Encoded")], 0.0);
        assert_eq!(vector[20], 1.0); // Season_Encoded
    }

    #[test]
    fn test_rainfall_zeroed_when_dry() {
        let mut request = reference_request();
        request.rainfall_mm = 12.5;

        let (_, dry) = FeatureExtractor::new().extract(&request).unwrap();
        assert_eq!(dry.rainfall_mm, 0.0);
        assert_eq!(dry.is_raining, 0);

        request.is_raining = true;
        let (_, wet) = FeatureExtractor::new().extract(&request).unwrap();
        assert_eq!(wet.rainfall_mm, 12.5);
        assert_eq!(wet.is_raining, 1);
    }

    #[test]
    fn test_extract_rejects_bad_season() {
        let mut request = reference_request();
        request.season = "Monsoon".to_string();

        let err = FeatureExtractor::new().extract(&request).unwrap_err();
        assert!(matches!(err, PredictError::InvalidSeason(_)));
    }

    #[test]
    fn test_verify_feature_order() {
        assert!(verify_feature_order(&FEATURE_NAMES).is_ok());

        let mut swapped = FEATURE_NAMES;
        swapped.swap(3, 5);
        let err = verify_feature_order(&swapped).unwrap_err();
        assert!(matches!(err, PredictError::FeatureOrderMismatch { index: 3, .. }));

        let short = &FEATURE_NAMES[..20];
        assert!(matches!(
            verify_feature_order(short),
            Err(PredictError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_named_values() {
        let extractor = FeatureExtractor::new();
        let (_, record) = extractor.extract(&reference_request()).unwrap();
        let named = record.named_values();

        assert_eq!(named.len(), extractor.feature_count());
        assert_eq!(named[0], ("Day_of_Week", 5.0));
        assert_eq!(named[20], ("Season_Encoded", 1.0));
    }
}
