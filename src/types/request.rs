//! Prediction request submitted by a shop operator

use crate::error::{PredictError, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

/// Operational details for one day.
///
/// Field defaults match the values pre-filled on the entry form, so a
/// request only has to carry what differs from a typical day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Caller-supplied correlation identifier
    #[serde(default)]
    pub request_id: Option<String>,

    /// Prediction date as `YYYY-MM-DD`
    #[serde(default = "default_date")]
    pub date: String,

    /// Season label (Fall, Spring, Summer, Winter)
    #[serde(default = "default_season")]
    pub season: String,

    /// Temperature in °C
    #[serde(default = "default_temperature", alias = "Temperature_C")]
    pub temperature_c: f64,

    #[serde(default, alias = "Is_Raining")]
    pub is_raining: bool,

    /// Rainfall in mm, ignored when it is not raining
    #[serde(default = "default_rainfall", alias = "Rainfall_mm")]
    pub rainfall_mm: f64,

    #[serde(default, alias = "Is_Holiday")]
    pub is_holiday: bool,

    #[serde(default, alias = "Promotion_Active")]
    pub promotion_active: bool,

    #[serde(default, alias = "Nearby_Events")]
    pub nearby_events: bool,

    #[serde(default = "default_staff_count", alias = "Staff_Count")]
    pub staff_count: u32,

    #[serde(default, alias = "Machine_Issues")]
    pub machine_issues: bool,

    #[serde(default = "default_num_customers", alias = "Num_Customers")]
    pub num_customers: u32,

    /// Satisfaction score on a 1-10 scale
    #[serde(default = "default_satisfaction", alias = "Customer_Satisfaction")]
    pub customer_satisfaction: f64,

    /// Coffee units sold
    #[serde(default = "default_coffee_sales", alias = "Coffee_Sales")]
    pub coffee_sales: u32,

    /// Pastry units sold
    #[serde(default = "default_pastry_sales", alias = "Pastry_Sales")]
    pub pastry_sales: u32,

    /// Sandwich units sold
    #[serde(default = "default_sandwich_sales", alias = "Sandwich_Sales")]
    pub sandwich_sales: u32,
}

fn default_date() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn default_season() -> String {
    "Fall".to_string()
}

fn default_temperature() -> f64 {
    25.0
}

fn default_rainfall() -> f64 {
    5.0
}

fn default_staff_count() -> u32 {
    3
}

fn default_num_customers() -> u32 {
    120
}

fn default_satisfaction() -> f64 {
    8.0
}

fn default_coffee_sales() -> u32 {
    60
}

fn default_pastry_sales() -> u32 {
    30
}

fn default_sandwich_sales() -> u32 {
    20
}

impl PredictionRequest {
    /// Create a request for a date and season with all other values defaulted
    pub fn new(date: impl Into<String>, season: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            season: season.into(),
            ..Self::default()
        }
    }

    /// Check operational values against the ranges offered by the entry form.
    pub fn validate(&self) -> Result<()> {
        check_range("temperature_c", self.temperature_c, -10.0, 40.0)?;
        if self.is_raining {
            check_range("rainfall_mm", self.rainfall_mm, 0.0, 50.0)?;
        }
        check_range("customer_satisfaction", self.customer_satisfaction, 1.0, 10.0)?;

        if !(1..=10).contains(&self.staff_count) {
            return Err(PredictError::InvalidInput {
                field: "staff_count",
                reason: format!("{} is outside 1..=10", self.staff_count),
            });
        }
        if self.num_customers > 1000 {
            return Err(PredictError::InvalidInput {
                field: "num_customers",
                reason: format!("{} is above the maximum of 1000", self.num_customers),
            });
        }

        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(PredictError::InvalidInput {
            field,
            reason: format!("{} is outside [{}, {}]", value, min, max),
        });
    }
    Ok(())
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            request_id: None,
            date: default_date(),
            season: default_season(),
            temperature_c: default_temperature(),
            is_raining: false,
            rainfall_mm: default_rainfall(),
            is_holiday: false,
            promotion_active: false,
            nearby_events: false,
            staff_count: default_staff_count(),
            machine_issues: false,
            num_customers: default_num_customers(),
            customer_satisfaction: default_satisfaction(),
            coffee_sales: default_coffee_sales(),
            pastry_sales: default_pastry_sales(),
            sandwich_sales: default_sandwich_sales(),
        }
    }
}
