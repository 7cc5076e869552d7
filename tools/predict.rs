//! One-off revenue prediction from the command line.
//!
//! Takes the same inputs as a service request, either as flags or as a
//! JSON request file, and prints the date information and prediction.

use anyhow::{Context, Result};
use clap::Parser;
use coffee_revenue_pipeline::{
    AppConfig, CalendarFeatures, InferencePipeline, PredictionRequest, RevenuePredictor,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "predict", about = "Predict daily coffee shop revenue")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = "config/config.toml")]
    config: PathBuf,

    /// JSON request file; flags below override its values
    #[arg(long)]
    request: Option<PathBuf>,

    /// Date as YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<String>,

    /// Fall, Spring, Summer or Winter
    #[arg(long)]
    season: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    temperature: Option<f64>,

    /// Rainfall in mm; implies it is raining
    #[arg(long)]
    rainfall: Option<f64>,

    /// `--holiday` or `--holiday=false`
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    holiday: Option<bool>,

    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    promotion: Option<bool>,

    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    nearby_events: Option<bool>,

    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    machine_issues: Option<bool>,

    #[arg(long)]
    staff: Option<u32>,

    #[arg(long)]
    customers: Option<u32>,

    #[arg(long)]
    satisfaction: Option<f64>,

    #[arg(long)]
    coffee: Option<u32>,

    #[arg(long)]
    pastry: Option<u32>,

    #[arg(long)]
    sandwich: Option<u32>,

    /// Print the reply as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_request(self) -> Result<PredictionRequest> {
        let mut request = match &self.request {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read request file {}", path.display()))?;
                serde_json::from_str(&text).context("Invalid request JSON")?
            }
            None => PredictionRequest::default(),
        };

        if let Some(date) = self.date {
            request.date = date;
        }
        if let Some(season) = self.season {
            request.season = season;
        }
        if let Some(temperature) = self.temperature {
            request.temperature_c = temperature;
        }
        if let Some(rainfall) = self.rainfall {
            request.is_raining = true;
            request.rainfall_mm = rainfall;
        }
        if let Some(holiday) = self.holiday {
            request.is_holiday = holiday;
        }
        if let Some(promotion) = self.promotion {
            request.promotion_active = promotion;
        }
        if let Some(nearby_events) = self.nearby_events {
            request.nearby_events = nearby_events;
        }
        if let Some(machine_issues) = self.machine_issues {
            request.machine_issues = machine_issues;
        }
        if let Some(staff) = self.staff {
            request.staff_count = staff;
        }
        if let Some(customers) = self.customers {
            request.num_customers = customers;
        }
        if let Some(satisfaction) = self.satisfaction {
            request.customer_satisfaction = satisfaction;
        }
        if let Some(coffee) = self.coffee {
            request.coffee_sales = coffee;
        }
        if let Some(pastry) = self.pastry {
            request.pastry_sales = pastry;
        }
        if let Some(sandwich) = self.sandwich {
            request.sandwich_sales = sandwich;
        }

        Ok(request)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coffee_revenue_pipeline=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let json = args.json;
    let config = AppConfig::load_from_path(&args.config)?;
    let request = args.into_request()?;

    let pipeline = InferencePipeline::from_config(&config.artifacts)?;
    let predictor = RevenuePredictor::new(pipeline, config.tiers.clone());
    let prediction = predictor.predict(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
        return Ok(());
    }

    let calendar = CalendarFeatures::parse(&request.date, &request.season)?;
    println!("Date Information:\n{}\n", calendar.summary());
    println!("Predicted revenue for {}", prediction.headline());
    println!("[{}] {}", prediction.tier.label(), prediction.advice);

    Ok(())
}
