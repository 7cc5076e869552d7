//! Test Request Producer
//!
//! Generates random prediction requests and publishes them to NATS for
//! exercising the revenue predictor.

use chrono::{Datelike, Duration as DateDuration, Local, NaiveDate};
use coffee_revenue_pipeline::types::request::PredictionRequest;
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

/// Request generator for testing
struct RequestGenerator {
    rng: rand::rngs::ThreadRng,
    request_counter: u64,
    start_date: NaiveDate,
}

impl RequestGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            request_counter: 0,
            start_date: Local::now().date_naive(),
        }
    }

    /// Generate a plausible day of trading
    fn generate_typical(&mut self) -> PredictionRequest {
        self.request_counter += 1;
        let date = self.start_date + DateDuration::days(self.rng.gen_range(0..365));
        let is_raining = self.rng.gen_bool(0.25);
        let num_customers = self.rng.gen_range(60..260);

        PredictionRequest {
            request_id: Some(format!("req_{:012}", self.request_counter)),
            date: date.format("%Y-%m-%d").to_string(),
            season: season_for(date).to_string(),
            temperature_c: self.rng.gen_range(-5.0..35.0),
            is_raining,
            rainfall_mm: if is_raining { self.rng.gen_range(0.5..30.0) } else { 0.0 },
            is_holiday: self.rng.gen_bool(0.05),
            promotion_active: self.rng.gen_bool(0.3),
            nearby_events: self.rng.gen_bool(0.15),
            staff_count: self.rng.gen_range(2..8),
            machine_issues: self.rng.gen_bool(0.05),
            num_customers,
            customer_satisfaction: self.rng.gen_range(5.0..10.0),
            coffee_sales: num_customers / 2 + self.rng.gen_range(0..20),
            pastry_sales: num_customers / 4 + self.rng.gen_range(0..10),
            sandwich_sales: num_customers / 6 + self.rng.gen_range(0..8),
        }
    }

    /// Generate a request the service should reject
    fn generate_invalid(&mut self) -> PredictionRequest {
        let mut request = self.generate_typical();
        match self.rng.gen_range(0..3) {
            0 => request.date = "2024-02-30".to_string(),
            1 => request.season = "Monsoon".to_string(),
            _ => request.staff_count = 40,
        }
        request
    }
}

fn season_for(date: NaiveDate) -> &'static str {
    match date.month() {
        3..=5 => "Spring",
        6..=8 => "Summer",
        9..=11 => "Fall",
        _ => "Winter",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("request_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Request Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("revenue.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let invalid_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.05);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        invalid_rate = invalid_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, invalid_rate, delay_ms).await;
        }
    };

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} requests...", count);

    let mut typical_count = 0;
    let mut invalid_count = 0;

    for i in 0..count {
        let request = if rng.gen_bool(invalid_rate) {
            invalid_count += 1;
            generator.generate_invalid()
        } else {
            typical_count += 1;
            generator.generate_typical()
        };

        let payload = serde_json::to_vec(&request)?;
        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} requests ({} typical, {} invalid)",
                i + 1,
                count,
                typical_count,
                invalid_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    client.flush().await?;

    info!(
        "Completed! Published {} requests ({} typical, {} invalid)",
        count, typical_count, invalid_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, invalid_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let request = if rng.gen_bool(invalid_rate) {
            generator.generate_invalid()
        } else {
            generator.generate_typical()
        };

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, serde_json::to_string_pretty(&request)?);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
