//! Request and prediction statistics for the revenue predictor.

use crate::types::prediction::RevenueTier;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::{Duration, Instant};
use tracing::info;

/// Width of one revenue distribution bucket
const BUCKET_WIDTH: f64 = 200.0;
const BUCKET_COUNT: usize = 10;

/// Metrics collector for the prediction service
pub struct PredictionMetrics {
    /// Total predictions produced
    pub predictions: AtomicU64,
    /// Requests rejected because of invalid input
    pub rejected: AtomicU64,
    /// Requests that failed inside the pipeline
    pub failed: AtomicU64,
    predictions_by_tier: RwLock<HashMap<RevenueTier, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Predicted revenue in 200-unit buckets, the last one open-ended
    revenue_buckets: RwLock<[u64; BUCKET_COUNT]>,
    start_time: Instant,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            predictions_by_tier: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            revenue_buckets: RwLock::new([0; BUCKET_COUNT]),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, processing_time: Duration, revenue: f64, tier: RevenueTier) {
        self.predictions.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut by_tier) = self.predictions_by_tier.write() {
            *by_tier.entry(tier).or_insert(0) += 1;
        }

        if let Ok(mut buckets) = self.revenue_buckets.write() {
            buckets[revenue_bucket(revenue)] += 1;
        }
    }

    pub fn record_rejection(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = read(&self.processing_times);
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Requests handled per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let handled = self.predictions.load(Ordering::Relaxed)
            + self.rejected.load(Ordering::Relaxed)
            + self.failed.load(Ordering::Relaxed);
        if elapsed > 0.0 {
            handled as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_tier_counts(&self) -> HashMap<RevenueTier, u64> {
        read(&self.predictions_by_tier).clone()
    }

    pub fn get_revenue_distribution(&self) -> [u64; BUCKET_COUNT] {
        *read(&self.revenue_buckets)
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let predictions = self.predictions.load(Ordering::Relaxed);
        let rejected = self.rejected.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();
        let tiers = self.get_tier_counts();

        info!(
            predictions = predictions,
            rejected = rejected,
            failed = failed,
            throughput = format!("{:.1} req/s", self.get_throughput()),
            "Revenue predictor summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            max_us = processing.max_us,
            "Processing time"
        );

        for tier in [RevenueTier::Excellent, RevenueTier::Good, RevenueTier::BelowAverage] {
            let count = tiers.get(&tier).copied().unwrap_or(0);
            let pct = if predictions > 0 {
                (count as f64 / predictions as f64) * 100.0
            } else {
                0.0
            };
            info!("  {:13}: {:>6} ({:>5.1}%)", tier.label(), count, pct);
        }

        let distribution = self.get_revenue_distribution();
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            let low = i as f64 * BUCKET_WIDTH;
            if i + 1 == BUCKET_COUNT {
                info!("  {:>6.0}+     : {:>6} ({:>5.1}%) {}", low, count, pct, bar);
            } else {
                info!("  {:>6.0}-{:<6.0}: {:>6} ({:>5.1}%) {}", low, low + BUCKET_WIDTH, count, pct, bar);
            }
        }
    }
}

/// Bucket index for a predicted revenue; negatives land in the first bucket
fn revenue_bucket(revenue: f64) -> usize {
    if revenue.is_nan() || revenue <= 0.0 {
        return 0;
    }
    ((revenue / BUCKET_WIDTH) as usize).min(BUCKET_COUNT - 1)
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<PredictionMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PredictionMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PredictionMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 450.0, RevenueTier::BelowAverage);
        metrics.record_prediction(Duration::from_micros(300), 1250.0, RevenueTier::Excellent);
        metrics.record_rejection();

        assert_eq!(metrics.predictions.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.rejected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_tier_counts().get(&RevenueTier::Excellent), Some(&1));

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }

    #[test]
    fn test_revenue_buckets() {
        assert_eq!(revenue_bucket(-120.0), 0);
        assert_eq!(revenue_bucket(f64::NAN), 0);
        assert_eq!(revenue_bucket(199.9), 0);
        assert_eq!(revenue_bucket(200.0), 1);
        assert_eq!(revenue_bucket(1000.0), 5);
        assert_eq!(revenue_bucket(25_000.0), BUCKET_COUNT - 1);
    }
}
