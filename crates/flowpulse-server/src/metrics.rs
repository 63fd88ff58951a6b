//! Prometheus counters for the ingestion pipeline.
//!
//! The registry is owned by [`IngestMetrics`] and injected where needed
//! rather than living in a process-global; tests get an isolated registry
//! per instance that way.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

pub struct IngestMetrics {
    registry: Registry,
    fetch_items: IntCounterVec,
    fetch_failures: IntCounterVec,
    job_duration: HistogramVec,
}

impl IngestMetrics {
    /// Creates the registry and registers all pipeline collectors.
    ///
    /// # Errors
    ///
    /// Returns [`prometheus::Error`] if a collector cannot be created or
    /// registered (duplicate names, invalid label sets).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let fetch_items = IntCounterVec::new(
            Opts::new(
                "flowpulse_fetch_items_total",
                "Observations successfully ingested, by platform",
            ),
            &["platform"],
        )?;
        let fetch_failures = IntCounterVec::new(
            Opts::new(
                "flowpulse_fetch_failures_total",
                "Ingestion runs that failed, by platform",
            ),
            &["platform"],
        )?;
        let job_duration = HistogramVec::new(
            HistogramOpts::new(
                "flowpulse_job_duration_seconds",
                "Wall-clock duration of scheduled ingestion jobs",
            ),
            &["job"],
        )?;

        registry.register(Box::new(fetch_items.clone()))?;
        registry.register(Box::new(fetch_failures.clone()))?;
        registry.register(Box::new(job_duration.clone()))?;

        Ok(Self {
            registry,
            fetch_items,
            fetch_failures,
            job_duration,
        })
    }

    pub fn record_items(&self, platform: &str, count: u64) {
        self.fetch_items.with_label_values(&[platform]).inc_by(count);
    }

    pub fn record_failure(&self, platform: &str) {
        self.fetch_failures.with_label_values(&[platform]).inc();
    }

    pub fn observe_job(&self, job: &str, seconds: f64) {
        self.job_duration.with_label_values(&[job]).observe(seconds);
    }

    /// Renders all registered collectors in the Prometheus text exposition
    /// format.
    ///
    /// # Errors
    ///
    /// Returns [`prometheus::Error`] if encoding fails.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_per_platform() {
        let metrics = IngestMetrics::new().unwrap();
        metrics.record_items("YouTube", 10);
        metrics.record_items("YouTube", 5);
        metrics.record_items("Discourse", 3);
        metrics.record_failure("GoogleTrends");

        let text = metrics.encode().unwrap();
        assert!(text.contains("flowpulse_fetch_items_total{platform=\"YouTube\"} 15"));
        assert!(text.contains("flowpulse_fetch_items_total{platform=\"Discourse\"} 3"));
        assert!(text.contains("flowpulse_fetch_failures_total{platform=\"GoogleTrends\"} 1"));
    }

    #[test]
    fn histogram_shows_up_in_exposition() {
        let metrics = IngestMetrics::new().unwrap();
        metrics.observe_job("fetch_youtube", 1.25);

        let text = metrics.encode().unwrap();
        assert!(text.contains("flowpulse_job_duration_seconds_count{job=\"fetch_youtube\"} 1"));
    }

    #[test]
    fn separate_instances_do_not_share_state() {
        let a = IngestMetrics::new().unwrap();
        let b = IngestMetrics::new().unwrap();
        a.record_items("YouTube", 7);

        assert!(!b
            .encode()
            .unwrap()
            .contains("flowpulse_fetch_items_total{platform=\"YouTube\"}"));
    }
}
