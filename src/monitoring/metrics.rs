// src/monitoring/metrics.rs - Prometheus metrics for the embedding service

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Buckets tuned for batch encode latency (seconds)
const INFERENCE_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Process-wide metric set, exported on `/metrics`
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    texts_total: IntCounter,
    inference_seconds: Histogram,
    keep_warm_pings_total: IntCounterVec,
}

impl std::fmt::Debug for ServiceMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMetrics").finish_non_exhaustive()
    }
}

impl ServiceMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("embed_requests_total", "HTTP requests by route and status"),
            &["route", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let texts_total = IntCounter::new("embed_texts_total", "Texts embedded")?;
        registry.register(Box::new(texts_total.clone()))?;

        let inference_seconds = Histogram::with_opts(
            HistogramOpts::new("embed_inference_seconds", "Model encode latency in seconds")
                .buckets(INFERENCE_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(inference_seconds.clone()))?;

        let keep_warm_pings_total = IntCounterVec::new(
            Opts::new("embed_keep_warm_pings_total", "Keep-warm pings by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(keep_warm_pings_total.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            texts_total,
            inference_seconds,
            keep_warm_pings_total,
        })
    }

    pub fn record_request(&self, route: &str, status: u16) {
        self.requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    pub fn record_inference(&self, texts: usize, seconds: f64) {
        self.texts_total.inc_by(texts as u64);
        self.inference_seconds.observe(seconds);
    }

    pub fn record_keep_warm(&self, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.keep_warm_pings_total.with_label_values(&[outcome]).inc();
    }

    pub fn request_count(&self, route: &str, status: u16) -> u64 {
        self.requests_total
            .with_label_values(&[route, &status.to_string()])
            .get()
    }

    pub fn texts_embedded(&self) -> u64 {
        self.texts_total.get()
    }

    /// Prometheus text exposition format
    pub fn export(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
