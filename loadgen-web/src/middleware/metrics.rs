//! Request metrics instrumentation
//!
//! [`MetricsRegistry`] owns a private prometheus registry holding the request
//! counter and latency histogram. It is built once at startup and shared by
//! `Arc` with [`track_metrics`], which wraps every route and records the
//! outcome of each request.

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::errors::WebError;

/// Header carrying the measured handling time in milliseconds
pub const ELAPSED_HEADER: &str = "X-Elapsed-ms";

pub const REQUESTS_TOTAL: &str = "app_requests_total";
pub const REQUEST_LATENCY: &str = "app_request_latency_seconds";

/// Process-wide request counter and latency histogram
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    requests_total: IntCounterVec,
    request_latency: HistogramVec,
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry").finish_non_exhaustive()
    }
}

impl MetricsRegistry {
    /// Create and register the request collectors
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(REQUESTS_TOTAL, "Total HTTP requests"),
            &["method", "endpoint", "status"],
        )?;
        let request_latency = HistogramVec::new(
            HistogramOpts::new(REQUEST_LATENCY, "Request latency in seconds")
                .buckets(prometheus::DEFAULT_BUCKETS.to_vec()),
            &["method", "endpoint"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_latency.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_latency,
        })
    }

    /// Record one completed request
    pub fn observe(&self, method: &str, endpoint: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, status.as_str()])
            .inc();
        self.request_latency
            .with_label_values(&[method, endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Current value of the request counter for a label set
    pub fn request_count(&self, method: &str, endpoint: &str, status: u16) -> u64 {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, status.as_str()])
            .get()
    }

    /// Number of latency observations recorded for a label set
    pub fn latency_observations(&self, method: &str, endpoint: &str) -> u64 {
        self.request_latency
            .with_label_values(&[method, endpoint])
            .get_sample_count()
    }

    /// Content type of [`MetricsRegistry::render`] output
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    /// Render all collectors in the text exposition format
    pub fn render(&self) -> Result<String, WebError> {
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|e| WebError::internal(format!("Failed to encode metrics: {}", e)))?;
        String::from_utf8(buffer)
            .map_err(|e| WebError::internal(format!("Metrics output is not UTF-8: {}", e)))
    }
}

/// Format a duration as milliseconds with two decimals
pub fn format_elapsed_ms(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64() * 1000.0)
}

/// Middleware timing every request and recording its outcome.
///
/// The `endpoint` label is the matched route template, or the raw path when
/// no route matched.
pub async fn track_metrics(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let mut response = next.run(request).await;

    let elapsed = start.elapsed();
    metrics.observe(method.as_str(), &endpoint, response.status().as_u16(), elapsed);

    if let Ok(value) = HeaderValue::from_str(&format_elapsed_ms(elapsed)) {
        response.headers_mut().insert(ELAPSED_HEADER, value);
    }

    response
}
