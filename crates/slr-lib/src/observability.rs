//! Observability infrastructure for the regression service
//!
//! Provides:
//! - Prometheus metrics (request outcomes, training volume, cache hit ratio,
//!   durable store latency)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
    HistogramVec, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for request and store latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SlrMetricsInner> = OnceLock::new();

struct SlrMetricsInner {
    requests_total: IntCounterVec,
    request_latency_seconds: HistogramVec,
    training_instances: IntCounter,
    cache_lookups: IntCounterVec,
    cached_models: IntGauge,
    store_latency_seconds: HistogramVec,
    store_errors: IntCounterVec,
}

impl SlrMetricsInner {
    fn new() -> Self {
        Self {
            requests_total: register_int_counter_vec!(
                "slr_requests_total",
                "Requests handled, by operation and outcome",
                &["operation", "outcome"]
            )
            .expect("Failed to register requests_total"),

            request_latency_seconds: register_histogram_vec!(
                "slr_request_latency_seconds",
                "Time spent handling a request in the regression core",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register request_latency_seconds"),

            training_instances: register_int_counter!(
                "slr_training_instances_total",
                "Training instances received"
            )
            .expect("Failed to register training_instances"),

            cache_lookups: register_int_counter_vec!(
                "slr_model_cache_lookups_total",
                "Model cache lookups, by result",
                &["result"]
            )
            .expect("Failed to register cache_lookups"),

            cached_models: register_int_gauge!(
                "slr_cached_models",
                "Number of models currently held in the cache"
            )
            .expect("Failed to register cached_models"),

            store_latency_seconds: register_histogram_vec!(
                "slr_store_latency_seconds",
                "Durable model store call latency",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register store_latency_seconds"),

            store_errors: register_int_counter_vec!(
                "slr_store_errors_total",
                "Failed durable model store calls",
                &["operation"]
            )
            .expect("Failed to register store_errors"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the same
/// underlying metrics.
#[derive(Clone, Copy)]
pub struct SlrMetrics {
    _private: (),
}

impl Default for SlrMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SlrMetrics {
    /// Create a metrics handle (registers global metrics on first call)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SlrMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SlrMetricsInner {
        GLOBAL_METRICS.get_or_init(SlrMetricsInner::new)
    }

    /// Count a finished request
    pub fn inc_requests(&self, operation: &str, succeeded: bool) {
        let outcome = if succeeded { "success" } else { "failure" };
        self.inner()
            .requests_total
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn observe_request_latency(&self, operation: &str, duration_secs: f64) {
        self.inner()
            .request_latency_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn add_training_instances(&self, count: u64) {
        self.inner().training_instances.inc_by(count);
    }

    pub fn inc_cache_hits(&self) {
        self.inner().cache_lookups.with_label_values(&["hit"]).inc();
    }

    pub fn inc_cache_misses(&self) {
        self.inner().cache_lookups.with_label_values(&["miss"]).inc();
    }

    pub fn set_cached_models(&self, count: i64) {
        self.inner().cached_models.set(count);
    }

    pub fn observe_store_latency(&self, operation: &str, duration_secs: f64) {
        self.inner()
            .store_latency_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn inc_store_errors(&self, operation: &str) {
        self.inner()
            .store_errors
            .with_label_values(&[operation])
            .inc();
    }
}

/// Structured logger for service events
///
/// Keeps event names and field sets consistent across the HTTP and gRPC
/// transports.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn log_startup(&self, version: &str, http_addr: &str, grpc_addr: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            version = %version,
            http_addr = %http_addr,
            grpc_addr = %grpc_addr,
            "Regression service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str, total_requests: u64, succeeded_requests: u64) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            total_requests = total_requests,
            succeeded_requests = succeeded_requests,
            "Regression service shutting down"
        );
    }

    pub fn log_model_trained(
        &self,
        instances: usize,
        coefficient: f64,
        intercept: f64,
        sum_squared_errors: f64,
    ) {
        info!(
            event = "model_trained",
            instance = %self.instance,
            instances = instances,
            coefficient = coefficient,
            intercept = intercept,
            sum_squared_errors = sum_squared_errors,
            "Trained regression model"
        );
    }

    pub fn log_model_saved(&self, name: &str, creation_time: &str) {
        info!(
            event = "model_saved",
            instance = %self.instance,
            model = %name,
            creation_time = %creation_time,
            "Stored regression model"
        );
    }

    pub fn log_model_save_failed(&self, error: &str) {
        warn!(
            event = "model_save_failed",
            instance = %self.instance,
            error = %error,
            "Failed to store model, returning unsaved fit"
        );
    }

    pub fn log_model_applied(&self, name: &str, argument: f64, value: f64, from_cache: bool) {
        info!(
            event = "model_applied",
            instance = %self.instance,
            model = %name,
            argument = argument,
            value = value,
            from_cache = from_cache,
            "Applied regression model"
        );
    }

    pub fn log_request_failed(&self, operation: &str, kind: &str, error: &str) {
        warn!(
            event = "request_failed",
            instance = %self.instance,
            operation = %operation,
            kind = %kind,
            error = %error,
            "Request failed"
        );
    }
}
