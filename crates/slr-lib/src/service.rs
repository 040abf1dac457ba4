//! Request-level orchestration shared by every transport
//!
//! Each operation tracks its own usage stat, records Prometheus metrics and
//! reports store health, so the HTTP and gRPC adapters only translate
//! payloads and errors.

use crate::error::{ErrorKind, Result, SlrError};
use crate::health::{components, HealthRegistry};
use crate::instances::{instances_from_rows, validate_instances, Instance};
use crate::observability::{SlrMetrics, StructuredLogger};
use crate::regression::{self, ModelValue, TrainingResults};
use crate::stats::{RequestTracker, StatsRecorder, UsageStats};
use crate::storage::ModelRepository;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Operations exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Train,
    Apply,
    Stats,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Train => "train",
            Operation::Apply => "apply",
            Operation::Stats => "stats",
        }
    }
}

#[derive(Clone)]
pub struct RegressionService {
    repository: Arc<ModelRepository>,
    stats: StatsRecorder,
    health: HealthRegistry,
    metrics: SlrMetrics,
    logger: StructuredLogger,
}

impl RegressionService {
    pub fn new(
        repository: Arc<ModelRepository>,
        stats: StatsRecorder,
        health: HealthRegistry,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            repository,
            stats,
            health,
            metrics: SlrMetrics::new(),
            logger,
        }
    }

    /// Register health components and report the service ready
    pub async fn mark_ready(&self) {
        self.health.register(components::MODEL_STORE).await;
        self.health.register(components::STATS).await;
        self.health.set_ready(true).await;
    }

    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    pub fn repository(&self) -> &ModelRepository {
        &self.repository
    }

    pub fn stats_recorder(&self) -> &StatsRecorder {
        &self.stats
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// Fit a model over raw `[x, y]` / `[x, y, weight]` rows
    pub async fn train_rows(&self, rows: &[Vec<f64>], store: bool) -> Result<TrainingResults> {
        let start = Instant::now();
        let mut tracker = self.stats.track();
        tracker.add_instances(rows.len());

        let outcome = match instances_from_rows(rows) {
            Ok(instances) => Ok(self.fit(&instances, store).await),
            Err(e) => Err(e),
        };
        self.finish(Operation::Train, start, &mut tracker, outcome)
    }

    /// Fit a model over already structured instances
    pub async fn train_instances(
        &self,
        instances: Vec<Instance>,
        store: bool,
    ) -> Result<TrainingResults> {
        let start = Instant::now();
        let mut tracker = self.stats.track();
        tracker.add_instances(instances.len());

        let outcome = match validate_instances(&instances) {
            Ok(()) => Ok(self.fit(&instances, store).await),
            Err(e) => Err(e),
        };
        self.finish(Operation::Train, start, &mut tracker, outcome)
    }

    /// Apply a stored model to one argument
    pub async fn calculate(&self, model_name: &str, argument: f64) -> Result<ModelValue> {
        let start = Instant::now();
        let mut tracker = self.stats.track();

        let outcome = self.load_and_apply(model_name, argument).await;
        self.finish(Operation::Apply, start, &mut tracker, outcome)
    }

    /// Current usage counters
    ///
    /// Stats reads are not themselves counted as requests.
    pub async fn stats(&self) -> UsageStats {
        self.metrics.inc_requests(Operation::Stats.as_str(), true);
        self.stats.snapshot().await
    }

    /// Count a request the transport refused before it reached the service
    ///
    /// Returns the error so callers can write `return Err(service.reject(..))`.
    pub fn reject(&self, operation: Operation, error: SlrError) -> SlrError {
        let _tracker = self.stats.track();
        self.metrics.inc_requests(operation.as_str(), false);
        self.log_failure(operation, &error);
        error
    }

    /// Refresh health of components that cannot report on their own
    pub async fn refresh_health(&self) {
        if !self.stats.is_running() {
            self.health
                .set_unhealthy(components::STATS, "stats aggregator stopped")
                .await;
        }
    }

    async fn fit(&self, instances: &[Instance], store: bool) -> TrainingResults {
        let mut results = regression::train(instances);
        self.metrics.add_training_instances(instances.len() as u64);
        self.logger.log_model_trained(
            instances.len(),
            results.model.coefficient,
            results.model.intercept,
            results.sum_squared_errors,
        );

        if store {
            let saved = self.repository.save(&results.model).await;
            self.report_store_health(&saved).await;
            match saved {
                Ok((name, creation_time)) => {
                    self.logger
                        .log_model_saved(&name, &creation_time.to_rfc3339());
                    results.model.name = Some(name.clone());
                    results.name = Some(name);
                    results.creation_time = Some(creation_time);
                }
                // The fit is still valid without a stored copy.
                Err(e) => {
                    self.logger.log_model_save_failed(&e.to_string());
                    results.error = Some(e.to_string());
                }
            }
        }
        results
    }

    async fn load_and_apply(&self, model_name: &str, argument: f64) -> Result<ModelValue> {
        if model_name.is_empty() {
            return Err(SlrError::MissingParameter("model"));
        }
        if !argument.is_finite() {
            return Err(SlrError::InvalidArgument(argument.to_string()));
        }

        let loaded = self.repository.load(model_name).await;
        self.report_store_health(&loaded).await;
        let (model, from_cache) = loaded?;

        let value = model.evaluate(argument, from_cache);
        self.logger
            .log_model_applied(model_name, argument, value.value, from_cache);
        Ok(value)
    }

    async fn report_store_health<T>(&self, outcome: &Result<T>) {
        match outcome {
            Ok(_) => self.health.set_healthy(components::MODEL_STORE).await,
            Err(e) if e.kind() == ErrorKind::Storage => {
                self.health
                    .set_degraded(components::MODEL_STORE, e.to_string())
                    .await
            }
            Err(_) => {}
        }
    }

    fn finish<T>(
        &self,
        operation: Operation,
        start: Instant,
        tracker: &mut RequestTracker,
        outcome: Result<T>,
    ) -> Result<T> {
        let op = operation.as_str();
        self.metrics
            .observe_request_latency(op, start.elapsed().as_secs_f64());
        self.metrics.inc_requests(op, outcome.is_ok());

        match &outcome {
            Ok(_) => {
                tracker.succeed();
                debug!(operation = op, "Request succeeded");
            }
            Err(e) => self.log_failure(operation, e),
        }
        outcome
    }

    fn log_failure(&self, operation: Operation, error: &SlrError) {
        self.logger
            .log_request_failed(operation.as_str(), error.kind().as_str(), &error.to_string());
    }
}
