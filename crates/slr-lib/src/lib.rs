//! Simple linear regression library
//!
//! This crate provides the core functionality for:
//! - Streaming weighted least-squares fitting with compensated summation
//! - Durable model storage behind a bounded LRU cache
//! - Usage statistics aggregation across concurrent requests
//! - The request-level service shared by the HTTP and gRPC transports
//! - Health checks and observability

pub mod error;
pub mod health;
pub mod instances;
pub mod observability;
pub mod proto;
pub mod regression;
pub mod service;
pub mod stats;
pub mod storage;

pub use error::{ErrorKind, Result, SlrError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use instances::{instances_from_rows, load_instances_from_tsv, validate_instances, Instance};
pub use observability::{SlrMetrics, StructuredLogger};
pub use regression::{Accumulator, KahanAdder, Model, ModelValue, TrainingResults};
pub use service::{Operation, RegressionService};
pub use stats::{RequestStat, RequestTracker, StatsAggregator, StatsRecorder, UsageStats};
pub use storage::{FileStore, MemoryStore, ModelCache, ModelRepository, ModelStore};
