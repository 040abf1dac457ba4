//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Durable store backing the model repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map, lost on restart
    Memory,
    /// One JSON document per model under `store_path`
    File,
}

/// Server configuration, read from `SLR_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name reported in structured logs
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the HTTP API (also serves health and metrics)
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Port for the gRPC service
    #[serde(default = "default_grpc_port")]
    pub grpc_port: u16,

    /// Maximum number of models held in the cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default = "default_store")]
    pub store: StoreBackend,

    /// Root directory for the file store
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Upper bound on a single store call in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "slr-server".to_string())
}

fn default_http_port() -> u16 {
    8080
}

fn default_grpc_port() -> u16 {
    50051
}

fn default_cache_capacity() -> usize {
    slr_lib::storage::DEFAULT_CACHE_CAPACITY
}

fn default_store() -> StoreBackend {
    StoreBackend::Memory
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_store_timeout_ms() -> u64 {
    slr_lib::storage::DEFAULT_STORE_TIMEOUT.as_millis() as u64
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            http_port: default_http_port(),
            grpc_port: default_grpc_port(),
            cache_capacity: default_cache_capacity(),
            store: default_store(),
            store_path: default_store_path(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("SLR").try_parsing(true))
    }

    fn from_source(source: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(source)
            .build()
            .context("cannot read server configuration")?;

        config
            .try_deserialize()
            .context("invalid server configuration")
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn http_addr(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }

    pub fn grpc_addr(&self) -> String {
        format!("0.0.0.0:{}", self.grpc_port)
    }
}
