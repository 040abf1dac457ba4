//! Regression server transports
//!
//! HTTP (axum) and gRPC (tonic) adapters over [`slr_lib::RegressionService`].

pub mod api;
pub mod config;
pub mod grpc;
