//! Vigil API - REST Layer and PostgreSQL Store
//!
//! This crate exposes the Vigil prayer service over HTTP (Axum) and provides
//! the PostgreSQL-backed `RecordStore`. Routing, request parsing, error
//! mapping, configuration, and telemetry live here; the consistency rules
//! live in `vigil-storage`.

pub mod macros;

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, StorageBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use types::*;
