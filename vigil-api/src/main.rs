//! Vigil API server binary.
//!
//! Reads configuration from the environment, selects the record store, and
//! serves the router until Ctrl-C.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use vigil_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, AppState, DbClient, DbConfig,
    StorageBackend,
};
use vigil_storage::{InMemoryStore, SharedStore};

use vigil_api::telemetry::{init_tracer, TelemetryConfig};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracer(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    if telemetry_config.is_production() {
        api_config.validate_for_production()?;
    }

    let store = open_store(api_config.storage).await?;
    tracing::warn!("Admin routes under /api/admin are not authenticated");

    let app: Router = create_api_router(AppState::new(store), &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, storage = ?api_config.storage, "Starting Vigil API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

async fn open_store(backend: StorageBackend) -> ApiResult<SharedStore> {
    match backend {
        StorageBackend::Postgres => {
            let db = DbClient::from_config(&DbConfig::from_env())?;
            db.migrate().await?;
            Ok(Arc::new(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("VIGIL_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port_str = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("VIGIL_API_PORT").ok())
        .unwrap_or_else(|| "3000".to_string());
    let port = port_str.parse::<u16>().map_err(|_| {
        ApiError::invalid_input(format!("Invalid port value: {}", port_str))
    })?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>().map_err(|e| {
        ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
    })
}
