//! API Configuration Module
//!
//! CORS, request timeout, and storage backend selection. Configuration is
//! loaded from environment variables with sensible defaults for development.

use std::str::FromStr;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// STORAGE BACKEND
// ============================================================================

/// Which record store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// PostgreSQL through a deadpool connection pool.
    #[default]
    Postgres,
    /// Process-local store. Data is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(ApiError::invalid_input(format!(
                "Unknown storage backend '{}', expected 'postgres' or 'memory'",
                other
            ))),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, timeouts, and storage selection.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Upper bound on handler time before the request is abandoned.
    pub request_timeout: Duration,

    /// Record store backend.
    pub storage: StorageBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(), // Empty = allow all
            cors_max_age_secs: 86400, // 24 hours
            request_timeout: Duration::from_secs(30),
            storage: StorageBackend::Postgres,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `VIGIL_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `VIGIL_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `VIGIL_REQUEST_TIMEOUT_SECS`: Request timeout (default: 30)
    /// - `VIGIL_STORAGE`: "postgres" or "memory" (default: postgres)
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let defaults = Self::default();

        let cors_origins = lookup("VIGIL_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = lookup("VIGIL_CORS_MAX_AGE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let request_timeout = lookup("VIGIL_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let storage = match lookup("VIGIL_STORAGE") {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => defaults.storage,
        };

        Ok(Self {
            cors_origins,
            cors_max_age_secs,
            request_timeout,
            storage,
        })
    }

    /// Check if strict CORS is configured.
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Reject configurations that are unsafe outside development.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        if self.cors_origins.is_empty() {
            return Err(ApiError::invalid_input(
                "CORS origins not configured for production. Set VIGIL_CORS_ORIGINS.",
            ));
        }
        if self.storage == StorageBackend::Memory {
            tracing::warn!("In-memory storage selected in production; data will not survive restarts");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.storage, StorageBackend::Postgres);
    }

    #[test]
    fn test_from_lookup_parses_values() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("VIGIL_CORS_ORIGINS", "https://vigil.example, ,https://admin.vigil.example"),
            ("VIGIL_CORS_MAX_AGE_SECS", "600"),
            ("VIGIL_REQUEST_TIMEOUT_SECS", "5"),
            ("VIGIL_STORAGE", "memory"),
        ]))
        .unwrap();

        assert_eq!(
            config.cors_origins,
            vec!["https://vigil.example", "https://admin.vigil.example"]
        );
        assert_eq!(config.cors_max_age_secs, 600);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.storage, StorageBackend::Memory);
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("VIGIL_CORS_MAX_AGE_SECS", "forever"),
            ("VIGIL_REQUEST_TIMEOUT_SECS", "-1"),
        ]))
        .unwrap();
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unknown_storage_backend_rejected() {
        let err = ApiConfig::from_lookup(lookup_from(&[("VIGIL_STORAGE", "sqlite")])).unwrap_err();
        assert!(err.message.contains("sqlite"));
    }

    #[test]
    fn test_production_requires_origins() {
        let mut config = ApiConfig::default();
        assert!(!config.is_production());
        assert!(config.validate_for_production().is_err());

        config.cors_origins = vec!["https://vigil.example".to_string()];
        assert!(config.is_production());
        assert!(config.validate_for_production().is_ok());
    }
}
