// ============================================================================
// Database Configuration
// ============================================================================

use anyhow::Result;
use std::str::FromStr;

/// Which store implementation backs the API
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local tables; contents are lost on restart
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" | "in-memory" => Ok(Self::Memory),
            other => anyhow::bail!(
                "Invalid STORAGE_BACKEND: {}. Must be 'postgres' or 'memory'",
                other
            ),
        }
    }
}

/// Database connection pool configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Timeout for acquiring a connection from the pool (seconds)
    pub acquire_timeout_secs: u64,
    /// Timeout for idle connections before they are closed (seconds)
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl DbConfig {
    pub(crate) fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_connections),
            acquire_timeout_secs: std::env::var("DB_ACQUIRE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.acquire_timeout_secs),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.idle_timeout_secs),
        }
    }
}
