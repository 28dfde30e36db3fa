// ============================================================================
// Missive Config - Centralized configuration management
// ============================================================================
//
// Loads every setting from environment variables (optionally seeded from a
// `.env` file) with defaults suitable for local development.
//
// ============================================================================

mod constants;
mod database;
mod logging;
mod security;

pub use constants::{MAX_BCRYPT_COST, MAX_REQUEST_BODY_SIZE, MIN_BCRYPT_COST, MIN_TOKEN_BYTES};
pub use database::{DbConfig, StorageBackend};
pub use logging::LoggingConfig;
pub use security::SecurityConfig;

use anyhow::Result;
use constants::*;

/// Main configuration structure
#[derive(Clone, Debug)]
pub struct Config {
    pub storage: StorageBackend,
    /// Required when `storage` is Postgres
    pub database_url: Option<String>,
    pub port: u16,
    pub bind_address: String,

    // Sub-configurations
    pub db: DbConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let storage = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Postgres,
        };

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }

        Ok(Self {
            storage,
            database_url,
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            db: DbConfig::from_env(),
            logging: LoggingConfig::from_env(),
            security: SecurityConfig::from_env(),
        })
    }

    /// In-memory configuration with the cheapest bcrypt cost, for tests
    pub fn for_tests() -> Self {
        Self {
            storage: StorageBackend::Memory,
            database_url: None,
            port: 0,
            bind_address: "127.0.0.1".to_string(),
            db: DbConfig::default(),
            logging: LoggingConfig {
                hash_salt: "test-salt".to_string(),
            },
            security: SecurityConfig {
                bcrypt_cost: MIN_BCRYPT_COST,
                ..SecurityConfig::default()
            },
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
