//! # Missive Server
//!
//! Token-authenticated JSON API for private messages between users.
//!
//! Every authenticated request passes the gate in [`auth::authenticate`]
//! (wired into handlers through [`routes::CurrentUser`]) and then reaches the
//! message or profile service with the acting user passed explicitly.

pub mod account_service;
pub mod auth;
pub mod context;
pub mod message_service;
pub mod metrics;
pub mod profile_service;
pub mod routes;
pub mod utils;

use anyhow::{Context, Result};
use missive_config::{Config, StorageBackend};
use missive_db::{MemoryStore, PgStore, SharedStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use context::AppContext;

const DEFAULT_LOG_FILTER: &str = "missive_server=info,tower_http=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Opens the configured store. PostgreSQL is migrated before use.
pub async fn connect_store(config: &Config) -> Result<SharedStore> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORAGE_BACKEND is postgres")?;
            let pool = missive_db::create_pool(database_url, &config.db).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!()
                .run(&pool)
                .await
                .context("failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

pub async fn run() -> Result<()> {
    init_tracing();

    let config = Arc::new(Config::from_env()?);
    let store = connect_store(&config).await?;
    let app_context = Arc::new(AppContext::new(store, config.clone()));
    let app = routes::create_router(app_context);

    let listen_addr = config.listen_addr();
    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", listen_addr))?;
    tracing::info!(
        address = %listen_addr,
        storage = ?config.storage,
        "Missive server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
