//! HTTP server initialization and runtime setup.
//!
//! Handles record store setup, the attempt sweeper, and the Axum server lifecycle.

use crate::application::services::{AuthService, RateLimitPolicy};
use crate::config::{Config, StoreBackend};
use crate::domain::attempt_sweeper::run_attempt_sweeper;
use crate::domain::repositories::{AttemptRepository, LinkRepository};
use crate::infrastructure::persistence::{
    Bounded, InMemoryStore, PgAttemptRepository, PgLinkRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use chrono::TimeDelta;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Repositories backing one running instance.
pub struct Stores {
    pub links: Arc<dyn LinkRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
}

/// Opens the configured record store and wraps every call in the store timeout.
///
/// For PostgreSQL this connects the pool and applies embedded migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn open_stores(config: &Config) -> Result<Stores> {
    let timeout = config.store_timeout();

    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to apply migrations")?;
            tracing::info!("Migrations applied");

            let pool = Arc::new(pool);
            let links = Arc::new(PgLinkRepository::new(pool.clone()));
            let attempts = Arc::new(PgAttemptRepository::new(pool));

            Ok(Stores {
                links: Arc::new(Bounded::new(links, timeout)),
                attempts: Arc::new(Bounded::new(attempts, timeout)),
            })
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store = Arc::new(InMemoryStore::new());

            Ok(Stores {
                links: Arc::new(Bounded::new(store.clone(), timeout)),
                attempts: Arc::new(Bounded::new(store, timeout)),
            })
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Record store (PostgreSQL with migrations, or in-memory)
/// - Background attempt sweeper
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let stores = open_stores(&config).await?;

    let policy = RateLimitPolicy {
        max_attempts: config.rate_limit_max_attempts,
        window: TimeDelta::try_seconds(config.rate_limit_window_secs)
            .context("RATE_LIMIT_WINDOW_SECS is out of range")?,
    };

    tokio::spawn(run_attempt_sweeper(
        stores.attempts.clone(),
        policy.window,
        config.attempt_sweep_interval(),
    ));
    tracing::info!("Attempt sweeper started");

    let auth_service = AuthService::new(
        config.token_signing_secret.clone(),
        &config.admin_token_hash,
    )
    .context("ADMIN_TOKEN_HASH is not valid hex")?;

    let state = AppState::new(
        stores.links,
        stores.attempts,
        auth_service,
        policy,
        config.code_max_attempts,
    )
    .with_public_base_url(config.public_base_url.clone());

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
