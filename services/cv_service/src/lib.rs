//! services/cv_service/src/lib.rs
//!
//! Configuration, concrete adapters and shared startup helpers for the binaries that
//! run the CV builder engine against PostgreSQL and OpenAI.

pub mod adapters;
pub mod config;
pub mod error;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::ServiceError;

/// Installs the global `tracing` subscriber at the configured level.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Opens the connection pool.
pub async fn connect(config: &Config) -> Result<PgPool, ServiceError> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}
