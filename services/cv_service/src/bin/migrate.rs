//! services/cv_service/src/bin/migrate.rs
//!
//! Applies the bundled schema migrations to the configured database.

use cv_service_lib::{
    adapters::db::PgCvRepository, config::Config, connect, error::ServiceError, init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let repository = PgCvRepository::new(connect(&config).await?);
    info!("Running database migrations...");
    repository.run_migrations().await?;
    info!("Database migrations complete.");

    Ok(())
}
