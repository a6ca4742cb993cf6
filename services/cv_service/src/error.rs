//! services/cv_service/src/error.rs
//!
//! Defines the primary error type for the CV service.

use crate::config::ConfigError;
use cv_builder_core::{PortError, WizardError};

/// The primary error type for the `cv_service` crate.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a refusal or failure reported by the wizard engine.
    #[error("Wizard Error: {0}")]
    Wizard(#[from] WizardError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
