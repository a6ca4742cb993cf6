//! crates/cv_builder_core/src/ports.rs
//!
//! Defines the service contracts (traits) the wizard engine consumes.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the concrete document store and of the AI provider.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CvAnalysis, CvDocument, CvRecord, CvUpdate, NewCv, WorkExperience};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("The service returned an invalid response: {0}")]
    InvalidResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The document store. Only single-document atomicity is assumed.
#[async_trait]
pub trait CvRepository: Send + Sync {
    async fn create(&self, cv: NewCv) -> PortResult<Uuid>;

    /// Overwrites the mutable part of a stored CV. Never touches `created_at`.
    async fn update(&self, id: Uuid, update: CvUpdate) -> PortResult<()>;

    async fn delete(&self, id: Uuid) -> PortResult<()>;

    async fn get_by_id(&self, id: Uuid) -> PortResult<CvRecord>;
}

#[async_trait]
pub trait CvAnalysisService: Send + Sync {
    /// Grades a CV. The score is expected in `0..=100`.
    async fn analyze(&self, document: &CvDocument) -> PortResult<CvAnalysis>;
}

#[async_trait]
pub trait AchievementSuggestionService: Send + Sync {
    /// Proposes achievement bullet points for one employment entry.
    async fn suggest_achievements(&self, experience: &WorkExperience) -> PortResult<Vec<String>>;
}
