//! crates/cv_builder_core/src/error.rs
//!
//! Defines the error type surfaced by the wizard engine.

use crate::ports::PortError;
use crate::steps::WizardStep;
use crate::validation::ValidationIssue;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// The current step does not satisfy its completeness rules.
    #[error("Step '{step}' is incomplete: {issue}")]
    Validation {
        step: WizardStep,
        issue: ValidationIssue,
    },

    /// A `Completed` save was requested without a fresh analysis.
    #[error("The CV must be analyzed before it can be saved as completed")]
    AnalysisRequired,

    /// Analysis can only be run from the grade step.
    #[error("Analysis is only available on the grade step (currently on '{step}')")]
    NotOnGradeStep { step: WizardStep },

    /// A direct jump past the furthest unlocked step.
    #[error("Step '{step}' is not unlocked yet")]
    StepLocked { step: WizardStep },

    #[error("Step index {index} is outside the wizard")]
    StepOutOfRange { index: usize },

    /// A failure reported by the document store or the AI provider, passed through as-is.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] PortError),
}

impl WizardError {
    /// `true` for failures the user fixes by changing input or running the grade step,
    /// `false` for "something went wrong, try again".
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            WizardError::Validation { .. }
                | WizardError::AnalysisRequired
                | WizardError::NotOnGradeStep { .. }
                | WizardError::StepLocked { .. }
        )
    }
}

pub type WizardResult<T> = Result<T, WizardError>;
