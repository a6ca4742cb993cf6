//! crates/cv_builder_core/src/lib.rs
//!
//! The CV builder wizard engine: the document model, the step validator, the
//! reducer-style wizard state machine, the analysis gate and the save coordinator,
//! plus the ports through which it reaches the document store and the AI provider.

pub mod domain;
pub mod error;
pub mod gate;
pub mod persistence;
pub mod ports;
pub mod session;
pub mod steps;
pub mod validation;
pub mod wizard;

pub use domain::{
    CvAnalysis, CvDocument, CvPatch, CvRecord, CvStatus, CvUpdate, Education, EducationPatch,
    FeedbackStatus, NewCv, PatchField, SectionFeedback, TimelineEntry, WorkExperience,
    WorkExperiencePatch,
};
pub use error::{WizardError, WizardResult};
pub use gate::AnalysisGate;
pub use persistence::{PersistPlan, SaveIntent, SaveOutcome};
pub use ports::{
    AchievementSuggestionService, CvAnalysisService, CvRepository, PortError, PortResult,
};
pub use session::{BusySignal, EngineView, StepView, WizardSession};
pub use steps::{StepDefinition, WizardStep, STEPS, STEP_COUNT};
pub use validation::{ReasonCode, ValidationIssue};
pub use wizard::{WizardAction, WizardMode, WizardProgress, WizardState};
