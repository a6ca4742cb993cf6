//! crates/cv_builder_core/src/wizard.rs
//!
//! The wizard state machine as a reducer: `(state, action) -> state`.
//!
//! [`WizardState::reduce`] is pure. It reads the document (for validation) but never
//! changes it, and on error the caller simply keeps the previous state.

use serde::Serialize;

use crate::domain::{CvDocument, CvStatus};
use crate::error::{WizardError, WizardResult};
use crate::gate::AnalysisGate;
use crate::steps::{WizardStep, STEP_COUNT};
use crate::validation;

/// How the wizard was opened. Decided once and never changed for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WizardMode {
    /// A new CV, or a stored draft. Steps unlock one at a time.
    FreshDraft,
    /// A CV that was stored as `Completed`. Every step is open.
    EditingCompleted,
}

impl WizardMode {
    pub fn for_status(status: CvStatus) -> Self {
        match status {
            CvStatus::Completed => WizardMode::EditingCompleted,
            CvStatus::Draft => WizardMode::FreshDraft,
        }
    }
}

/// Position in the wizard plus the high-water mark.
///
/// `highest_completed` is `None` until the first step is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardProgress {
    current: usize,
    highest_completed: Option<usize>,
}

impl WizardProgress {
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn highest_completed_index(&self) -> Option<usize> {
        self.highest_completed
    }

    /// Furthest index a direct jump may reach in fresh mode.
    pub fn furthest_unlocked_index(&self) -> usize {
        self.highest_completed.map_or(0, |h| h + 1).min(STEP_COUNT - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    Next,
    Previous,
    JumpTo(usize),
    DocumentEdited,
    AnalysisCompleted { score: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    mode: WizardMode,
    progress: WizardProgress,
    gate: AnalysisGate,
}

impl WizardState {
    /// Initial state for a session. A completed CV starts with every step passed and the
    /// gate open.
    pub fn new(mode: WizardMode, stored_score: Option<u8>) -> Self {
        let highest_completed = match mode {
            WizardMode::FreshDraft => None,
            WizardMode::EditingCompleted => Some(WizardStep::LAST.index()),
        };
        Self {
            mode,
            progress: WizardProgress {
                current: 0,
                highest_completed,
            },
            gate: AnalysisGate::for_mode(mode, stored_score),
        }
    }

    pub fn mode(&self) -> WizardMode {
        self.mode
    }

    pub fn progress(&self) -> WizardProgress {
        self.progress
    }

    pub fn gate(&self) -> AnalysisGate {
        self.gate
    }

    pub fn current_step(&self) -> WizardStep {
        // `current` only ever holds indices taken from the step table.
        WizardStep::from_index(self.progress.current).unwrap_or(WizardStep::LAST)
    }

    pub fn can_jump_to(&self, index: usize) -> bool {
        if index >= STEP_COUNT {
            return false;
        }
        match self.mode {
            WizardMode::EditingCompleted => true,
            WizardMode::FreshDraft => index <= self.progress.furthest_unlocked_index(),
        }
    }

    pub fn reduce(&self, action: WizardAction, document: &CvDocument) -> WizardResult<Self> {
        match action {
            WizardAction::Next => self.next(document),
            WizardAction::Previous => Ok(self.previous()),
            WizardAction::JumpTo(index) => self.jump_to(index),
            WizardAction::DocumentEdited => Ok(Self {
                gate: self.gate.on_document_edited(self.mode),
                ..*self
            }),
            WizardAction::AnalysisCompleted { score } => self.analysis_completed(score),
        }
    }

    fn next(&self, document: &CvDocument) -> WizardResult<Self> {
        let step = self.current_step();
        let target = self.progress.current + 1;
        if target >= STEP_COUNT {
            return Err(WizardError::StepOutOfRange { index: target });
        }
        validation::validate(step, document)
            .map_err(|issue| WizardError::Validation { step, issue })?;

        let highest = self
            .progress
            .highest_completed
            .map_or(self.progress.current, |h| h.max(self.progress.current));
        Ok(Self {
            progress: WizardProgress {
                current: target,
                highest_completed: Some(highest),
            },
            ..*self
        })
    }

    fn previous(&self) -> Self {
        Self {
            progress: WizardProgress {
                current: self.progress.current.saturating_sub(1),
                ..self.progress
            },
            ..*self
        }
    }

    fn jump_to(&self, index: usize) -> WizardResult<Self> {
        if index >= STEP_COUNT {
            return Err(WizardError::StepOutOfRange { index });
        }
        if !self.can_jump_to(index) {
            // `index` is in range, so the lookup cannot fail.
            let step = WizardStep::from_index(index).unwrap_or(WizardStep::LAST);
            return Err(WizardError::StepLocked { step });
        }
        Ok(Self {
            progress: WizardProgress {
                current: index,
                ..self.progress
            },
            ..*self
        })
    }

    fn analysis_completed(&self, score: u8) -> WizardResult<Self> {
        let step = self.current_step();
        if step != WizardStep::Grade {
            return Err(WizardError::NotOnGradeStep { step });
        }
        Ok(Self {
            gate: self.gate.on_analysis_completed(score),
            ..*self
        })
    }
}
