//! crates/cv_builder_core/src/gate.rs
//!
//! Records whether an analysis pass has happened since the last edit that counts.

use crate::wizard::WizardMode;

/// The analysis gate. It stores that a pass happened, plus the last score for display;
/// the score never influences whether the gate is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisGate {
    analyzed: bool,
    last_score: Option<u8>,
}

impl AnalysisGate {
    /// Open for a CV loaded as `Completed`, closed otherwise.
    pub fn for_mode(mode: WizardMode, stored_score: Option<u8>) -> Self {
        match mode {
            WizardMode::EditingCompleted => Self {
                analyzed: true,
                last_score: stored_score,
            },
            WizardMode::FreshDraft => Self {
                analyzed: false,
                last_score: stored_score,
            },
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.analyzed
    }

    pub fn last_score(&self) -> Option<u8> {
        self.last_score
    }

    /// Applies a document edit. Only edits to a previously graded CV invalidate it.
    pub fn on_document_edited(self, mode: WizardMode) -> Self {
        match mode {
            WizardMode::EditingCompleted => Self {
                analyzed: false,
                ..self
            },
            WizardMode::FreshDraft => self,
        }
    }

    pub fn on_analysis_completed(self, score: u8) -> Self {
        Self {
            analyzed: true,
            last_score: Some(score),
        }
    }
}
