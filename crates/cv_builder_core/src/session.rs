//! crates/cv_builder_core/src/session.rs
//!
//! One open wizard: the document being built, the wizard state, and the calls out to
//! the analysis and storage collaborators. Each session owns its own copy of
//! everything; nothing is shared between sessions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    CvAnalysis, CvDocument, CvPatch, CvRecord, CvStatus, EducationPatch, WorkExperiencePatch,
};
use crate::error::{WizardError, WizardResult};
use crate::persistence::{self, SaveIntent, SaveOutcome};
use crate::ports::{
    AchievementSuggestionService, CvAnalysisService, CvRepository, PortError,
};
use crate::steps::WizardStep;
use crate::validation::{self, ValidationIssue};
use crate::wizard::{WizardAction, WizardMode, WizardState};

//=========================================================================================
// Busy signal
//=========================================================================================

/// A cloneable flag that is `true` while an analysis, suggestion or save request is in
/// flight. The caller uses it to disable the triggering control; the session does not
/// reject overlapping requests itself.
#[derive(Debug, Clone, Default)]
pub struct BusySignal(Arc<AtomicBool>);

impl BusySignal {
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn hold(&self) -> BusyGuard {
        self.0.store(true, Ordering::Release);
        BusyGuard(self.0.clone())
    }
}

/// Clears the flag when the request finishes, fails, or its future is dropped.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

//=========================================================================================
// Engine view
//=========================================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub step: WizardStep,
    pub title: &'static str,
    pub unlocked: bool,
    pub issue: Option<ValidationIssue>,
}

/// Everything the caller needs to render the wizard chrome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineView {
    pub cv_id: Option<Uuid>,
    pub mode: WizardMode,
    pub current_index: usize,
    pub current_step: WizardStep,
    pub highest_completed_index: Option<usize>,
    pub steps: Vec<StepView>,
    pub analysis_satisfied: bool,
    pub last_score: Option<u8>,
    pub status: CvStatus,
    pub busy: bool,
}

//=========================================================================================
// WizardSession
//=========================================================================================

pub struct WizardSession {
    id: Option<Uuid>,
    document: CvDocument,
    state: WizardState,
    status: CvStatus,
    last_analysis: Option<CvAnalysis>,
    busy: BusySignal,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    /// Opens the wizard on an empty, never-saved draft.
    pub fn new() -> Self {
        Self {
            id: None,
            document: CvDocument::default(),
            state: WizardState::new(WizardMode::FreshDraft, None),
            status: CvStatus::Draft,
            last_analysis: None,
            busy: BusySignal::default(),
        }
    }

    /// Opens the wizard on a stored CV. The mode follows the stored status and is fixed
    /// for the rest of the session.
    pub fn from_record(record: CvRecord) -> Self {
        let mode = WizardMode::for_status(record.status);
        debug!(id = %record.id, ?mode, "Opening stored CV");
        Self {
            id: Some(record.id),
            document: record.document,
            state: WizardState::new(mode, record.score),
            status: record.status,
            last_analysis: None,
            busy: BusySignal::default(),
        }
    }

    pub async fn open(repo: &dyn CvRepository, id: Uuid) -> WizardResult<Self> {
        let record = repo.get_by_id(id).await.inspect_err(|e| {
            error!(%id, "Failed to load CV: {e}");
        })?;
        Ok(Self::from_record(record))
    }

    // --- Accessors ---

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn document(&self) -> &CvDocument {
        &self.document
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn mode(&self) -> WizardMode {
        self.state.mode()
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step()
    }

    pub fn status(&self) -> CvStatus {
        self.status
    }

    pub fn is_analysis_satisfied(&self) -> bool {
        self.state.gate().is_satisfied()
    }

    pub fn last_analysis(&self) -> Option<&CvAnalysis> {
        self.last_analysis.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn busy_signal(&self) -> BusySignal {
        self.busy.clone()
    }

    pub fn view(&self) -> EngineView {
        let progress = self.state.progress();
        let steps = WizardStep::all()
            .map(|step| StepView {
                step,
                title: step.title(),
                unlocked: self.state.can_jump_to(step.index()),
                issue: validation::validate(step, &self.document).err(),
            })
            .collect();

        EngineView {
            cv_id: self.id,
            mode: self.state.mode(),
            current_index: progress.current_index(),
            current_step: self.state.current_step(),
            highest_completed_index: progress.highest_completed_index(),
            steps,
            analysis_satisfied: self.state.gate().is_satisfied(),
            last_score: self.state.gate().last_score(),
            status: self.status,
            busy: self.busy.is_busy(),
        }
    }

    // --- Navigation ---

    /// Applies `action`. On error the session is left exactly as it was.
    pub fn dispatch(&mut self, action: WizardAction) -> WizardResult<()> {
        match self.state.reduce(action, &self.document) {
            Ok(next) => {
                debug!(
                    ?action,
                    from = %self.state.current_step(),
                    to = %next.current_step(),
                    "Wizard transition"
                );
                self.state = next;
                Ok(())
            }
            Err(e) => {
                warn!(?action, step = %self.state.current_step(), "Wizard transition rejected: {e}");
                Err(e)
            }
        }
    }

    pub fn next(&mut self) -> WizardResult<()> {
        self.dispatch(WizardAction::Next)
    }

    pub fn previous(&mut self) -> WizardResult<()> {
        self.dispatch(WizardAction::Previous)
    }

    pub fn jump_to(&mut self, index: usize) -> WizardResult<()> {
        self.dispatch(WizardAction::JumpTo(index))
    }

    // --- Document edits ---

    /// Runs an edit and, if it changed anything, tells the wizard so the gate can react.
    fn edit<R>(&mut self, f: impl FnOnce(&mut CvDocument) -> (bool, R)) -> R {
        let (changed, result) = f(&mut self.document);
        if changed {
            self.state = self
                .state
                .reduce(WizardAction::DocumentEdited, &self.document)
                .unwrap_or(self.state);
        }
        result
    }

    pub fn apply_patch(&mut self, patch: &CvPatch) {
        self.edit(|doc| {
            let next = doc.apply_patch(patch);
            let changed = next != *doc;
            *doc = next;
            (changed, ())
        })
    }

    pub fn add_work_experience(&mut self) -> Uuid {
        self.edit(|doc| (true, doc.add_work_experience()))
    }

    pub fn update_work_experience(&mut self, id: Uuid, patch: &WorkExperiencePatch) -> bool {
        self.edit(|doc| {
            let changed = doc.update_work_experience(id, patch);
            (changed, changed)
        })
    }

    pub fn remove_work_experience(&mut self, id: Uuid) -> bool {
        self.edit(|doc| {
            let changed = doc.remove_work_experience(id);
            (changed, changed)
        })
    }

    pub fn add_achievement(&mut self, experience_id: Uuid) -> bool {
        self.edit(|doc| {
            let changed = doc.add_achievement(experience_id);
            (changed, changed)
        })
    }

    pub fn update_achievement(&mut self, experience_id: Uuid, index: usize, text: &str) -> bool {
        self.edit(|doc| {
            let changed = doc.update_achievement(experience_id, index, text);
            (changed, changed)
        })
    }

    pub fn remove_achievement(&mut self, experience_id: Uuid, index: usize) -> bool {
        self.edit(|doc| {
            let changed = doc.remove_achievement(experience_id, index);
            (changed, changed)
        })
    }

    pub fn add_education(&mut self) -> Uuid {
        self.edit(|doc| (true, doc.add_education()))
    }

    pub fn update_education(&mut self, id: Uuid, patch: &EducationPatch) -> bool {
        self.edit(|doc| {
            let changed = doc.update_education(id, patch);
            (changed, changed)
        })
    }

    pub fn remove_education(&mut self, id: Uuid) -> bool {
        self.edit(|doc| {
            let changed = doc.remove_education(id);
            (changed, changed)
        })
    }

    pub fn add_skill(&mut self, value: &str) -> bool {
        self.edit(|doc| {
            let changed = doc.add_skill(value);
            (changed, changed)
        })
    }

    pub fn remove_skill(&mut self, value: &str) -> bool {
        self.edit(|doc| {
            let changed = doc.remove_skill(value);
            (changed, changed)
        })
    }

    // --- Collaborators ---

    /// Grades the current document and opens the analysis gate.
    ///
    /// Only available on the grade step. A failed call or an out-of-range score leaves the
    /// gate as it was.
    pub async fn run_analysis(
        &mut self,
        analyzer: &dyn CvAnalysisService,
    ) -> WizardResult<&CvAnalysis> {
        let step = self.state.current_step();
        if step != WizardStep::Grade {
            return Err(WizardError::NotOnGradeStep { step });
        }

        let analysis = {
            let _busy = self.busy.hold();
            analyzer.analyze(&self.document).await.inspect_err(|e| {
                error!("CV analysis failed: {e}");
            })?
        };
        if analysis.score > 100 {
            let e = PortError::InvalidResponse(format!(
                "score {} is outside 0..=100",
                analysis.score
            ));
            error!("CV analysis failed: {e}");
            return Err(e.into());
        }

        self.dispatch(WizardAction::AnalysisCompleted {
            score: analysis.score,
        })?;
        info!(score = analysis.score, "CV analyzed");
        Ok(self.last_analysis.insert(analysis))
    }

    /// Asks for achievement suggestions for one experience and writes them into its
    /// empty placeholders, then appends the rest. Returns whether the document changed.
    pub async fn suggest_achievements(
        &mut self,
        service: &dyn AchievementSuggestionService,
        experience_id: Uuid,
    ) -> WizardResult<bool> {
        let Some(experience) = self.document.work_experience(experience_id).cloned() else {
            return Ok(false);
        };

        let suggestions = {
            let _busy = self.busy.hold();
            service
                .suggest_achievements(&experience)
                .await
                .inspect_err(|e| error!(%experience_id, "Achievement suggestion failed: {e}"))?
        };

        Ok(self.edit(|doc| {
            let changed = doc.fill_achievements(experience_id, &suggestions);
            (changed, changed)
        }))
    }

    /// Saves the document. The first successful save assigns the id used by later ones.
    pub async fn save(
        &mut self,
        repo: &dyn CvRepository,
        intent: SaveIntent,
    ) -> WizardResult<SaveOutcome> {
        let outcome = {
            let _busy = self.busy.hold();
            persistence::save(repo, &self.document, intent, &self.state.gate(), self.id).await?
        };
        self.id = Some(outcome.id);
        self.status = outcome.status;
        Ok(outcome)
    }

    /// Closes the wizard without writing anything.
    pub fn discard(self) {
        debug!(id = ?self.id, "Discarding wizard session");
    }

    /// Deletes the stored CV, if this session was ever saved.
    pub async fn delete(self, repo: &dyn CvRepository) -> WizardResult<()> {
        let Some(id) = self.id else {
            return Ok(());
        };
        let _busy = self.busy.hold();
        repo.delete(id).await?;
        info!(%id, "Deleted CV");
        Ok(())
    }
}
