//! End-to-end wizard flows driven through the public API against in-memory collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use cv_builder_core::{
    CvAnalysis, CvAnalysisService, CvDocument, CvPatch, CvRecord, CvRepository, CvStatus,
    CvUpdate, NewCv, PortError, PortResult, ReasonCode, SaveIntent, WizardError, WizardMode,
    WizardSession, WizardStep, WorkExperiencePatch,
};
use uuid::Uuid;

#[derive(Default)]
struct InMemoryStore {
    records: Mutex<HashMap<Uuid, CvRecord>>,
    writes: Mutex<usize>,
}

impl InMemoryStore {
    fn seed(&self, status: CvStatus, document: CvDocument) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.records.lock().unwrap().insert(
            id,
            CvRecord {
                id,
                document,
                status,
                score: Some(75),
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn record(&self, id: Uuid) -> CvRecord {
        self.records.lock().unwrap()[&id].clone()
    }
}

#[async_trait]
impl CvRepository for InMemoryStore {
    async fn create(&self, cv: NewCv) -> PortResult<Uuid> {
        *self.writes.lock().unwrap() += 1;
        let id = Uuid::new_v4();
        self.records.lock().unwrap().insert(
            id,
            CvRecord {
                id,
                document: cv.document,
                status: cv.status,
                score: cv.score,
                created_at: cv.created_at,
                updated_at: cv.updated_at,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: Uuid, update: CvUpdate) -> PortResult<()> {
        *self.writes.lock().unwrap() += 1;
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("CV {id} not found")))?;
        record.document = update.document;
        record.status = update.status;
        record.score = update.score;
        record.updated_at = update.updated_at;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        *self.writes.lock().unwrap() += 1;
        self.records.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> PortResult<CvRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("CV {id} not found")))
    }
}

struct ScoreOf(u8);

#[async_trait]
impl CvAnalysisService for ScoreOf {
    async fn analyze(&self, _document: &CvDocument) -> PortResult<CvAnalysis> {
        Ok(CvAnalysis {
            score: self.0,
            section_feedback: Vec::new(),
            suggestions: Vec::new(),
        })
    }
}

fn complete_document() -> CvDocument {
    let mut doc = CvDocument {
        job_title: "Engineer".into(),
        description: "Backend roles".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@example.com".into(),
        summary: "Builds reliable systems".into(),
        ..Default::default()
    };
    let id = doc.add_work_experience();
    doc.update_work_experience(
        id,
        &WorkExperiencePatch {
            job_title: Some("Engineer".into()),
            company: Some("Analytical Engines".into()),
            start_date: Some("2019-03".into()),
            current: Some(true),
            ..Default::default()
        },
    );
    doc.add_skill("Rust");
    doc
}

#[test]
fn scenario_a_incomplete_general_step_blocks_next() {
    let mut session = WizardSession::new();

    let err = session.next().unwrap_err();

    match &err {
        WizardError::Validation { step, issue } => {
            assert_eq!(*step, WizardStep::General);
            assert_eq!(issue.reason, ReasonCode::JobTitleRequired);
        }
        other => panic!("expected a validation failure, got {other:?}"),
    }
    assert!(err.is_user_correctable());
    assert_eq!(session.state().progress().current_index(), 0);
}

#[test]
fn scenario_b_filled_general_step_advances() {
    let mut session = WizardSession::new();
    session.apply_patch(&CvPatch {
        job_title: Some("Engineer".into()),
        description: Some("x".into()),
        ..Default::default()
    });

    session.next().unwrap();

    let progress = session.state().progress();
    assert_eq!(progress.current_index(), 1);
    assert_eq!(progress.highest_completed_index(), Some(0));
}

#[tokio::test]
async fn scenario_c_edited_completed_cv_needs_new_analysis() {
    let store = InMemoryStore::default();
    let id = store.seed(CvStatus::Completed, complete_document());
    let mut session = WizardSession::open(&store, id).await.unwrap();

    session.apply_patch(&CvPatch {
        summary: Some("Rewritten".into()),
        ..Default::default()
    });
    let err = session.save(&store, SaveIntent::Completed).await.unwrap_err();

    assert_eq!(err, WizardError::AnalysisRequired);
    assert!(err.is_user_correctable());
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn scenario_d_untouched_completed_cv_saves_as_completed() {
    let store = InMemoryStore::default();
    let id = store.seed(CvStatus::Completed, complete_document());
    let created_at = store.record(id).created_at;
    let mut session = WizardSession::open(&store, id).await.unwrap();

    let outcome = session.save(&store, SaveIntent::Completed).await.unwrap();

    assert_eq!(outcome.status, CvStatus::Completed);
    assert_eq!(store.writes(), 1);
    let stored = store.record(id);
    assert_eq!(stored.created_at, created_at);
    assert!(stored.updated_at >= created_at);
}

#[tokio::test]
async fn scenario_e_empty_draft_saves_as_draft() {
    let store = InMemoryStore::default();
    let mut session = WizardSession::new();

    let outcome = session.save(&store, SaveIntent::Draft).await.unwrap();

    assert_eq!(outcome.status, CvStatus::Draft);
    assert!(outcome.created);
    assert_eq!(store.record(outcome.id).document, CvDocument::default());
}

#[tokio::test]
async fn full_fresh_walkthrough_ends_in_a_completed_save() {
    let store = InMemoryStore::default();
    let mut session = WizardSession::new();
    let doc = complete_document();
    session.apply_patch(&CvPatch {
        job_title: Some(doc.job_title.clone()),
        description: Some(doc.description.clone()),
        first_name: Some(doc.first_name.clone()),
        last_name: Some(doc.last_name.clone()),
        email: Some(doc.email.clone()),
        summary: Some(doc.summary.clone()),
        work_experiences: Some(doc.work_experiences.clone()),
        skills: Some(doc.skills.clone()),
        ..Default::default()
    });

    let mut highest = None;
    while session.current_step() != WizardStep::Grade {
        session.next().unwrap();
        let now = session.state().progress().highest_completed_index();
        assert!(now >= highest, "high-water mark must never decrease");
        highest = now;
    }
    assert_eq!(
        session.save(&store, SaveIntent::Completed).await,
        Err(WizardError::AnalysisRequired)
    );

    session.run_analysis(&ScoreOf(88)).await.unwrap();
    let outcome = session.save(&store, SaveIntent::Completed).await.unwrap();

    assert_eq!(outcome.status, CvStatus::Completed);
    assert_eq!(store.record(outcome.id).score, Some(88));
    assert_eq!(session.mode(), WizardMode::FreshDraft);
}

#[tokio::test]
async fn stored_drafts_reopen_in_fresh_mode() {
    let store = InMemoryStore::default();
    let id = store.seed(CvStatus::Draft, complete_document());

    let mut session = WizardSession::open(&store, id).await.unwrap();

    assert_eq!(session.mode(), WizardMode::FreshDraft);
    assert!(!session.is_analysis_satisfied());
    assert!(matches!(
        session.jump_to(WizardStep::Skills.index()),
        Err(WizardError::StepLocked { step: WizardStep::Skills })
    ));
    assert_eq!(session.state().progress().current_index(), 0);
}

#[tokio::test]
async fn navigation_guard_holds_for_every_locked_index() {
    let mut session = WizardSession::new();
    session.apply_patch(&CvPatch {
        job_title: Some("Engineer".into()),
        description: Some("x".into()),
        ..Default::default()
    });
    session.next().unwrap();
    session.previous().unwrap();

    for index in 2..10 {
        assert!(session.jump_to(index).is_err());
        assert_eq!(session.state().progress().current_index(), 0);
    }
    session.jump_to(1).unwrap();
    assert_eq!(session.current_step(), WizardStep::Personal);
}

#[tokio::test]
async fn delete_removes_the_stored_cv() {
    let store = InMemoryStore::default();
    let id = store.seed(CvStatus::Completed, complete_document());
    let session = WizardSession::open(&store, id).await.unwrap();

    session.delete(&store).await.unwrap();

    assert!(matches!(
        WizardSession::open(&store, id).await,
        Err(WizardError::Collaborator(PortError::NotFound(_)))
    ));
}

#[test]
fn removing_an_experience_twice_matches_removing_it_once() {
    let mut session = WizardSession::new();
    let keep = session.add_work_experience();
    let removed = session.add_work_experience();

    assert!(session.remove_work_experience(removed));
    let once = session.document().clone();
    assert!(!session.remove_work_experience(removed));

    assert_eq!(session.document(), &once);
    assert_eq!(session.document().work_experiences[0].id, keep);
}
