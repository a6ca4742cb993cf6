//! crates/cv_builder_core/src/persistence.rs
//!
//! Turns a save request into exactly one write against the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{CvDocument, CvStatus, CvUpdate, NewCv};
use crate::error::{WizardError, WizardResult};
use crate::gate::AnalysisGate;
use crate::ports::CvRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveIntent {
    Draft,
    Completed,
}

/// The single write a save resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistPlan {
    Create(NewCv),
    Update { id: Uuid, update: CvUpdate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: Uuid,
    pub status: CvStatus,
    pub updated_at: DateTime<Utc>,
    /// `true` when this save created the stored CV.
    pub created: bool,
}

/// Shapes the outbound write.
///
/// A draft is always accepted, however incomplete. A completed save requires an open
/// analysis gate. `created_at` is only ever set on the first write.
pub fn plan_save(
    document: &CvDocument,
    intent: SaveIntent,
    gate: &AnalysisGate,
    existing_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> WizardResult<PersistPlan> {
    let status = match intent {
        SaveIntent::Draft => CvStatus::Draft,
        SaveIntent::Completed if gate.is_satisfied() => CvStatus::Completed,
        SaveIntent::Completed => return Err(WizardError::AnalysisRequired),
    };
    let score = gate.last_score();

    Ok(match existing_id {
        Some(id) => PersistPlan::Update {
            id,
            update: CvUpdate {
                document: document.clone(),
                status,
                score,
                updated_at: now,
            },
        },
        None => PersistPlan::Create(NewCv {
            document: document.clone(),
            status,
            score,
            created_at: now,
            updated_at: now,
        }),
    })
}

/// Performs the write. Store failures are returned unchanged and never retried.
pub async fn execute(repo: &dyn CvRepository, plan: PersistPlan) -> WizardResult<SaveOutcome> {
    match plan {
        PersistPlan::Create(cv) => {
            let (status, updated_at) = (cv.status, cv.updated_at);
            let id = repo.create(cv).await?;
            info!(%id, %status, "Created CV");
            Ok(SaveOutcome {
                id,
                status,
                updated_at,
                created: true,
            })
        }
        PersistPlan::Update { id, update } => {
            let (status, updated_at) = (update.status, update.updated_at);
            repo.update(id, update).await?;
            info!(%id, %status, "Updated CV");
            Ok(SaveOutcome {
                id,
                status,
                updated_at,
                created: false,
            })
        }
    }
}

/// Plans and executes a save stamped with the current time.
pub async fn save(
    repo: &dyn CvRepository,
    document: &CvDocument,
    intent: SaveIntent,
    gate: &AnalysisGate,
    existing_id: Option<Uuid>,
) -> WizardResult<SaveOutcome> {
    let plan = plan_save(document, intent, gate, existing_id, Utc::now()).inspect_err(|e| {
        warn!(?intent, "Save refused: {e}");
    })?;
    execute(repo, plan).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CvRecord;
    use crate::ports::{PortError, PortResult};
    use crate::wizard::WizardMode;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRepo {
        writes: Mutex<Vec<String>>,
        fail_with: Option<PortError>,
    }

    #[async_trait]
    impl CvRepository for RecordingRepo {
        async fn create(&self, cv: NewCv) -> PortResult<Uuid> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.writes.lock().unwrap().push(format!("create:{}", cv.status));
            Ok(Uuid::new_v4())
        }

        async fn update(&self, id: Uuid, update: CvUpdate) -> PortResult<()> {
            if let Some(e) = &self.fail_with {
                return Err(e.clone());
            }
            self.writes
                .lock()
                .unwrap()
                .push(format!("update:{id}:{}", update.status));
            Ok(())
        }

        async fn delete(&self, _id: Uuid) -> PortResult<()> {
            unimplemented!("not needed for save tests")
        }

        async fn get_by_id(&self, _id: Uuid) -> PortResult<CvRecord> {
            unimplemented!("not needed for save tests")
        }
    }

    fn closed_gate() -> AnalysisGate {
        AnalysisGate::for_mode(WizardMode::FreshDraft, None)
    }

    #[test]
    fn drafts_are_always_planned_as_draft() {
        let gate = closed_gate().on_analysis_completed(88);
        let plan = plan_save(&CvDocument::default(), SaveIntent::Draft, &gate, None, Utc::now())
            .unwrap();

        match plan {
            PersistPlan::Create(cv) => {
                assert_eq!(cv.status, CvStatus::Draft);
                assert_eq!(cv.created_at, cv.updated_at);
                assert_eq!(cv.score, Some(88));
            }
            other => panic!("expected a create, got {other:?}"),
        }
    }

    #[test]
    fn existing_cvs_get_an_update_without_created_at() {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let gate = closed_gate().on_analysis_completed(70);

        let plan =
            plan_save(&CvDocument::default(), SaveIntent::Completed, &gate, Some(id), now).unwrap();

        assert_eq!(
            plan,
            PersistPlan::Update {
                id,
                update: CvUpdate {
                    document: CvDocument::default(),
                    status: CvStatus::Completed,
                    score: Some(70),
                    updated_at: now,
                },
            }
        );
    }

    #[tokio::test]
    async fn completed_save_without_analysis_never_reaches_the_store() {
        let repo = RecordingRepo::default();

        let result = save(
            &repo,
            &CvDocument::default(),
            SaveIntent::Completed,
            &closed_gate(),
            None,
        )
        .await;

        assert_eq!(result, Err(WizardError::AnalysisRequired));
        assert!(repo.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn each_save_is_exactly_one_write() {
        let repo = RecordingRepo::default();
        let id = Uuid::new_v4();

        let outcome = save(
            &repo,
            &CvDocument::default(),
            SaveIntent::Draft,
            &closed_gate(),
            Some(id),
        )
        .await
        .unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.id, id);
        assert_eq!(*repo.writes.lock().unwrap(), vec![format!("update:{id}:Draft")]);
    }

    #[tokio::test]
    async fn store_failures_pass_through_unchanged() {
        let repo = RecordingRepo {
            fail_with: Some(PortError::Unexpected("connection reset".into())),
            ..Default::default()
        };

        let result = save(
            &repo,
            &CvDocument::default(),
            SaveIntent::Draft,
            &closed_gate(),
            None,
        )
        .await;

        assert_eq!(
            result,
            Err(WizardError::Collaborator(PortError::Unexpected("connection reset".into())))
        );
    }
}
