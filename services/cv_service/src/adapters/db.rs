//! services/cv_service/src/adapters/db.rs
//!
//! The PostgreSQL document store: the concrete implementation of the `CvRepository`
//! port from the core crate, built on `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cv_builder_core::{
    CvDocument, CvRecord, CvRepository, CvStatus, CvUpdate, NewCv, PortError, PortResult,
};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CvRepository` port.
#[derive(Clone)]
pub struct PgCvRepository {
    pool: PgPool,
}

impl PgCvRepository {
    /// Creates a new `PgCvRepository`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the bundled schema migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CvRow {
    id: Uuid,
    status: String,
    document: Json<CvDocument>,
    score: Option<i16>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CvRow {
    fn to_domain(self) -> PortResult<CvRecord> {
        let status = self
            .status
            .parse::<CvStatus>()
            .map_err(PortError::Unexpected)?;
        let score = self
            .score
            .map(|s| {
                u8::try_from(s)
                    .map_err(|_| PortError::Unexpected(format!("stored score {s} is out of range")))
            })
            .transpose()?;
        Ok(CvRecord {
            id: self.id,
            document: self.document.0,
            status,
            score,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `CvRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl CvRepository for PgCvRepository {
    async fn create(&self, cv: NewCv) -> PortResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO cvs (id, status, document, score, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(cv.status.as_str())
        .bind(Json(&cv.document))
        .bind(cv.score.map(i16::from))
        .bind(cv.created_at)
        .bind(cv.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        debug!(%id, "Inserted CV row");
        Ok(id)
    }

    async fn update(&self, id: Uuid, update: CvUpdate) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE cvs SET status = $2, document = $3, score = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(update.status.as_str())
        .bind(Json(&update.document))
        .bind(update.score.map(i16::from))
        .bind(update.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("CV {} not found", id)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM cvs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("CV {} not found", id)));
        }
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> PortResult<CvRecord> {
        let row = sqlx::query_as::<_, CvRow>(
            "SELECT id, status, document, score, created_at, updated_at FROM cvs WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("CV {} not found", id)),
            _ => unexpected(e),
        })?;

        row.to_domain()
    }
}
