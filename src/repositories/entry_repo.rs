use crate::error::ApiError;
use crate::models::{Entry, EntryRow, NewEntry};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Entry>, ApiError>;
    /// Entries of one patient, newest first.
    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Entry>, ApiError>;
    async fn create(&self, entry: NewEntry) -> Result<Entry, ApiError>;
    /// Persist every mutable field of `entry`. Returns `None` if it no longer exists.
    async fn update(&self, entry: &Entry) -> Result<Option<Entry>, ApiError>;
}

const ENTRY_COLUMNS: &str = "id, patient_id, vital_signs, subjective, objective, assessment, plan, transcript, reviewed, created_at, updated_at";

pub struct SqlxEntryRepository {
    pool: PgPool,
}

impl SqlxEntryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryRepository for SqlxEntryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Entry>, ApiError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Entry::from))
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Entry>, ApiError> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE patient_id = $1 ORDER BY created_at DESC"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    async fn create(&self, entry: NewEntry) -> Result<Entry, ApiError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            INSERT INTO entries (id, patient_id, vital_signs, subjective, objective, assessment, plan, transcript, reviewed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, FALSE, $9, $9)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(entry.patient_id)
        .bind(Json(&entry.vital_signs))
        .bind(Json(&entry.subjective))
        .bind(Json(&entry.objective))
        .bind(&entry.assessment)
        .bind(&entry.plan)
        .bind(&entry.transcript)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, entry: &Entry) -> Result<Option<Entry>, ApiError> {
        let row = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            UPDATE entries
            SET vital_signs = $2,
                subjective = $3,
                objective = $4,
                assessment = $5,
                plan = $6,
                transcript = $7,
                reviewed = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry.id)
        .bind(Json(&entry.vital_signs))
        .bind(Json(&entry.subjective))
        .bind(Json(&entry.objective))
        .bind(&entry.assessment)
        .bind(&entry.plan)
        .bind(&entry.transcript)
        .bind(entry.reviewed)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Entry::from))
    }
}
