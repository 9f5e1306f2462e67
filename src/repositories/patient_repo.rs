use crate::error::ApiError;
use crate::models::{NewPatient, Patient};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait PatientRepository: Send + Sync {
    /// Patients owned by `nurse_id`, newest first.
    async fn list_for_nurse(&self, nurse_id: Uuid) -> Result<Vec<Patient>, ApiError>;
    async fn find_for_nurse(&self, id: Uuid, nurse_id: Uuid) -> Result<Option<Patient>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, ApiError>;
    async fn create(&self, nurse_id: Uuid, patient: NewPatient) -> Result<Patient, ApiError>;
    /// Whether any patient is still assigned to `nurse_id`.
    async fn has_patients(&self, nurse_id: Uuid) -> Result<bool, ApiError>;
    /// Delete a patient together with its entries.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

pub struct SqlxPatientRepository {
    pool: PgPool,
}

impl SqlxPatientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientRepository for SqlxPatientRepository {
    async fn list_for_nurse(&self, nurse_id: Uuid) -> Result<Vec<Patient>, ApiError> {
        let rows = sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, first_name, last_name, room_number, diagnosis, nurse_id, created_at, updated_at
            FROM patients
            WHERE nurse_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(nurse_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_for_nurse(&self, id: Uuid, nurse_id: Uuid) -> Result<Option<Patient>, ApiError> {
        let row = sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, first_name, last_name, room_number, diagnosis, nurse_id, created_at, updated_at
            FROM patients
            WHERE id = $1 AND nurse_id = $2
            "#,
        )
        .bind(id)
        .bind(nurse_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, ApiError> {
        let row = sqlx::query_as::<_, Patient>(
            r#"
            SELECT id, first_name, last_name, room_number, diagnosis, nurse_id, created_at, updated_at
            FROM patients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, nurse_id: Uuid, patient: NewPatient) -> Result<Patient, ApiError> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (id, first_name, last_name, room_number, diagnosis, nurse_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING id, first_name, last_name, room_number, diagnosis, nurse_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.room_number)
        .bind(&patient.diagnosis)
        .bind(nurse_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn has_patients(&self, nurse_id: Uuid) -> Result<bool, ApiError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM patients WHERE nurse_id = $1)")
                .bind(nurse_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    // entries go with it through ON DELETE CASCADE
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
