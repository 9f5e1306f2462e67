use crate::error::ApiError;
use crate::models::user::non_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub room_number: String,
    pub diagnosis: String,
    pub nurse_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub room_number: String,
    pub diagnosis: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub room_number: Option<String>,
    pub diagnosis: Option<String>,
}

impl CreatePatientRequest {
    /// All four fields are mandatory and must be non-blank.
    pub fn validate(self) -> Result<NewPatient, ApiError> {
        match (
            non_blank(self.first_name),
            non_blank(self.last_name),
            non_blank(self.room_number),
            non_blank(self.diagnosis),
        ) {
            (Some(first_name), Some(last_name), Some(room_number), Some(diagnosis)) => {
                Ok(NewPatient {
                    first_name,
                    last_name,
                    room_number,
                    diagnosis,
                })
            }
            _ => Err(ApiError::validation("All fields are required")),
        }
    }
}
