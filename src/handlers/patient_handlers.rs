use crate::auth::guard::{self, resources};
use crate::auth::session::Session;
use crate::error::ApiError;
use crate::handlers::{json_body, masked, parse_id};
use crate::models::{user::non_blank, CreatePatientRequest, User};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum::extract::rejection::JsonRejection;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

const PATIENT_NOT_FOUND: &str = "Patient not found or not associated with this user";

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub id: Option<String>,
}

/// The stored account behind a session; sessions outlive deleted users.
async fn session_user(state: &AppState, session: &Session) -> Result<User, ApiError> {
    state
        .user_repository
        .find_by_username(&session.username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// `GET /api/patients[?id=]`
pub async fn get_patients(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Value>, ApiError> {
    let session = guard::require_session(&state.policy, &jar, resources::PATIENTS)?;
    let fail = || masked(&state, "Failed to fetch patients");

    let nurse = session_user(&state, &session).await.map_err(fail())?;

    if let Some(id) = non_blank(query.id) {
        let patient = match parse_id(&id) {
            Some(id) => state
                .patient_repository
                .find_for_nurse(id, nurse.id)
                .await
                .map_err(fail())?,
            None => None,
        };

        let patient = patient.ok_or_else(|| ApiError::not_found(PATIENT_NOT_FOUND))?;
        return Ok(Json(json!({ "patient": patient })));
    }

    let patients = state
        .patient_repository
        .list_for_nurse(nurse.id)
        .await
        .map_err(fail())?;

    Ok(Json(json!({ "patients": patients })))
}

/// `POST /api/patients`
pub async fn create_patient(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let session = guard::require_session(&state.policy, &jar, resources::PATIENTS)?;
    let fail = || masked(&state, "Failed to add patient");

    let new_patient = json_body(body)?.validate()?;

    let nurse = session_user(&state, &session).await.map_err(fail())?;

    let patient = state
        .patient_repository
        .create(nurse.id, new_patient)
        .await
        .map_err(fail())?;

    tracing::info!(patient_id = %patient.id, nurse = %nurse.username, "Patient added");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Patient added successfully",
            "patient": patient,
        })),
    ))
}

/// `DELETE /api/patients?id=`. Removes the patient's entries as well.
pub async fn delete_patient(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Value>, ApiError> {
    let session = guard::require_session(&state.policy, &jar, resources::PATIENTS)?;
    let fail = || masked(&state, "Failed to delete patient");

    let id = non_blank(query.id).ok_or_else(|| ApiError::validation("Patient ID is required"))?;

    let nurse = session_user(&state, &session).await.map_err(fail())?;

    let patient = match parse_id(&id) {
        Some(id) => state
            .patient_repository
            .find_for_nurse(id, nurse.id)
            .await
            .map_err(fail())?,
        None => None,
    };
    let patient = patient.ok_or_else(|| ApiError::not_found(PATIENT_NOT_FOUND))?;

    let deleted = state
        .patient_repository
        .delete(patient.id)
        .await
        .map_err(fail())?;
    if !deleted {
        return Err(ApiError::not_found(PATIENT_NOT_FOUND));
    }

    tracing::info!(patient_id = %patient.id, nurse = %nurse.username, "Patient deleted");

    Ok(Json(json!({ "message": "Patient deleted successfully" })))
}
