use crate::auth::guard::{self, resources};
use crate::error::ApiError;
use crate::handlers::{json_body, masked, parse_id};
use crate::models::{user::non_blank, EntryPayload};
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryQuery {
    pub id: Option<String>,
    pub patient_id: Option<String>,
}

/// `GET /api/entries?id=` or `GET /api/entries?patientId=`
pub async fn get_entries(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<EntryQuery>,
) -> Result<Json<Value>, ApiError> {
    guard::require_session(&state.policy, &jar, resources::ENTRIES)?;
    let fail = || masked(&state, "Failed to fetch entries");

    if let Some(id) = non_blank(query.id) {
        let entry = match parse_id(&id) {
            Some(id) => state.entry_repository.find_by_id(id).await.map_err(fail())?,
            None => None,
        };
        let entry = entry.ok_or_else(|| ApiError::not_found("Entry not found"))?;
        return Ok(Json(json!({ "entry": entry })));
    }

    if let Some(patient_id) = non_blank(query.patient_id) {
        let entries = match parse_id(&patient_id) {
            Some(patient_id) => state
                .entry_repository
                .list_for_patient(patient_id)
                .await
                .map_err(fail())?,
            None => Vec::new(),
        };
        return Ok(Json(json!({ "entries": entries })));
    }

    Err(ApiError::validation("Patient ID or Entry ID is required"))
}

/// `POST /api/entries`
pub async fn create_entry(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let session = guard::require_session(&state.policy, &jar, resources::ENTRIES)?;
    let fail = || masked(&state, "Failed to add entry");
    let mut payload = json_body(body)?;

    let patient_id = non_blank(payload.patient_id.take())
        .ok_or_else(|| ApiError::validation("Patient ID is required"))?;

    let patient = match parse_id(&patient_id) {
        Some(id) => state.patient_repository.find_by_id(id).await.map_err(fail())?,
        None => None,
    };
    let patient = patient.ok_or_else(|| ApiError::not_found("Patient not found"))?;

    let new_entry = payload.into_new_entry(patient.id)?;
    let entry = state
        .entry_repository
        .create(new_entry)
        .await
        .map_err(fail())?;

    tracing::info!(
        entry_id = %entry.id,
        patient_id = %patient.id,
        nurse = %session.username,
        "Entry added"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Entry added successfully",
            "entry": entry,
        })),
    ))
}

/// `PUT /api/entries`. Clinical sections are merged key by key (`null`
/// clears a key); scalar fields are replaced when present.
pub async fn update_entry(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<EntryPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let session = guard::require_session(&state.policy, &jar, resources::ENTRIES)?;
    let fail = || masked(&state, "Failed to update entry");
    let mut payload = json_body(body)?;

    let id = non_blank(payload.id.take())
        .ok_or_else(|| ApiError::validation("Entry ID is required"))?;

    let entry = match parse_id(&id) {
        Some(id) => state.entry_repository.find_by_id(id).await.map_err(fail())?,
        None => None,
    };
    let mut entry = entry.ok_or_else(|| ApiError::not_found("Entry not found"))?;

    payload.apply_to(&mut entry)?;

    let entry = state
        .entry_repository
        .update(&entry)
        .await
        .map_err(fail())?
        .ok_or_else(|| ApiError::not_found("Entry not found"))?;

    tracing::info!(entry_id = %entry.id, nurse = %session.username, "Entry updated");

    Ok(Json(json!({
        "message": "Entry updated successfully",
        "entry": entry,
    })))
}
