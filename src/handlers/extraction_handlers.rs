use crate::auth::guard::{self, resources};
use crate::handlers::json_body;
use crate::services::ExtractionError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Default, Deserialize)]
pub struct TranscriptRequest {
    #[serde(default)]
    pub transcript: Option<String>,
}

/// `POST /api/cohere`: structured chart fields from a dictated transcript.
pub async fn extract_fields(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Response {
    if let Err(e) = guard::require_session(&state.policy, &jar, resources::FIELD_EXTRACTION) {
        return e.into_response();
    }

    // An unreadable body carries no transcript
    let Ok(Json(req)) = body else {
        return ExtractionError::MissingTranscript.into_response();
    };

    let transcript = req.transcript.unwrap_or_default();
    match state.field_extractor.extract(&transcript).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /api/transcription`
pub async fn receive_transcript(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Response {
    let session = match guard::require_session(&state.policy, &jar, resources::TRANSCRIPTION) {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    let req = match json_body(body) {
        Ok(req) => req,
        Err(e) => return e.into_response(),
    };

    let transcript = req.transcript.unwrap_or_default();
    tracing::info!(
        nurse = %session.username,
        transcript_len = transcript.len(),
        "Transcript received"
    );
    tracing::debug!(transcript = %transcript, "Transcript content");

    Json(json!({ "message": "Transcript received" })).into_response()
}

/// `OPTIONS /api/transcription`
pub async fn transcription_options() -> StatusCode {
    StatusCode::NO_CONTENT
}
