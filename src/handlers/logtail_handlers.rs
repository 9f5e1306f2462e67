use crate::auth::guard::{self, resources};
use crate::error::ApiError;
use crate::handlers::json_body;
use crate::services::LogLevel;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use axum::extract::rejection::JsonRejection;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct LogtailRequest {
    #[serde(default)]
    pub message: Value,
    pub level: Option<String>,
}

/// `POST /api/logtail`: forward a client-side log line to the remote sink.
pub async fn send_log(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LogtailRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    guard::require_session(&state.policy, &jar, resources::LOGTAIL)?;
    let req = json_body(body)?;

    let level = LogLevel::parse_lossy(req.level.as_deref());
    let message = match req.message {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    };

    let data = json!({ "message": message, "level": level });

    if state.log_relay.send(&message, level).await {
        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Log sent successfully", "data": data })),
        ))
    } else {
        Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Failed to send log", "data": data })),
        ))
    }
}
