pub mod admin_handlers;
pub mod auth_handlers;
pub mod entry_handlers;
pub mod extraction_handlers;
pub mod health_handlers;
pub mod logtail_handlers;
pub mod page_handlers;
pub mod patient_handlers;

pub use health_handlers::{hello, liveness_check};

use crate::error::ApiError;
use axum::{extract::rejection::JsonRejection, Json};
use crate::services::LogLevel;
use crate::AppState;
use uuid::Uuid;

/// Like [`ApiError::context`], additionally reporting server faults to the
/// remote log sink.
pub(crate) fn masked(
    state: &AppState,
    message: &'static str,
) -> impl FnOnce(ApiError) -> ApiError {
    let relay = state.log_relay.clone();
    move |err| {
        if err.is_server_fault() {
            relay.spawn_send(format!("{}: {}", message, err), LogLevel::Error);
        }
        ApiError::context(message)(err)
    }
}

/// Ids arrive as free text in queries and bodies; anything that is not a
/// UUID cannot name an existing record.
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Handlers take their body as `Result<Json<T>, JsonRejection>` so that the
/// access check runs before the body is looked at; this unwraps it afterwards
/// into a JSON `400`.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected request body");
            Err(ApiError::validation("Invalid request body"))
        }
    }
}
