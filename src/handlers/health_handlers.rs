use crate::{database, error::ApiError, AppState};
use axum::{extract::State, response::Json};
use serde_json::{json, Value};

/// Database connectivity probe.
pub async fn hello(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let Some(pool) = state.db_pool.as_ref() else {
        return Ok(Json(json!({ "message": "Using in-memory store" })));
    };

    database::health_check(pool)
        .await
        .map_err(ApiError::context("Failed to connect to database"))?;

    Ok(Json(json!({ "message": "Connected to database!" })))
}

/// Liveness probe; answers as long as the process serves requests.
pub async fn liveness_check() -> Json<Value> {
    Json(json!({
        "status": "alive",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
