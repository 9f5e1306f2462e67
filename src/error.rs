use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict error: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Unknown error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl ApiError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new authentication error (401)
    pub fn authentication<T: Into<String>>(msg: T) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new authorization error (403)
    pub fn authorization<T: Into<String>>(msg: T) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        Self::Conflict(msg.into())
    }

    /// True for failures of the server or its collaborators, as opposed to
    /// problems with the request itself.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            ApiError::Database(_)
                | ApiError::Migration(_)
                | ApiError::Config(_)
                | ApiError::Configuration(_)
                | ApiError::Io(_)
                | ApiError::Serialization(_)
                | ApiError::HttpClient(_)
                | ApiError::Internal(_)
                | ApiError::Anyhow(_)
        )
    }

    /// Replace a server-side failure with a generic, endpoint-specific 500
    /// message, logging the underlying cause. Client errors pass through.
    ///
    /// ```ignore
    /// repo.list(id).await.map_err(ApiError::context("Failed to fetch patients"))?;
    /// ```
    pub fn context(message: &'static str) -> impl FnOnce(ApiError) -> ApiError {
        move |err| {
            if err.is_server_fault() {
                tracing::error!(error = %err, "{}", message);
                ApiError::Internal(message.to_string())
            } else {
                err
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();

        let (status, message) = match self {
            ApiError::Database(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "database error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            ApiError::Migration(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "database migration error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Database migration error")
            }
            ApiError::Validation(ref msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "validation error occurred"
                );
                (StatusCode::BAD_REQUEST, msg.as_str())
            }
            ApiError::NotFound(ref msg) => {
                tracing::info!(
                    error_id = %error_id,
                    error = %msg,
                    "resource not found"
                );
                (StatusCode::NOT_FOUND, msg.as_str())
            }
            ApiError::Config(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "configuration error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error")
            }
            ApiError::Configuration(ref msg) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %msg,
                    "configuration error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str())
            }
            ApiError::Io(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "IO error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error")
            }
            ApiError::Serialization(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "serialization error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Serialization error")
            }
            ApiError::HttpClient(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "HTTP client error occurred"
                );
                (StatusCode::BAD_GATEWAY, "External service unavailable")
            }
            ApiError::Authentication(ref msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "authentication error occurred"
                );
                (StatusCode::UNAUTHORIZED, msg.as_str())
            }
            ApiError::Authorization(ref msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "authorization error occurred"
                );
                (StatusCode::FORBIDDEN, msg.as_str())
            }
            ApiError::Conflict(ref msg) => {
                tracing::warn!(
                    error_id = %error_id,
                    error = %msg,
                    "conflict error occurred"
                );
                (StatusCode::CONFLICT, msg.as_str())
            }
            ApiError::Internal(ref msg) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %msg,
                    "internal server error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str())
            }
            ApiError::Anyhow(ref err) => {
                tracing::error!(
                    error_id = %error_id,
                    error = %err,
                    "unexpected error occurred"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn test_error_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::validation("Patient ID is required"))
    }

    async fn test_forbidden_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::authorization("Forbidden"))
    }

    async fn test_internal_error_handler() -> Result<&'static str, ApiError> {
        Err(ApiError::internal("Failed to fetch entries"))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_response() {
        let app = Router::new().route("/test", get(test_error_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Patient ID is required");
    }

    #[tokio::test]
    async fn test_authorization_error_response() {
        let app = Router::new().route("/test", get(test_forbidden_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!({ "message": "Forbidden" }));
    }

    #[tokio::test]
    async fn test_internal_error_response() {
        let app = Router::new().route("/test", get(test_internal_error_handler));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Failed to fetch entries");
    }

    #[test]
    fn test_context_masks_server_faults_only() {
        let masked = ApiError::context("Failed to add patient")(ApiError::internal("pool closed"));
        assert!(matches!(masked, ApiError::Internal(ref m) if m == "Failed to add patient"));

        let passthrough = ApiError::context("Failed to add patient")(ApiError::not_found("User not found"));
        assert!(matches!(passthrough, ApiError::NotFound(ref m) if m == "User not found"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(ApiError::validation("test"), ApiError::Validation(_)));
        assert!(matches!(ApiError::not_found("test"), ApiError::NotFound(_)));
        assert!(matches!(ApiError::internal("test"), ApiError::Internal(_)));
        assert!(matches!(ApiError::authentication("test"), ApiError::Authentication(_)));
        assert!(matches!(ApiError::authorization("test"), ApiError::Authorization(_)));
        assert!(matches!(ApiError::conflict("test"), ApiError::Conflict(_)));
    }
}
