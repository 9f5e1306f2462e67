use crate::auth::policy::{AccessDecision, AccessPolicy};
use crate::auth::session::{Session, SessionCodec};
use crate::error::ApiError;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

/// Policy paths for the API surface. Each handler checks the area it serves,
/// not the literal `/api/...` URL, so `/api/admin/users` is judged as
/// `/admin/users`.
pub mod resources {
    pub const LOGIN: &str = crate::auth::policy::LOGIN_PATH;
    pub const PATIENTS: &str = "/patients";
    pub const ENTRIES: &str = "/entries";
    pub const ADMIN_USERS: &str = "/admin/users";
    pub const LOGTAIL: &str = crate::auth::policy::LOGTAIL_PATH;
    pub const FIELD_EXTRACTION: &str = "/api/cohere";
    pub const TRANSCRIPTION: &str = "/api/transcription";
}

/// Run the access policy in API mode for `resource`.
///
/// Returns the decoded session (which may be absent for public resources such
/// as the login endpoint) or the 401/403 error to send back.
pub fn check(
    policy: &AccessPolicy,
    jar: &CookieJar,
    resource: &str,
) -> Result<Option<Session>, ApiError> {
    let session = SessionCodec::from_jar(jar);

    match policy.api(resource, session.as_ref()) {
        AccessDecision::Allow => Ok(session),
        AccessDecision::Deny { status, message } if status == StatusCode::FORBIDDEN => {
            Err(ApiError::authorization(message))
        }
        AccessDecision::Deny { message, .. } => Err(ApiError::authentication(message)),
        // API mode never redirects
        AccessDecision::RedirectTo(_) => Err(ApiError::authorization(
            crate::auth::policy::FORBIDDEN_MESSAGE,
        )),
    }
}

/// Like [`check`], for resources that only make sense with a session.
pub fn require_session(
    policy: &AccessPolicy,
    jar: &CookieJar,
    resource: &str,
) -> Result<Session, ApiError> {
    check(policy, jar, resource)?.ok_or_else(|| {
        ApiError::authentication(crate::auth::policy::UNAUTHENTICATED_MESSAGE)
    })
}
