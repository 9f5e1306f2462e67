use crate::auth::policy::AccessDecision;
use crate::auth::session::SessionCodec;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

/// Page-mode access control for browser navigation.
///
/// Decodes the `auth-session` cookie, asks the access policy about the
/// request path and either redirects or passes the request on with the
/// decoded [`crate::auth::Session`] in its extensions.
pub async fn page_access_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    if state.policy.is_public_asset(&path) {
        return next.run(request).await;
    }

    let session = SessionCodec::from_jar(&jar);

    match state.policy.page(&path, session.as_ref()) {
        AccessDecision::Allow => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        AccessDecision::RedirectTo(target) => {
            tracing::debug!(
                path = %path,
                role = session.as_ref().map(|s| s.role.as_str()).unwrap_or("anonymous"),
                target = %target,
                "Redirecting page request"
            );
            Redirect::temporary(target).into_response()
        }
        // Not produced in page mode
        AccessDecision::Deny { status, message } => {
            (status, Json(json!({ "message": message }))).into_response()
        }
    }
}
