use crate::auth::guard::{self, resources};
use crate::auth::session::{cleared_session_cookie, session_cookie, Session, SessionCodec};
use crate::error::ApiError;
use crate::handlers::{json_body, masked};
use crate::models::{user::non_blank, LoginRequest, UserSummary};
use crate::services::LogLevel;
use crate::AppState;
use axum::{extract::State, Json};
use axum::extract::rejection::JsonRejection;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    guard::check(&state.policy, &jar, resources::LOGIN)?;
    let req = json_body(body)?;

    let (Some(username), Some(password)) = (
        non_blank(req.username),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::validation("Username and password are required"));
    };

    let user = state
        .auth_service
        .login(&username, &password)
        .await
        .map_err(masked(&state, "Internal server error"))?;

    state
        .log_relay
        .spawn_send(format!("User role: {}", user.role), LogLevel::Debug);

    let value = SessionCodec::encode(&Session::new(user.username.clone(), user.role))?;
    let cookie = session_cookie(
        value,
        state.config.session_max_age_seconds,
        state.config.is_production(),
    );

    Ok((
        jar.add(cookie),
        Json(json!({
            "message": "Login successful",
            "user": UserSummary::from(&user),
        })),
    ))
}

/// `POST /api/auth/logout`. Always succeeds, with or without a session.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.add(cleared_session_cookie()),
        Json(json!({ "message": "Logged out successfully" })),
    )
}
