#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use axum_extra::extract::cookie::Cookie;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use ward_notes::{
    auth::{Role, Session, SessionCodec, SESSION_COOKIE},
    config::Settings,
    create_router, AppState,
};

pub const ADMIN: (&str, &str) = ("a", "admin-password");
pub const NURSE: (&str, &str) = ("b", "nurse-password");

/// Settings for an in-memory instance with no outbound services.
pub fn test_settings() -> Settings {
    Settings {
        bind_address: "127.0.0.1:0".to_string(),
        environment: "test".to_string(),
        database_url: None,
        session_max_age_seconds: 3600,
        public_assets: vec!["/logo.png".to_string()],
        static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
        bootstrap_admin_username: None,
        bootstrap_admin_password: None,
        cors_allow_origins: vec!["*".to_string()],
        log_level: "error".to_string(),
        log_format: "plain".to_string(),
        logtail_url: None,
        logtail_token: None,
        cohere_api_key: None,
        cohere_api_url: "http://127.0.0.1:9/v1/chat".to_string(),
        http_timeout_seconds: 5.0,
    }
}

/// Create a test application with seeded admin and nurse accounts.
pub async fn create_test_app() -> (Router, AppState) {
    create_test_app_with(test_settings()).await
}

pub async fn create_test_app_with(settings: Settings) -> (Router, AppState) {
    let state = AppState::in_memory(settings).expect("Failed to create test app state");

    state
        .auth_service
        .create_user(ADMIN.0, ADMIN.1, Role::Admin)
        .await
        .expect("Failed to seed admin");
    state
        .auth_service
        .create_user(NURSE.0, NURSE.1, Role::Nurse)
        .await
        .expect("Failed to seed nurse");

    (create_router(state.clone()), state)
}

/// `Cookie` header value carrying a session, encoded the way the server sets it.
pub fn session_header(username: &str, role: Role) -> String {
    let value = SessionCodec::encode(&Session::new(username, role)).unwrap();
    raw_session_header(&value)
}

pub fn raw_session_header(value: &str) -> String {
    Cookie::new(SESSION_COOKIE, value.to_string())
        .encoded()
        .to_string()
}

pub fn admin_cookie() -> String {
    session_header(ADMIN.0, Role::Admin)
}

pub fn nurse_cookie() -> String {
    session_header(NURSE.0, Role::Nurse)
}

pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn extract_body(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&extract_body(response).await).unwrap()
}

pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// The `name=value` part of the session `Set-Cookie` header.
pub fn set_session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(SESSION_COOKIE))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}
