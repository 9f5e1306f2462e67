use crate::{handlers, middleware, AppState};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

/// Build the full application: JSON API, HTML pages and static assets.
pub fn create_router(state: AppState) -> Router {
    let cors_layer = middleware::create_cors_layer(state.config.cors_allow_origins.clone());

    // API handlers run the access policy themselves
    let api_routes = Router::new()
        .route("/api/hello", get(handlers::hello))
        .route("/api/health/live", get(handlers::liveness_check))
        .route("/api/auth/login", post(handlers::auth_handlers::login))
        .route("/api/auth/logout", post(handlers::auth_handlers::logout))
        .route(
            "/api/patients",
            get(handlers::patient_handlers::get_patients)
                .post(handlers::patient_handlers::create_patient)
                .delete(handlers::patient_handlers::delete_patient),
        )
        .route(
            "/api/entries",
            get(handlers::entry_handlers::get_entries)
                .post(handlers::entry_handlers::create_entry)
                .put(handlers::entry_handlers::update_entry),
        )
        .route(
            "/api/admin/users",
            get(handlers::admin_handlers::list_users).post(handlers::admin_handlers::create_user),
        )
        .route(
            "/api/admin/users/:id",
            put(handlers::admin_handlers::update_user).delete(handlers::admin_handlers::delete_user),
        )
        .route("/api/logtail", post(handlers::logtail_handlers::send_log))
        .route("/api/cohere", post(handlers::extraction_handlers::extract_fields))
        .route(
            "/api/transcription",
            post(handlers::extraction_handlers::receive_transcript)
                .options(handlers::extraction_handlers::transcription_options),
        );

    // Pages and static files go through the page-mode policy
    let page_routes = Router::new()
        .route("/login", get(handlers::page_handlers::login_page))
        .route("/", get(handlers::page_handlers::dashboard_page))
        .route("/patients/:id", get(handlers::page_handlers::patient_page))
        .route("/patients/:id/new-entry", get(handlers::page_handlers::new_entry_page))
        .route(
            "/patients/:id/entries/:entry_id",
            get(handlers::page_handlers::entry_page),
        )
        .route("/admin/users", get(handlers::page_handlers::admin_users_page))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::page_access_middleware,
        ));

    Router::new()
        .merge(api_routes)
        .merge(page_routes)
        .with_state(state)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_logging_middleware))
        .layer(middleware::create_logging_layer())
        .layer(cors_layer)
}
