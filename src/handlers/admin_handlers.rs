use crate::auth::guard::{self, resources};
use crate::auth::rbac::Role;
use crate::error::ApiError;
use crate::handlers::{json_body, masked, parse_id};
use crate::models::{user::non_blank, CreateUserRequest, UpdateUserRequest};
use crate::repositories::user_repo::USER_HAS_PATIENTS;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum::extract::rejection::JsonRejection;
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

const INTERNAL: &str = "Internal server error";

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    Role::from_str(raw.trim()).ok_or_else(|| ApiError::validation("Invalid role"))
}

/// `GET /api/admin/users`
pub async fn list_users(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    guard::require_session(&state.policy, &jar, resources::ADMIN_USERS)?;

    let users = state
        .user_repository
        .list()
        .await
        .map_err(masked(&state, INTERNAL))?;

    Ok(Json(json!({ "users": users })))
}

/// `POST /api/admin/users`
pub async fn create_user(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let admin = guard::require_session(&state.policy, &jar, resources::ADMIN_USERS)?;
    let req = json_body(body)?;

    let (Some(username), Some(password), Some(role)) = (
        non_blank(req.username),
        req.password.filter(|p| !p.is_empty()),
        non_blank(req.role),
    ) else {
        return Err(ApiError::validation("Missing required fields"));
    };
    let role = parse_role(&role)?;

    let user = state
        .auth_service
        .create_user(&username, &password, role)
        .await
        .map_err(masked(&state, INTERNAL))?;

    tracing::info!(admin = %admin.username, username = %user.username, role = %user.role, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user,
        })),
    ))
}

/// `PUT /api/admin/users/:id`. Blank fields are left unchanged.
pub async fn update_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let admin = guard::require_session(&state.policy, &jar, resources::ADMIN_USERS)?;
    let req = json_body(body)?;

    let role = non_blank(req.role).map(|r| parse_role(&r)).transpose()?;
    let id = parse_id(&id).ok_or_else(|| ApiError::not_found("User not found"))?;

    let user = state
        .auth_service
        .update_user(
            id,
            non_blank(req.username),
            req.password.filter(|p| !p.is_empty()),
            role,
        )
        .await
        .map_err(masked(&state, INTERNAL))?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(admin = %admin.username, username = %user.username, "Account updated");

    Ok(Json(json!({ "message": "User updated successfully" })))
}

/// `DELETE /api/admin/users/:id`
pub async fn delete_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let admin = guard::require_session(&state.policy, &jar, resources::ADMIN_USERS)?;

    let id = parse_id(&id).ok_or_else(|| ApiError::not_found("User not found"))?;

    // Deleting an account never takes patient records with it
    if state
        .patient_repository
        .has_patients(id)
        .await
        .map_err(masked(&state, INTERNAL))?
    {
        return Err(ApiError::conflict(USER_HAS_PATIENTS));
    }

    let deleted = state
        .user_repository
        .delete(id)
        .await
        .map_err(masked(&state, INTERNAL))?;

    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(admin = %admin.username, user_id = %id, "Account deleted");

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
