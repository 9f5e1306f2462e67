use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

mod common;
use common::*;

async fn create_user(app: &axum::Router, body: Value) -> axum::response::Response {
    send(app, request(Method::POST, "/api/admin/users", Some(&admin_cookie()), Some(&body))).await
}

async fn login_status(app: &axum::Router, username: &str, password: &str) -> StatusCode {
    let body = json!({ "username": username, "password": password });
    send(app, request(Method::POST, "/api/auth/login", None, Some(&body)))
        .await
        .status()
}

#[tokio::test]
async fn test_list_users_hides_passwords() {
    let (app, _) = create_test_app().await;

    let response = send(&app, request(Method::GET, "/api/admin/users", Some(&admin_cookie()), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("passwordHash").is_none());
        assert!(user["_id"].is_string());
    }
}

#[tokio::test]
async fn test_create_user_then_login() {
    let (app, _) = create_test_app().await;

    let response = create_user(&app, json!({ "username": "c", "password": "pw-c", "role": "nurse" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user"]["role"], "nurse");

    assert_eq!(login_status(&app, "c", "pw-c").await, StatusCode::OK);
}

#[tokio::test]
async fn test_create_user_validation() {
    let (app, _) = create_test_app().await;

    let response = create_user(&app, json!({ "username": "c", "role": "nurse" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Missing required fields");

    let response = create_user(&app, json!({ "username": "c", "password": "x", "role": "doctor" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid role");

    let response = create_user(&app, json!({ "username": "b", "password": "x", "role": "nurse" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_update_user_changes_password_and_role() {
    let (app, state) = create_test_app().await;
    let nurse = state.user_repository.find_by_username(NURSE.0).await.unwrap().unwrap();
    let uri = format!("/api/admin/users/{}", nurse.id);

    let response = send(
        &app,
        request(
            Method::PUT,
            &uri,
            Some(&admin_cookie()),
            Some(&json!({ "username": "", "password": "new-password", "role": "admin" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "User updated successfully");

    assert_eq!(login_status(&app, NURSE.0, NURSE.1).await, StatusCode::UNAUTHORIZED);
    assert_eq!(login_status(&app, NURSE.0, "new-password").await, StatusCode::OK);

    let stored = state.user_repository.find_by_id(nurse.id).await.unwrap().unwrap();
    assert_eq!(stored.username, NURSE.0);
    assert!(stored.role.is_admin());
}

#[tokio::test]
async fn test_update_and_delete_unknown_user() {
    let (app, _) = create_test_app().await;
    let missing = format!("/api/admin/users/{}", uuid::Uuid::new_v4());

    let response = send(&app, request(Method::PUT, &missing, Some(&admin_cookie()), Some(&json!({ "role": "nurse" })))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "User not found");

    let response = send(&app, request(Method::DELETE, &missing, Some(&admin_cookie()), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, request(Method::DELETE, "/api/admin/users/42", Some(&admin_cookie()), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_user() {
    let (app, state) = create_test_app().await;
    let nurse = state.user_repository.find_by_username(NURSE.0).await.unwrap().unwrap();
    let uri = format!("/api/admin/users/{}", nurse.id);

    let response = send(&app, request(Method::DELETE, &uri, Some(&admin_cookie()), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "User deleted successfully");

    assert_eq!(login_status(&app, NURSE.0, NURSE.1).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbidden_to_nurses() {
    let (app, _) = create_test_app().await;

    let body = json!({ "username": "c", "password": "x", "role": "admin" });
    let response = send(&app, request(Method::POST, "/api/admin/users", Some(&nurse_cookie()), Some(&body))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_user_with_patients_is_refused() {
    let (app, state) = create_test_app().await;
    let nurse = state.user_repository.find_by_username(NURSE.0).await.unwrap().unwrap();

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/patients",
            Some(&nurse_cookie()),
            Some(&json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "roomNumber": "7",
                "diagnosis": "Sepsis"
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/api/admin/users/{}", nurse.id);
    let response = send(&app, request(Method::DELETE, &uri, Some(&admin_cookie()), None)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["message"], "User still has assigned patients");

    assert!(state.user_repository.find_by_id(nurse.id).await.unwrap().is_some());
    assert!(state.patient_repository.has_patients(nurse.id).await.unwrap());
}
