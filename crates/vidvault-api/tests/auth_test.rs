//! Account API integration tests.
//!
//! Run with: `cargo test -p vidvault-api --test auth_test`

mod helpers;

use helpers::auth::{login, register_test_user, TEST_PASSWORD};
use helpers::setup_test_app;
use serde_json::json;

#[tokio::test]
async fn test_register_and_login() {
    let app = setup_test_app().await;
    let client = app.client();

    let user = register_test_user(client, "alice").await;
    assert!(!user.token.is_empty());

    let response = client
        .get("/api/library")
        .add_header("Authorization", user.bearer())
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_duplicate_username_conflicts() {
    let app = setup_test_app().await;
    let client = app.client();
    register_test_user(client, "alice").await;

    let response = client
        .post("/api/auth/register")
        .json(&json!({ "username": "alice", "password": TEST_PASSWORD }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/auth/register")
        .json(&json!({ "username": "alice", "password": "short" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = setup_test_app().await;
    let client = app.client();
    register_test_user(client, "alice").await;

    let wrong_password = client
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "not-the-password" }))
        .await;
    assert_eq!(wrong_password.status_code(), 401);

    let unknown_user = client
        .post("/api/auth/login")
        .json(&json!({ "username": "bob", "password": TEST_PASSWORD }))
        .await;
    assert_eq!(unknown_user.status_code(), 401);

    let a: serde_json::Value = wrong_password.json();
    let b: serde_json::Value = unknown_user.json();
    assert_eq!(a["error"], b["error"]);

    // Still able to log in afterwards
    assert!(!login(client, "alice", TEST_PASSWORD).await.is_empty());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup_test_app().await;
    let client = app.client();

    assert_eq!(client.get("/api/library").await.status_code(), 401);
    assert_eq!(client.get("/api/check_upload_limit").await.status_code(), 401);

    let bad_token = client
        .get("/api/library")
        .add_header("Authorization", "Bearer not.a.jwt")
        .await;
    assert_eq!(bad_token.status_code(), 401);
}

#[tokio::test]
async fn test_health_and_openapi_are_public() {
    let app = setup_test_app().await;
    let client = app.client();

    let health = client.get("/health").await;
    assert_eq!(health.status_code(), 200);
    let body: serde_json::Value = health.json();
    assert_eq!(body["status"], "healthy");

    let openapi = client.get("/api/openapi.json").await;
    assert_eq!(openapi.status_code(), 200);
    let doc: serde_json::Value = openapi.json();
    assert!(doc["paths"]["/finalize_upload"].is_object());
}
