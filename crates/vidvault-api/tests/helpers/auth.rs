use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "TestPassword123!";

/// Registered and logged-in user
pub struct TestUser {
    pub username: String,
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Register `username` through the API and log in; panics on any failure.
pub async fn register_test_user(client: &TestServer, username: &str) -> TestUser {
    let register = client
        .post("/api/auth/register")
        .json(&json!({ "username": username, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(register.status_code(), 201, "{}", register.text());
    let body: serde_json::Value = register.json();
    let user_id = Uuid::parse_str(body["id"].as_str().expect("Expected 'id' in response"))
        .expect("Invalid UUID in register response");

    let token = login(client, username, TEST_PASSWORD).await;

    TestUser {
        username: username.to_string(),
        user_id,
        token,
    }
}

pub async fn login(client: &TestServer, username: &str, password: &str) -> String {
    let response = client
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let body: serde_json::Value = response.json();
    body["token"]
        .as_str()
        .expect("Expected 'token' in login response")
        .to_string()
}
