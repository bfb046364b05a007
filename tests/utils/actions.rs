use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

impl TestSetup {
    /// Send a request through the full router
    pub async fn send(&self, request: Request<Body>) -> ApiResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        ApiResponse { status, body }
    }

    async fn post_credentials(&self, uri: &str, username: &str, password: &str) -> ApiResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&self, username: &str, password: &str) -> ApiResponse {
        self.post_credentials("/api/register", username, password)
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResponse {
        self.post_credentials("/api/login", username, password)
            .await
    }

    /// Log in and return the token, panicking if login fails
    pub async fn login_token(&self, username: &str, password: &str) -> String {
        let response = self.login(username, password).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    /// GET /api/admin/user with an optional raw Authorization header value
    pub async fn current_user_with_header(&self, authorization: Option<&str>) -> ApiResponse {
        let mut builder = Request::builder().uri("/api/admin/user");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn current_user(&self, token: &str) -> ApiResponse {
        self.current_user_with_header(Some(&format!("Bearer {}", token)))
            .await
    }
}
