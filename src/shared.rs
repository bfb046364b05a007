use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{service::AuthService, token::TokenService, TokenError};
use crate::user::repository::UserRepository;

/// Message returned for every failed login, whichever field was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "username or password is incorrect.";

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository>,
    pub token_service: Arc<TokenService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        token_service: TokenService,
        password_hash_cost: u32,
    ) -> Self {
        let token_service = Arc::new(token_service);
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repository),
            Arc::clone(&token_service),
            password_hash_cost,
        ));

        Self {
            user_repository,
            token_service,
            auth_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("username already exists")]
    DuplicateUsername,

    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] TokenError),

    #[error("missing bearer token")]
    MissingToken,

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::DuplicateUsername => (
                StatusCode::BAD_REQUEST,
                "username already exists".to_string(),
            ),
            AppError::Unauthorized(_) | AppError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::StoreUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store unavailable".to_string(),
            ),
            AppError::SigningError(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::auth::password::MIN_COST;
    use crate::user::repository::InMemoryUserRepository;
    use chrono::Duration;

    pub const TEST_SECRET: &str = "test-secret-do-not-use";

    /// Builder for creating AppState with overrides for testing
    pub struct AppStateBuilder {
        token_service: Option<TokenService>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                token_service: None,
            }
        }

        pub fn with_token_service(mut self, service: TokenService) -> Self {
            self.token_service = Some(service);
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                Arc::new(InMemoryUserRepository::new()),
                self.token_service
                    .unwrap_or_else(|| TokenService::new(TEST_SECRET, Duration::hours(1))),
                MIN_COST,
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn status_and_body(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_token_failures_collapse_to_unauthorized() {
        for error in [
            TokenError::Malformed,
            TokenError::InvalidSignature,
            TokenError::Expired,
            TokenError::MissingClaim,
        ] {
            let (status, body) = status_and_body(AppError::Unauthorized(error)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"], "unauthorized");
        }

        let (status, body) = status_and_body(AppError::MissingToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_invalid_credentials_message_is_generic() {
        let (status, body) = status_and_body(AppError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], INVALID_CREDENTIALS_MESSAGE);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_server_error() {
        let (status, body) =
            status_and_body(AppError::StoreUnavailable("connection refused".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "store unavailable");
    }
}
