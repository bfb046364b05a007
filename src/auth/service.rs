use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{credentials::CredentialVerifier, password::hash_password, token::TokenService};
use crate::shared::AppError;
use crate::user::{UserId, UserRepository};

/// Registration and login on top of the user store and token service
pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    verifier: CredentialVerifier,
    tokens: Arc<TokenService>,
    hash_cost: u32,
}

/// Trims surrounding whitespace and rejects empty fields
fn normalize<'a>(username: &'a str, password: &str) -> Result<&'a str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("username is required".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::BadRequest("password is required".to_string()));
    }
    Ok(username)
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        hash_cost: u32,
    ) -> Self {
        Self {
            verifier: CredentialVerifier::new(Arc::clone(&repository)),
            repository,
            tokens,
            hash_cost,
        }
    }

    /// Stores a new user with a hashed password
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, AppError> {
        let username = normalize(username, password)?;

        let password_hash = hash_password(password.to_string(), self.hash_cost).await?;
        let user_id = self.repository.create(username, &password_hash).await?;

        info!(user_id, "User registered");
        Ok(user_id)
    }

    /// Verifies credentials and issues a token for the user
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let username = normalize(username, password)?;

        let user_id = match self.verifier.verify(username, password).await {
            Ok(user_id) => user_id,
            Err(e @ (AppError::NotFound(_) | AppError::InvalidCredentials)) => {
                warn!(reason = %e, "Login rejected");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        let token = self.tokens.issue(user_id)?;
        info!(user_id, "Login succeeded, token issued");
        Ok(token)
    }
}
