use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::password::verify_password;
use crate::shared::AppError;
use crate::user::{UserId, UserRepository};

/// Checks presented username/password pairs against the user store
pub struct CredentialVerifier {
    repository: Arc<dyn UserRepository>,
}

impl CredentialVerifier {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Returns the user id when the password matches the stored hash.
    ///
    /// Fails with `NotFound` for an unknown username and `InvalidCredentials`
    /// for a wrong password; callers facing clients must not tell them apart.
    #[instrument(skip(self, password))]
    pub async fn verify(&self, username: &str, password: &str) -> Result<UserId, AppError> {
        let user = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                warn!("Login attempted for unknown username");
                AppError::NotFound("user not found".to_string())
            })?;

        if !verify_password(password.to_string(), user.password_hash).await? {
            warn!(user_id = user.id, "Password did not match stored hash");
            return Err(AppError::InvalidCredentials);
        }

        debug!(user_id = user.id, "Credentials verified");
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::{hash_password, MIN_COST};
    use crate::user::InMemoryUserRepository;

    async fn verifier_with_alice() -> (CredentialVerifier, UserId) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let hash = hash_password("secret123".to_string(), MIN_COST)
            .await
            .unwrap();
        let id = repo.create("alice", &hash).await.unwrap();
        (CredentialVerifier::new(repo), id)
    }

    #[tokio::test]
    async fn test_correct_password() {
        let (verifier, id) = verifier_with_alice().await;
        assert_eq!(verifier.verify("alice", "secret123").await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (verifier, _) = verifier_with_alice().await;
        let result = verifier.verify("alice", "wrongpass").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_username() {
        let (verifier, _) = verifier_with_alice().await;
        let result = verifier.verify("mallory", "secret123").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_username_is_case_sensitive() {
        let (verifier, _) = verifier_with_alice().await;
        let result = verifier.verify("Alice", "secret123").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
