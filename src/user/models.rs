use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Unique user identifier, the only identity claim carried by a token
pub type UserId = i64;

/// Database model for the users table (the stored credential record)
#[derive(Clone, FromRow)]
pub struct UserModel {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for UserModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserModel")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl UserModel {
    pub fn new(id: UserId, username: String, password_hash: String) -> Self {
        Self {
            id,
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// The client-facing view of this user, without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}
