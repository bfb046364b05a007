use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{UserId, UserModel};
use crate::shared::AppError;

/// Trait for user store operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserModel>, AppError>;
    /// Stores a new user, failing with `DuplicateUsername` if the name is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<UserId, AppError>;
}

#[derive(Default)]
struct UserTable {
    next_id: UserId,
    by_id: HashMap<UserId, UserModel>,
    id_by_username: HashMap<String, UserId>,
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is lost when the process exits.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.table.read().await.by_id.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let table = self.table.read().await;
        let user = table
            .id_by_username
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .cloned();

        debug!(found = user.is_some(), "Looked up user by username in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserModel>, AppError> {
        let user = self.table.read().await.by_id.get(&id).cloned();

        debug!(found = user.is_some(), "Looked up user by id in memory");
        Ok(user)
    }

    #[instrument(skip(self, password_hash))]
    async fn create(&self, username: &str, password_hash: &str) -> Result<UserId, AppError> {
        let mut table = self.table.write().await;
        if table.id_by_username.contains_key(username) {
            warn!("Username already exists in memory");
            return Err(AppError::DuplicateUsername);
        }

        table.next_id += 1;
        let id = table.next_id;
        table
            .by_id
            .insert(id, UserModel::new(id, username.to_string(), password_hash.to_string()));
        table.id_by_username.insert(username.to_string(), id);

        debug!(user_id = id, "User created in memory");
        Ok(id)
    }
}

/// PostgreSQL implementation of the user store
///
/// Expects a table of the form:
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
/// );
/// ```
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "User store query failed");
    AppError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        debug!("Fetching user by username from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserModel>, AppError> {
        debug!("Fetching user by id from database");

        sqlx::query_as::<_, UserModel>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)
    }

    #[instrument(skip(self, password_hash))]
    async fn create(&self, username: &str, password_hash: &str) -> Result<UserId, AppError> {
        debug!("Creating user in database");

        let id: UserId = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if unique_violation {
                warn!("Username already exists in database");
                AppError::DuplicateUsername
            } else {
                store_error(e)
            }
        })?;

        debug!(user_id = id, "User created in database");
        Ok(id)
    }
}
