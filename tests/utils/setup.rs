use axum::Router;
use chrono::Duration;
use std::sync::Arc;

use keygate::{auth::password::MIN_COST, router, AppState, InMemoryUserRepository, TokenService};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const TEST_SECRET: &str = "integration-test-secret";

#[derive(Clone)]
pub struct TestSetup {
    pub app: Router,
    pub state: AppState,
    pub repository: Arc<InMemoryUserRepository>,
}

pub struct TestSetupBuilder {
    token_ttl: Duration,
    users: Vec<(String, String)>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            token_ttl: Duration::hours(1),
            users: vec![],
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Pre-registers a user through the auth service
    pub fn with_user(mut self, username: &str, password: &str) -> Self {
        self.users.push((username.to_string(), password.to_string()));
        self
    }

    pub async fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryUserRepository::new());
        let state = AppState::new(
            repository.clone(),
            TokenService::new(TEST_SECRET, self.token_ttl),
            MIN_COST,
        );

        for (username, password) in &self.users {
            state
                .auth_service
                .register(username, password)
                .await
                .unwrap();
        }

        TestSetup {
            app: router(state.clone()),
            state,
            repository,
        }
    }
}
