// Library crate for the keygate auth service
// This file exposes the public API for integration tests

pub mod auth;
pub mod config;
pub mod routes;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use auth::{token::TokenService, AuthContext, TokenError};
pub use config::{AppConfig, ConfigError};
pub use routes::router;
pub use shared::{AppError, AppState};
pub use user::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
