pub mod models;
pub mod repository;

pub use models::{UserId, UserModel, UserProfile};
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
