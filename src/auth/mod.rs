// Public API - what other modules can use
pub use handlers::{current_user, login, register};
pub use middleware::jwt_auth;
pub use types::{AuthClaims, AuthContext, TokenError};

// Internal modules
pub mod credentials;
mod handlers;
mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod types;
