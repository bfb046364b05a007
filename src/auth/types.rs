use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::user::{UserId, UserProfile};

/// JWT claims issued on login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthClaims {
    pub authorized: bool,
    pub user_id: UserId,
    pub iat: i64, // Issued at timestamp (standard JWT claim)
    pub exp: i64, // Expiration timestamp (standard JWT claim)
}

/// Reasons a presented token is rejected. Only ever logged; clients see a
/// uniform "unauthorized".
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is missing a required claim")]
    MissingClaim,
}

/// Identity attached to a request once its bearer token has been validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: UserId,
}

/// Body of both the register and login requests
#[derive(Serialize, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CurrentUserResponse {
    pub message: String,
    pub data: UserProfile,
}
