use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::types::{AuthClaims, TokenError};
use crate::config::AppConfig;
use crate::shared::AppError;
use crate::user::UserId;

/// Source of the current time for issuing and checking tokens
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Claims as they arrive from a client. Fields are loosely typed so a token
/// with a valid signature but a missing or odd claim is reported as
/// `MissingClaim` rather than as a parse failure.
#[derive(Deserialize)]
struct PresentedClaims {
    user_id: Option<Value>,
    exp: Option<Value>,
}

fn as_timestamp(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.floor() as i64))
}

/// Issues and validates HS256 bearer tokens with the process-wide secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.api_secret, config.token_ttl)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Creates a signed token for the given user
    #[instrument(skip(self))]
    pub fn issue(&self, user_id: UserId) -> Result<String, AppError> {
        let now = self.clock.now();
        let exp = (now + self.ttl).timestamp();

        debug!(
            ttl_seconds = self.ttl.num_seconds(),
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = AuthClaims {
            authorized: true,
            user_id,
            iat: now.timestamp(),
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::SigningError(e.to_string())
        })
    }

    /// Validates a token and returns the user it was issued for.
    ///
    /// The signature is checked before any claim is read. Expiry is checked
    /// here, with no leeway, rather than by `jsonwebtoken`.
    #[instrument(skip(self, token))]
    pub fn validate(&self, token: &str) -> Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<PresentedClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                match e.kind() {
                    ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                        TokenError::InvalidSignature
                    }
                    _ => TokenError::Malformed,
                }
            })?
            .claims;

        let exp = claims
            .exp
            .as_ref()
            .and_then(as_timestamp)
            .ok_or(TokenError::MissingClaim)?;
        let now = self.clock.now().timestamp();
        if now >= exp {
            debug!(exp, now, "JWT token has expired");
            return Err(TokenError::Expired);
        }

        let user_id = claims
            .user_id
            .as_ref()
            .and_then(Value::as_i64)
            .ok_or(TokenError::MissingClaim)?;

        debug!(user_id, exp, "JWT token decoded successfully");
        Ok(user_id)
    }
}
