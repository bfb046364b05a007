use tracing::warn;

use crate::shared::AppError;

pub use bcrypt::DEFAULT_COST;

/// Lowest work factor bcrypt accepts
pub const MIN_COST: u32 = 4;

/// bcrypt only reads this many bytes of input, anything past it would be
/// ignored when comparing.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes a password with a fresh salt, on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::BadRequest(format!(
            "password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password hashing task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            warn!(error = %e, "Failed to hash password");
            AppError::Internal
        })
}

/// Checks a password against a stored bcrypt hash. An unreadable hash never
/// matches.
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        warn!("Presented password exceeds bcrypt input limit");
        return Ok(false);
    }

    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            AppError::Internal
        })?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            warn!(error = %e, "Stored password hash could not be parsed");
            Ok(false)
        }
    }
}
