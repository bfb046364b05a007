use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument, warn};

use super::types::AuthContext;
use crate::shared::{AppError, AppState};

const BEARER_PREFIX: &str = "Bearer ";

/// Pulls the raw token out of an `Authorization: Bearer <token>` header value
fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a valid bearer token; otherwise the request
/// continues with an `AuthContext` in its extensions.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn jwt_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or_else(|| {
        warn!("Missing or non-Bearer Authorization header");
        AppError::MissingToken
    })?;

    let user_id = state.token_service.validate(token).map_err(|reason| {
        warn!(%reason, "Bearer token rejected");
        AppError::Unauthorized(reason)
    })?;

    debug!(user_id, "Authentication successful, adding context to request");
    req.extensions_mut().insert(AuthContext { user_id });

    Ok(next.run(req).await)
}
