use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::types::{
    AuthContext, CredentialsRequest, CurrentUserResponse, MessageResponse, TokenResponse,
};
use crate::shared::{AppError, AppState};

fn parse_body(
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(error = %rejection, "Rejected credentials payload");
        AppError::BadRequest(rejection.body_text())
    })
}

/// POST /api/register
#[instrument(name = "register", skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let input = parse_body(payload)?;

    state
        .auth_service
        .register(&input.username, &input.password)
        .await?;

    Ok(Json(MessageResponse {
        message: "registration success".to_string(),
    }))
}

/// POST /api/login
///
/// Returns a bearer token on success
#[instrument(name = "login", skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let input = parse_body(payload)?;

    let token = state
        .auth_service
        .login(&input.username, &input.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// GET /api/admin/user, behind the bearer token gate
#[instrument(name = "current_user", skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let user = state
        .user_repository
        .find_by_id(ctx.user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = ctx.user_id, "Token refers to a user that no longer exists");
            AppError::NotFound("user not found".to_string())
        })?;

    info!(user_id = user.id, "Resolved current user");

    Ok(Json(CurrentUserResponse {
        message: "success".to_string(),
        data: user.profile(),
    }))
}
