use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::shared::AppState;

/// Builds the full application router.
///
/// Public routes live under `/api`; everything under `/api/admin` sits
/// behind the bearer token gate.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let protected = Router::new()
        .route("/user", get(auth::current_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::jwt_auth));

    Router::new()
        .nest("/api", public.nest("/admin", protected))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
