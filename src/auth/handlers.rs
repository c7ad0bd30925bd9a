use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        error::AuthError,
        extractors::JsonInput,
        services,
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonInput(payload): JsonInput<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let outcome = services::register(state.users.as_ref(), &state.keys, payload).await?;
    let cookie = state
        .cookies
        .set(&outcome.token)
        .map_err(AuthError::Internal)?;

    info!(user_id = outcome.user.id, email = %outcome.user.email, "user registered");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(RegisterResponse {
            success: true,
            user: outcome.user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonInput(payload): JsonInput<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let outcome = services::login(state.users.as_ref(), &state.keys, payload).await?;
    let cookie = state
        .cookies
        .set(&outcome.token)
        .map_err(AuthError::Internal)?;

    info!(user_id = outcome.user.id, email = %outcome.user.email, "user logged in");
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            user: outcome.user.into(),
        }),
    ))
}

/// Drops the client's cookie. Tokens are not revoked server-side.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("session cookie cleared");
    ([(SET_COOKIE, state.cookies.clear())], Json(true))
}
