use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{
    cookie::read_token, error::AuthError, jwt::JwtKeys, repo::UserStore, repo_types::User,
};
use crate::state::AppState;

/// The authenticated user. Naming it as a handler argument is what guards the handler.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(
            state.users.as_ref(),
            &state.keys,
            &parts.headers,
            OffsetDateTime::now_utc(),
        )
        .await?;
        Ok(CurrentUser(user))
    }
}

/// Resolves the session cookie in `headers` to a live user, checking expiry against `now`.
///
/// Nothing is cached: every call verifies the token and reloads the user.
pub async fn authenticate(
    store: &dyn UserStore,
    keys: &JwtKeys,
    headers: &HeaderMap,
    now: OffsetDateTime,
) -> Result<User, AuthError> {
    let Some(token) = read_token(headers) else {
        debug!("no session cookie");
        return Err(AuthError::NoSession);
    };

    let claim = keys.verify_at(&token, now).map_err(|e| {
        warn!(reason = %e, "session token rejected");
        AuthError::from(e)
    })?;

    match store.find_by_id(claim.subject_id).await? {
        Some(user) => {
            debug!(user_id = user.id, expires_at = %claim.expires_at, "session verified");
            Ok(user)
        }
        None => {
            warn!(user_id = claim.subject_id, "session subject no longer exists");
            Err(AuthError::SessionExpired)
        }
    }
}

/// JSON body whose rejections (bad syntax, unknown fields, missing fields) use the API error shape.
pub struct JsonInput<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonInput<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AuthError::InvalidInput(rejection.body_text()))?;
        Ok(JsonInput(value))
    }
}

/// `Path` with its rejection rendered in the JSON error envelope.
#[derive(Debug)]
pub struct PathInput<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathInput<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AuthError::InvalidInput(rejection.body_text()))?;
        Ok(PathInput(value))
    }
}
