use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{error::AuthError, extractors::PathInput, CurrentUser, PublicUser},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/users/:id", get(get_user))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}

/// Any signed-in user may look up another by id; `null` when there is no such user.
#[instrument(skip(state, viewer), fields(viewer_id = viewer.id))]
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    PathInput(id): PathInput<i64>,
) -> Result<Json<Option<PublicUser>>, AuthError> {
    let user = state.users.find_by_id(id).await?;
    Ok(Json(user.map(Into::into)))
}
