use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{claims::AuthSession, middleware::require_auth},
    error::AppError,
    posts::{
        dto::{PostCreate, PostEdit, PostResponse, PostSearch},
        services,
    },
    state::AppState,
    validation::{AppPath, AppQuery, ValidJson},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
}

/// Routes that need a verified bearer token.
pub fn write_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", patch(edit_post).delete(delete_post))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    ValidJson(payload): ValidJson<PostCreate>,
) -> Result<(), AppError> {
    services::write(
        state.posts.as_ref(),
        &state.config.posts.banned_title_words,
        payload,
    )
    .await?;
    Ok(())
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<PostResponse>, AppError> {
    Ok(Json(services::get(state.posts.as_ref(), id).await?))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AppQuery(search): AppQuery<PostSearch>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    Ok(Json(services::get_list(state.posts.as_ref(), search).await?))
}

#[instrument(skip(state, session, payload), fields(user_id = %session.user_id))]
pub async fn edit_post(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    AppPath(id): AppPath<i64>,
    ValidJson(payload): ValidJson<PostEdit>,
) -> Result<(), AppError> {
    services::edit(
        state.posts.as_ref(),
        &state.config.posts.banned_title_words,
        id,
        payload,
    )
    .await?;
    Ok(())
}

#[instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    AppPath(id): AppPath<i64>,
) -> Result<(), AppError> {
    services::delete(state.posts.as_ref(), id).await
}
