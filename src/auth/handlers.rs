use axum::{
    extract::{FromRef, State},
    middleware::from_fn_with_state,
    routing::{get, post},
    Extension, Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        claims::AuthSession,
        dto::{LoginRequest, SessionResponse, SignupRequest},
        jwt::JwtKeys,
        middleware::require_auth,
        services,
    },
    error::AppError,
    state::AppState,
    validation::ValidJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn session_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/session", get(current_session))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignupRequest>,
) -> Result<(), AppError> {
    services::signup(state.users.as_ref(), payload).await?;
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let user_id =
        services::signin(state.users.as_ref(), &payload.email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.issue(user_id)?;

    info!(user_id = %user_id, "access token issued");
    Ok(Json(SessionResponse { access_token }))
}

/// Echoes the identity carried by the caller's token.
pub async fn current_session(Extension(session): Extension<AuthSession>) -> Json<AuthSession> {
    Json(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn session_serialization() {
        let session = AuthSession {
            user_id: Uuid::nil(),
            issued_at: OffsetDateTime::UNIX_EPOCH,
            expires_at: OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(60),
        };

        let json = serde_json::to_value(session).unwrap();
        assert_eq!(json["id"], Uuid::nil().to_string());
        assert_eq!(json["issuedAt"], "1970-01-01T00:00:00Z");
        assert_eq!(json["expiration"], "1970-01-01T00:01:00Z");
    }
}
