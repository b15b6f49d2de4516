use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::jwt::JwtKeys;
use crate::error::AppError;

/// Verifies the `Authorization` header before a protected handler runs.
///
/// On success the resulting [`AuthSession`](super::claims::AuthSession) is put
/// into the request extensions, where handlers take it as
/// `Extension<AuthSession>`.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let session = keys.verify(raw)?;
    debug!(user_id = %session.user_id, "request authenticated");

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
