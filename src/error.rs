use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::validation::FieldErrors;

/// Every failure a handler can report to the client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("token has expired")]
    ExpiredToken,

    #[error("invalid sign-in information")]
    InvalidSignInInformation,

    #[error("email already exists")]
    AlreadyExistsEmail,

    /// A single field failed a content rule.
    #[error("invalid request")]
    InvalidRequest {
        field: &'static str,
        message: String,
    },

    /// One or more body constraints failed.
    #[error("invalid request")]
    Validation(FieldErrors),

    /// The body, path or query string could not be parsed.
    #[error("{0}")]
    MalformedRequest(String),

    #[error("post not found")]
    PostNotFound,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub validation: BTreeMap<String, String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized
            | AppError::ExpiredToken
            | AppError::InvalidSignInInformation => StatusCode::UNAUTHORIZED,
            AppError::AlreadyExistsEmail => StatusCode::CONFLICT,
            AppError::InvalidRequest { .. }
            | AppError::Validation(_)
            | AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PostNotFound => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorResponse {
        let code = self.status().as_u16().to_string();
        let message = match &self {
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let validation = match self {
            AppError::InvalidRequest { field, message } => {
                BTreeMap::from([(field.to_string(), message)])
            }
            AppError::Validation(errors) => errors.into_map(),
            _ => BTreeMap::new(),
        };
        ErrorResponse {
            code,
            message,
            validation,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Internal(e) => error!(error = ?e, "request failed"),
            other => warn!(%status, error = %other, "request rejected"),
        }
        (status, Json(self.body())).into_response()
    }
}
