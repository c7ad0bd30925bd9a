use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use super::{jwt::TokenError, repo::StoreError};

/// Every failure the auth surface reports. Messages are safe to show to users.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password must be at least 6 characters long")]
    WeakPassword,
    #[error("Email already exists")]
    DuplicateEmail,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Not logged in")]
    NoSession,
    #[error("Session expired. Please login again!")]
    SessionExpired,
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: &'static str,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidInput(_) => "BAD_USER_INPUT",
            AuthError::InvalidEmail => "INVALID_EMAIL",
            AuthError::WeakPassword => "WEAK_PASSWORD",
            AuthError::DuplicateEmail => "DUPLICATE_EMAIL",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::NoSession => "NO_SESSION",
            AuthError::SessionExpired => "SESSION_EXPIRED",
            AuthError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) | AuthError::InvalidEmail | AuthError::WeakPassword => {
                StatusCode::BAD_REQUEST
            }
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::NoSession | AuthError::SessionExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Other(e) => AuthError::Internal(e),
        }
    }
}

// The guard never tells the client which check failed.
impl From<TokenError> for AuthError {
    fn from(_: TokenError) -> Self {
        AuthError::SessionExpired
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(ref e) = self {
            error!(error = ?e, "internal error");
        }
        let body = ErrorBody {
            message: self.to_string(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}
