/*
 * Responsibility
 * - error types for the codec, the guard and configuration
 * - IntoResponse for GuardError (HTTP status + JSON error body)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Why the token codec refused a token.
///
/// The guard never surfaces these to callers; they only reach the logs.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no token present")]
    Missing,

    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),

    #[error("unexpected token context: {0}")]
    ContextMismatch(String),

    #[error("'sub' does not match 'user_id'")]
    SubjectMismatch,

    #[error("token lifetime of {0}s does not fit a timestamp")]
    TtlOutOfRange(u64),

    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("unauthenticated")]
    Unauthenticated,

    /// Token issuing was requested before any user was set.
    #[error("no current user to issue a token for")]
    NoCurrentUser,

    #[error(transparent)]
    Token(#[from] TokenError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl GuardError {
    pub fn status(&self) -> StatusCode {
        match self {
            GuardError::Unauthenticated => StatusCode::UNAUTHORIZED,
            GuardError::NoCurrentUser | GuardError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        let (code, message) = match self {
            GuardError::Unauthenticated => ("UNAUTHORIZED", "unauthorized".to_string()),
            // Signing failures and contract violations are server-side; keep the detail in logs.
            GuardError::NoCurrentUser | GuardError::Token(_) => {
                ("INTERNAL_SERVER_ERROR", "internal server error".to_string())
            }
        };

        ErrorResponse {
            error: ErrorBody { code, message },
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        if !matches!(self, GuardError::Unauthenticated) {
            tracing::error!(error = %self, "authentication guard failure");
        }
        (self.status(), Json(self.to_body())).into_response()
    }
}
