use axum::http::StatusCode;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::auth::jwt::TokenType;

/// Standard error type for the coinvert API.
///
/// Variants are grouped into a small closed set of categories (see
/// [`ErrorKind`]); the HTTP boundary dispatches on the category and variant
/// to pick a status code, and the message is surfaced verbatim to the client
/// as `{"detail": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    // ── Auth: credential / header problems at the request boundary ──
    #[error("Invalid request")]
    MissingHeader,

    #[error("Invalid request")]
    CsrfMismatch,

    // ── Token: lifecycle failures ──
    #[error("{0}")]
    MalformedAuthorizationHeader(String),

    #[error("Invalid request data, please login firstly")]
    NoRefreshToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Expected {expected} token, got {got}")]
    WrongTokenType { expected: TokenType, got: TokenType },

    #[error("Token has been revoked")]
    RevokedToken,

    // ── User ──
    #[error("Invalid username or password")]
    NotAuthorized,

    #[error("User not found")]
    UserNotFound,

    #[error("User with '{username}' username or '{email}' email exists")]
    UserAlreadyExists { username: String, email: String },

    // ── Currency ──
    #[error("{0}")]
    InvalidSymbol(String),

    // ── Request payload shape ──
    #[error("Validation errors")]
    Validation(Vec<ValidationDetail>),

    // ── Infrastructure ──
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error category, one per branch of the domain taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Token,
    User,
    Currency,
    Validation,
    Internal,
}

impl ApiError {
    /// Get the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingHeader | ApiError::CsrfMismatch => ErrorKind::Auth,
            ApiError::MalformedAuthorizationHeader(_)
            | ApiError::NoRefreshToken
            | ApiError::TokenExpired
            | ApiError::InvalidToken
            | ApiError::WrongTokenType { .. }
            | ApiError::RevokedToken => ErrorKind::Token,
            ApiError::NotAuthorized
            | ApiError::UserNotFound
            | ApiError::UserAlreadyExists { .. } => ErrorKind::User,
            ApiError::InvalidSymbol(_) => ErrorKind::Currency,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Database(_) | ApiError::Upstream(_) | ApiError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingHeader | ApiError::CsrfMismatch => StatusCode::BAD_REQUEST,
            ApiError::MalformedAuthorizationHeader(_)
            | ApiError::NoRefreshToken
            | ApiError::TokenExpired
            | ApiError::InvalidToken
            | ApiError::WrongTokenType { .. }
            | ApiError::RevokedToken
            | ApiError::NotAuthorized => StatusCode::UNAUTHORIZED,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::UserAlreadyExists { .. } => StatusCode::CONFLICT,
            ApiError::InvalidSymbol(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) | ApiError::Upstream(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Field-level validation error, reported as a structured detail list
/// distinct from the domain-error taxonomy.
///
/// ```json
/// {
///   "type": "email",
///   "field": "email",
///   "message": "must be a valid email address",
///   "input": "not-an-email"
/// }
/// ```
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub field: String,
    pub message: String,
    pub input: serde_json::Value,
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        let body = match &self {
            ApiError::Validation(details) => json!({ "details": details }),
            ApiError::Database(_) | ApiError::Upstream(_) | ApiError::Internal(_) => {
                // Never leak internals to the client.
                tracing::error!(error = %self, "internal error");
                json!({ "detail": "Internal server error" })
            }
            _ => json!({ "detail": self.to_string() }),
        };

        (status, axum::Json(body)).into_response()
    }
}
