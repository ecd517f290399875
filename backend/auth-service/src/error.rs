use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for every core operation.
///
/// Each operation fails with exactly one of these kinds; the HTTP boundary
/// maps kinds to status codes. `Database` and `Internal` never surface their
/// payload to the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("This account uses a different sign-in method")]
    ProviderMismatch,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token has already been used")]
    TokenUsed,

    #[error("Email address is not verified")]
    UnverifiedEmail,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::EmailTaken | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Internal kinds collapse to a generic message; full detail stays in the
    /// logs.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::Internal(_) => {
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Database(msg) | AuthError::Internal(msg) = &self {
            tracing::error!(error = %msg, "request failed with internal error");
        }

        let body = Json(json!({
            "ok": false,
            "error": self.public_message(),
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        AuthError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP client error: {}", err);
        AuthError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_validation_kinds_map_to_bad_request() {
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AuthError::Validation("email: invalid".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn authentication_kinds_map_to_unauthorized() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::AccountBlocked,
            AuthError::ProviderMismatch,
            AuthError::TokenInvalid,
            AuthError::TokenExpired,
            AuthError::TokenUsed,
            AuthError::UnverifiedEmail,
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = AuthError::Database("connection refused to 10.0.0.3:5432".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "An unexpected error occurred");
    }
}
