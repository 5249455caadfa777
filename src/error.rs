use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Wrong username/secret pair. Never says which half was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The token signature is intact but its lifetime has lapsed.
    #[error("Session token expired")]
    TokenExpired,

    /// The token could not be parsed or its signature does not match.
    #[error("Session token malformed")]
    TokenMalformed,

    /// No session artifact was presented on a protected route.
    #[error("Authentication required")]
    Unauthorized,

    /// The credential store failed or did not answer in time.
    #[error("Credential verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The process was started with unusable settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The HTTP status and client-facing message for this error.
    ///
    /// Server-side faults never leak their detail to the client.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Incorrect Username and password".to_string(),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "Session expired, please log in again".to_string(),
            ),
            AppError::TokenMalformed => (StatusCode::UNAUTHORIZED, "Invalid session".to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not Authorized".to_string()),
            AppError::VerifierUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Authentication service unavailable, please retry".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Configuration(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidCredentials => tracing::debug!("Invalid credentials"),
            AppError::TokenExpired => tracing::debug!("Session token expired"),
            AppError::TokenMalformed => tracing::warn!("Rejected malformed session token"),
            AppError::Unauthorized => tracing::debug!("Missing session on protected route"),
            AppError::VerifierUnavailable(msg) => {
                tracing::error!("Credential verifier unavailable: {}", msg)
            }
            AppError::Validation(msg) => tracing::debug!("Validation error: {}", msg),
            AppError::Configuration(msg) => tracing::error!("Configuration error: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
        }

        let (status, message) = self.status_and_message();
        let body = sonic_rs::to_string(&sonic_rs::json!({
            "status": false,
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"status":false,"error":"Internal server error"}"#.to_string());

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
