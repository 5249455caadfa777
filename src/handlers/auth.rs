use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::CurrentIdentity,
    models::identity::Identity,
    services::registration::RegistrationCandidate,
    services::session::LoginOutcome,
    state::AppState,
};

/// The request payload for user login.
///
/// The handle may arrive as `username` or `email_id`. When both are sent,
/// `username` wins.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// The login handle to verify against.
    pub fn handle(&self) -> Result<&str> {
        self.username
            .as_deref()
            .or(self.email_id.as_deref())
            .ok_or_else(|| AppError::Validation("username or email_id is required".to_string()))
    }
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub status: bool,
    pub message: String,
}

/// The response payload for authentication page requests.
#[derive(Serialize)]
pub struct PageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// The response payload describing the current user.
#[derive(Serialize)]
pub struct MeResponse {
    pub uuid: String,
    pub username: String,
}

fn auth_response(status: StatusCode, ok: bool, message: impl Into<String>) -> Response {
    let body = AuthResponse {
        status: ok,
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

fn with_uuid_header(mut response: Response, id: &str) -> Result<Response> {
    let value = HeaderValue::from_str(id)
        .map_err(|e| AppError::Internal(format!("Invalid uuid header: {}", e)))?;
    response.headers_mut().insert("uuid", value);
    Ok(response)
}

/// Handles the login page.
pub async fn login_page(Extension(current): Extension<CurrentIdentity>) -> impl IntoResponse {
    let response = PageResponse {
        message: "Authentication Page".to_string(),
        username: current.0.map(|identity| identity.username),
    };
    (StatusCode::OK, Json(response))
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    match state.sessions.login(payload.handle()?, &payload.password).await? {
        LoginOutcome::Authenticated { identity, artifact } => {
            cookies.add(artifact.into_cookie());
            tracing::info!("✅ Session cookie added for user: {}", identity.id);

            let response = auth_response(StatusCode::OK, true, "Login Successful");
            with_uuid_header(response, &identity.id)
        }
        LoginOutcome::Rejected => {
            let (status, message) = AppError::InvalidCredentials.status_and_message();
            Ok(auth_response(status, false, message))
        }
    }
}

/// Handles the registration page.
pub async fn register_page() -> impl IntoResponse {
    let response = PageResponse {
        message: "Registration Page".to_string(),
        username: None,
    };
    (StatusCode::OK, Json(response))
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(candidate): Json<RegistrationCandidate>,
) -> Result<Response> {
    tracing::info!("📝 Register attempt for: {}", candidate.username);

    let validation = state.registrar.validate(&candidate).await?;
    if !validation.status {
        return Ok(auth_response(
            StatusCode::UNAUTHORIZED,
            false,
            validation.message,
        ));
    }

    match state.registrar.persist(&candidate).await {
        Ok(registration) => {
            let response = auth_response(StatusCode::OK, true, registration.message);
            with_uuid_header(response, &registration.id.to_string())
        }
        Err(AppError::Validation(message)) => {
            Ok(auth_response(StatusCode::UNAUTHORIZED, false, message))
        }
        Err(e) => Err(e),
    }
}

/// Handles user logout.
///
/// Always succeeds, whether or not a session was present.
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Response {
    state.sessions.clear_session(&cookies);
    tracing::info!("👋 Logout completed");
    auth_response(StatusCode::OK, true, "You have been logged out")
}

/// Returns the identity bound to the current session.
pub async fn me(Extension(identity): Extension<Identity>) -> impl IntoResponse {
    let response = MeResponse {
        uuid: identity.id,
        username: identity.username,
    };
    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login_request(body: &str) -> LoginRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn login_handle_prefers_username_over_email() {
        let both = login_request(
            r#"{"username":"alice","email_id":"alice@example.com","password":"pw"}"#,
        );
        assert_eq!(both.handle().unwrap(), "alice");

        let email_only = login_request(r#"{"email_id":"alice@example.com","password":"pw"}"#);
        assert_eq!(email_only.handle().unwrap(), "alice@example.com");
    }

    #[test]
    fn login_without_a_handle_is_a_validation_error() {
        let request = login_request(r#"{"password":"pw"}"#);

        assert!(matches!(request.handle(), Err(AppError::Validation(_))));
    }
}
