//! Login and logout orchestration.

use std::sync::Arc;
use std::time::Duration;

use tower_cookies::cookie::{SameSite, time::Duration as CookieDuration};
use tower_cookies::{Cookie, Cookies};

use crate::{
    crypto::token::TokenCodec,
    error::{AppError, Result},
    models::identity::Identity,
    services::credentials::CredentialVerifier,
};

/// Name of the cookie carrying the session token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// The transport-level carrier of a session token.
#[derive(Debug, Clone)]
pub struct SessionArtifact(Cookie<'static>);

impl SessionArtifact {
    /// The signed token string, or empty for a removal artifact.
    pub fn value(&self) -> &str {
        self.0.value()
    }

    pub fn into_cookie(self) -> Cookie<'static> {
        self.0
    }
}

/// Result of a login attempt.
///
/// Wrong passwords and unknown usernames both produce `Rejected`.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated {
        identity: Identity,
        artifact: SessionArtifact,
    },
    Rejected,
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }

    pub fn subject_id(&self) -> Option<&str> {
        match self {
            LoginOutcome::Authenticated { identity, .. } => Some(&identity.id),
            LoginOutcome::Rejected => None,
        }
    }

    pub fn artifact(&self) -> Option<&SessionArtifact> {
        match self {
            LoginOutcome::Authenticated { artifact, .. } => Some(artifact),
            LoginOutcome::Rejected => None,
        }
    }
}

/// Creates the session cookie with the given value and max age.
fn create_secure_cookie(value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_TOKEN_COOKIE, value);
    cookie.set_http_only(true);
    if secure {
        cookie.set_secure(true);
    }
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::seconds(max_age_secs));
    cookie.set_path("/");
    cookie
}

/// Owns the session artifact lifecycle: creation at login, destruction at
/// logout.
#[derive(Clone)]
pub struct SessionManager {
    verifier: Arc<dyn CredentialVerifier>,
    codec: TokenCodec,
    verifier_timeout: Duration,
    secure_cookies: bool,
}

impl SessionManager {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        codec: TokenCodec,
        verifier_timeout: Duration,
        secure_cookies: bool,
    ) -> Self {
        Self {
            verifier,
            codec,
            verifier_timeout,
            secure_cookies,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verifies credentials and, on success, mints a session artifact.
    ///
    /// Invalid credentials are a normal `Rejected` outcome. Only a verifier
    /// failure or timeout is an error (`AppError::VerifierUnavailable`).
    pub async fn login(&self, claimed_username: &str, claimed_secret: &str) -> Result<LoginOutcome> {
        tracing::info!("🔐 Login attempt for: {}", claimed_username);

        let verified = tokio::time::timeout(
            self.verifier_timeout,
            self.verifier.verify(claimed_username, claimed_secret),
        )
        .await
        .map_err(|_| {
            tracing::error!(
                "❌ Credential check timed out after {:?}",
                self.verifier_timeout
            );
            AppError::VerifierUnavailable("credential check timed out".to_string())
        })??;

        let Some(identity) = verified else {
            tracing::warn!("❌ Login rejected for: {}", claimed_username);
            return Ok(LoginOutcome::Rejected);
        };

        let ttl = self.codec.default_ttl();
        let token = self.codec.mint(&identity.id, &identity.username, Some(ttl))?;
        let artifact = SessionArtifact(create_secure_cookie(
            token,
            ttl.num_seconds(),
            self.secure_cookies,
        ));

        tracing::info!("✅ User logged in: {}", identity.id);
        Ok(LoginOutcome::Authenticated { identity, artifact })
    }

    /// Returns the artifact that discards the client's session cookie.
    ///
    /// Idempotent: the same removal artifact is produced whether or not the
    /// caller currently holds a session.
    pub fn logout(&self) -> SessionArtifact {
        SessionArtifact(create_secure_cookie(String::new(), 0, self.secure_cookies))
    }

    /// Instructs the transport to drop the session cookie.
    ///
    /// Called by the route layer after a token was found expired or
    /// malformed, and by the logout handler.
    pub fn clear_session(&self, cookies: &Cookies) {
        cookies.remove(self.logout().into_cookie());
        tracing::debug!("🧹 Session cookie cleared");
    }
}
