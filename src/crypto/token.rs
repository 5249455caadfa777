//! Signed session tokens.
//!
//! A token is a compact JWT carrying the subject id, the username at issuance
//! and an absolute expiry. It is signed with a single process-wide HMAC
//! secret. Verification checks the signature before the expiry so a forged
//! token is never reported as merely expired.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::models::identity::Identity;

/// Minimum required length for the signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Token lifetime used when none is configured or requested.
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// Signing configuration, fixed for the lifetime of the process.
#[derive(Clone)]
pub struct TokenConfig {
    secret: Zeroizing<String>,
    algorithm: Algorithm,
    ttl: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenConfig {
    /// Creates a signing configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes or `algorithm` is not one of `HS256`,
    /// `HS384`, `HS512`.
    pub fn new(secret: impl Into<String>, algorithm: &str) -> Result<Self> {
        let secret = Zeroizing::new(secret.into());

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AppError::Configuration(format!(
                "signing secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        let algorithm = match algorithm.trim().to_ascii_uppercase().as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(AppError::Configuration(format!(
                    "unsupported signing algorithm {other:?}, expected HS256, HS384 or HS512"
                )));
            }
        };

        Ok(Self {
            secret,
            algorithm,
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
        })
    }

    /// Sets the lifetime of tokens minted at login.
    ///
    /// The lifetime must be positive and small enough that an expiry
    /// computed from the current time is representable.
    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self> {
        if ttl <= Duration::zero() {
            return Err(AppError::Configuration(
                "token ttl must be positive".to_string(),
            ));
        }
        if chrono::Utc::now().checked_add_signed(ttl).is_none() {
            return Err(AppError::Configuration(
                "token ttl is out of range".to_string(),
            ));
        }
        self.ttl = ttl;
        Ok(self)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    /// Subject id.
    sub: String,
    /// Username at issuance. May go stale after a rename.
    username: String,
    /// Issued at (Unix timestamp).
    iat: i64,
    /// Expiration time (Unix timestamp).
    exp: i64,
}

/// Outcome of checking a token string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Signature verified and the token has not yet expired.
    Valid(Identity),
    /// Signature verified but `now >= exp`.
    Expired,
    /// Unparsable, wrong algorithm, missing claims, or signature mismatch.
    Malformed,
}

/// Encodes identities into signed tokens and verifies them back.
#[derive(Clone)]
pub struct TokenCodec {
    config: Arc<TokenConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Creates a codec signing with `config` and reading time from `clock`.
    pub fn new(config: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked against the injected clock, not by the library.
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            config: Arc::new(config),
            encoding_key,
            decoding_key,
            validation,
            clock,
        }
    }

    /// Lifetime applied when `mint` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Mints a signed token for the given subject.
    ///
    /// `ttl` defaults to the configured lifetime when `None`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty subject id or username, a
    /// non-positive `ttl`, or a `ttl` that pushes the expiry out of range.
    pub fn mint(
        &self,
        subject_id: &str,
        subject_username: &str,
        ttl: Option<Duration>,
    ) -> Result<String> {
        if subject_id.is_empty() || subject_username.is_empty() {
            return Err(AppError::Validation(
                "token subject must have an id and a username".to_string(),
            ));
        }

        let ttl = ttl.unwrap_or(self.config.ttl);
        if ttl <= Duration::zero() {
            return Err(AppError::Validation("token ttl must be positive".to_string()));
        }

        let now = self.clock.now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Validation("token ttl is out of range".to_string()))?;
        let claims = SessionClaims {
            sub: subject_id.to_string(),
            username: subject_username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = jsonwebtoken::encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

        tracing::debug!("🔑 Token minted for subject {} (exp {})", claims.sub, claims.exp);
        Ok(token)
    }

    /// Verifies a token string.
    ///
    /// The signature is checked first; only a correctly signed token can be
    /// reported as `Expired`.
    pub fn verify(&self, token: &str) -> TokenStatus {
        let claims = match jsonwebtoken::decode::<SessionClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        ) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::warn!(reason = ?e.kind(), "🚨 Rejected session token: possible tampering");
                return TokenStatus::Malformed;
            }
        };

        if claims.sub.is_empty() || claims.username.is_empty() {
            tracing::warn!("🚨 Rejected session token: signed but missing subject");
            return TokenStatus::Malformed;
        }

        if self.clock.now().timestamp() >= claims.exp {
            tracing::debug!("⌛ Session token expired for subject {}", claims.sub);
            return TokenStatus::Expired;
        }

        TokenStatus::Valid(Identity::new(claims.sub, claims.username))
    }
}
