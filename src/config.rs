use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::crypto::password::PasswordParams;
use crate::crypto::token::TokenConfig;

/// Default bind address of the HTTP server.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
/// Default bound on a single credential check, in milliseconds.
const DEFAULT_VERIFIER_TIMEOUT_MS: u64 = 5_000;

/// Per-IP rate limit applied to the login and registration routes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Seconds between replenishing one request slot.
    pub replenish_seconds: u64,
    /// Number of requests allowed in a burst.
    pub burst: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            replenish_seconds: 2,
            burst: 5,
        }
    }
}

/// The application's configuration.
///
/// Built once at startup and shared read-only for the process lifetime.
#[derive(Clone, Debug)]
pub struct Config {
    /// Signing secret, algorithm, and token lifetime.
    pub token: TokenConfig,
    /// Argon2 cost parameters for stored passwords.
    pub password: PasswordParams,
    /// Upper bound on a single credential verification.
    pub verifier_timeout: Duration,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Whether session cookies carry the `Secure` flag.
    pub secure_cookies: bool,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
    /// Optional rate limit for credential-accepting routes.
    pub rate_limit: Option<RateLimit>,
}

impl Config {
    /// Creates a configuration around `token` with every other setting at its default.
    pub fn new(token: TokenConfig) -> Self {
        Self {
            token,
            password: PasswordParams::default(),
            verifier_timeout: Duration::from_millis(DEFAULT_VERIFIER_TIMEOUT_MS),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            secure_cookies: false,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            rate_limit: None,
        }
    }

    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` by looking settings up through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("AUTH_SECRET_KEY")
            .context("AUTH_SECRET_KEY must be set (generate with: openssl rand -hex 32)")?;
        let algorithm = lookup("AUTH_ALGORITHM").unwrap_or_else(|| "HS256".to_string());

        let ttl_minutes: i64 = lookup("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|| "15".to_string())
            .parse()
            .context("Invalid TOKEN_TTL_MINUTES")?;

        let ttl = chrono::Duration::try_minutes(ttl_minutes)
            .context("TOKEN_TTL_MINUTES is out of range")?;
        let token = TokenConfig::new(secret, &algorithm)?.with_ttl(ttl)?;

        let verifier_timeout_ms: u64 = lookup("VERIFIER_TIMEOUT_MS")
            .unwrap_or_else(|| DEFAULT_VERIFIER_TIMEOUT_MS.to_string())
            .parse()
            .context("Invalid VERIFIER_TIMEOUT_MS")?;
        anyhow::ensure!(
            verifier_timeout_ms > 0,
            "VERIFIER_TIMEOUT_MS must be greater than zero"
        );

        let bind_addr: SocketAddr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;

        let is_production = lookup("APP_ENV")
            .unwrap_or_else(|| "development".to_string())
            == "production";

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            token,
            password: PasswordParams::default(),
            verifier_timeout: Duration::from_millis(verifier_timeout_ms),
            bind_addr,
            secure_cookies: is_production,
            allowed_origins,
            rate_limit: Some(RateLimit::default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "config-test-secret-0123456789abcdef";

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = Config::from_lookup(lookup_in(&[("AUTH_SECRET_KEY", SECRET)])).unwrap();

        assert_eq!(config.token.ttl(), chrono::Duration::minutes(15));
        assert_eq!(config.token.algorithm(), jsonwebtoken::Algorithm::HS256);
        assert_eq!(config.verifier_timeout, Duration::from_secs(5));
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(!config.secure_cookies);
        assert_eq!(config.allowed_origins, vec!["http://localhost:3000"]);
        assert!(config.rate_limit.is_some());
    }

    #[test]
    fn missing_secret_is_rejected() {
        assert!(Config::from_lookup(lookup_in(&[])).is_err());
    }

    #[test]
    fn overrides_are_honoured() {
        let config = Config::from_lookup(lookup_in(&[
            ("AUTH_SECRET_KEY", SECRET),
            ("AUTH_ALGORITHM", "HS512"),
            ("TOKEN_TTL_MINUTES", "5"),
            ("VERIFIER_TIMEOUT_MS", "250"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("APP_ENV", "production"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example"),
        ]))
        .unwrap();

        assert_eq!(config.token.algorithm(), jsonwebtoken::Algorithm::HS512);
        assert_eq!(config.token.ttl(), chrono::Duration::minutes(5));
        assert_eq!(config.verifier_timeout, Duration::from_millis(250));
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.secure_cookies);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn non_hmac_algorithm_is_rejected() {
        let result = Config::from_lookup(lookup_in(&[
            ("AUTH_SECRET_KEY", SECRET),
            ("AUTH_ALGORITHM", "RS256"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let result = Config::from_lookup(lookup_in(&[
            ("AUTH_SECRET_KEY", SECRET),
            ("TOKEN_TTL_MINUTES", "0"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_ttl_is_rejected() {
        let result = Config::from_lookup(lookup_in(&[
            ("AUTH_SECRET_KEY", SECRET),
            ("TOKEN_TTL_MINUTES", "9000000000000000"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn zero_verifier_timeout_is_rejected() {
        let result = Config::from_lookup(lookup_in(&[
            ("AUTH_SECRET_KEY", SECRET),
            ("VERIFIER_TIMEOUT_MS", "0"),
        ]));
        assert!(result.is_err());
    }
}
