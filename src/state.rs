use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::crypto::token::TokenCodec;
use crate::error::Result;
use crate::repositories::user::UserStore;
use crate::services::registration::RegistrationValidator;
use crate::services::session::SessionManager;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<Config>,
    /// Login/logout orchestration and token verification.
    pub sessions: SessionManager,
    /// Registration checks and persistence.
    pub registrar: Arc<dyn RegistrationValidator>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `clock` - The time source for token issuance and expiry.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let users = Arc::new(UserStore::new(config.password)?);
        tracing::info!("✅ User store initialized");

        let codec = TokenCodec::new(config.token.clone(), clock);
        tracing::info!(
            "✅ Token codec initialized ({:?}, ttl {} min)",
            config.token.algorithm(),
            config.token.ttl().num_minutes()
        );

        let sessions = SessionManager::new(
            users.clone(),
            codec,
            config.verifier_timeout,
            config.secure_cookies,
        );

        Ok(AppState {
            config: Arc::new(config),
            sessions,
            registrar: users,
        })
    }
}
