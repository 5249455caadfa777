use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    crypto::password::{self, PasswordParams},
    error::{AppError, Result},
    models::user::User,
};

/// Password hashed at startup and verified against when a login names an
/// unknown user, so both failure causes cost one Argon2 verification.
const DUMMY_PASSWORD: &str = "faceauth-dummy-password";

/// In-process user store backing credential checks and registration.
pub struct UserStore {
    users: RwLock<HashMap<Uuid, User>>,
    params: PasswordParams,
    dummy_hash: String,
}

impl UserStore {
    /// Creates an empty store hashing new passwords with `params`.
    pub fn new(params: PasswordParams) -> Result<Self> {
        let dummy_hash = password::hash_password(DUMMY_PASSWORD, params)?;
        Ok(Self {
            users: RwLock::new(HashMap::new()),
            params,
            dummy_hash,
        })
    }

    /// The Argon2 parameters new passwords are hashed with.
    pub fn params(&self) -> PasswordParams {
        self.params
    }

    pub(crate) fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }

    /// Inserts a new user.
    ///
    /// Username and email uniqueness is checked under
    /// the same write lock as the insert.
    pub async fn insert(&self, user: User) -> Result<()> {
        let mut users = self.users.write().await;

        let conflict = users.values().find_map(|u| {
            if u.username == user.username {
                Some("Username already taken")
            } else if u.email.eq_ignore_ascii_case(&user.email) {
                Some("Email already registered")
            } else {
                None
            }
        });
        if let Some(reason) = conflict {
            return Err(AppError::Validation(reason.to_string()));
        }

        tracing::debug!("👤 Stored user {} ({})", user.id, user.username);
        users.insert(user.id, user);
        Ok(())
    }

    /// Finds a user by username or email address.
    pub async fn find_by_login(&self, login: &str) -> Option<User> {
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.username == login || u.email.eq_ignore_ascii_case(login))
            .cloned()
    }

    pub async fn username_taken(&self, username: &str) -> bool {
        self.users
            .read()
            .await
            .values()
            .any(|u| u.username == username)
    }

    pub async fn email_taken(&self, email: &str) -> bool {
        self.users
            .read()
            .await
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }
}
