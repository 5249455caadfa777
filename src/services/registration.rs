use async_trait::async_trait;
use chrono::Utc;
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    crypto::password,
    error::{AppError, Result},
    models::user::User,
    repositories::user::UserStore,
    validation::auth::{name_rule, password_rule, phone_rule, username_rule},
};

/// A registration request as submitted by the client.
#[derive(Clone, Deserialize, Validate, Zeroize, ZeroizeOnDrop)]
pub struct RegistrationCandidate {
    #[serde(rename = "Name", alias = "name")]
    #[garde(custom(name_rule))]
    pub name: String,
    #[garde(custom(username_rule))]
    pub username: String,
    #[garde(email)]
    pub email_id: String,
    #[garde(custom(phone_rule))]
    pub ph_no: u64,
    #[garde(custom(password_rule))]
    pub password1: String,
    #[garde(matches(password1))]
    pub password2: String,
}

/// Outcome of checking a candidate. A failed check is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationStatus {
    pub status: bool,
    pub message: String,
}

impl RegistrationStatus {
    fn accepted() -> Self {
        Self {
            status: true,
            message: "Registration details are valid".to_string(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
        }
    }
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub id: Uuid,
    pub message: String,
}

/// Validates and stores new accounts.
#[async_trait]
pub trait RegistrationValidator: Send + Sync {
    /// Checks field formats and uniqueness.
    async fn validate(&self, candidate: &RegistrationCandidate) -> Result<RegistrationStatus>;

    /// Hashes the password and stores the account.
    ///
    /// A uniqueness conflict that slipped past `validate` surfaces as
    /// `AppError::Validation`.
    async fn persist(&self, candidate: &RegistrationCandidate) -> Result<Registration>;
}

#[async_trait]
impl RegistrationValidator for UserStore {
    async fn validate(&self, candidate: &RegistrationCandidate) -> Result<RegistrationStatus> {
        if let Err(report) = candidate.validate() {
            let message = report
                .iter()
                .next()
                .map(|(path, error)| format!("{}: {}", path, error))
                .unwrap_or_else(|| "Invalid registration details".to_string());
            tracing::debug!("📝 Registration rejected: {}", message);
            return Ok(RegistrationStatus::rejected(message));
        }

        if self.username_taken(&candidate.username).await {
            return Ok(RegistrationStatus::rejected("Username already taken"));
        }

        if self.email_taken(&candidate.email_id).await {
            return Ok(RegistrationStatus::rejected("Email already registered"));
        }

        Ok(RegistrationStatus::accepted())
    }

    async fn persist(&self, candidate: &RegistrationCandidate) -> Result<Registration> {
        tracing::debug!("🔐 Creating user: {}", candidate.username);

        let params = self.params();
        let secret = Zeroizing::new(candidate.password1.clone());
        let hashed_password =
            tokio::task::spawn_blocking(move || password::hash_password(&secret, params))
                .await
                .map_err(|e| AppError::Internal(format!("password hashing aborted: {}", e)))??;

        let user = User {
            id: Uuid::new_v4(),
            name: candidate.name.trim().to_string(),
            username: candidate.username.clone(),
            email: candidate.email_id.clone(),
            phone: candidate.ph_no,
            password: hashed_password,
            created_at: Utc::now(),
        };
        let id = user.id;

        self.insert(user).await?;

        tracing::info!("✅ User created with ID: {}", id);
        Ok(Registration {
            id,
            message: "Registration Successful...Please Login to continue".to_string(),
        })
    }
}
