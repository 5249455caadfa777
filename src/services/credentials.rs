use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::{
    crypto::password,
    error::{AppError, Result},
    models::identity::Identity,
    repositories::user::UserStore,
};

/// Confirms a claimed username/secret pair against stored credentials.
///
/// Implementations must not reveal through timing whether the username
/// exists, and must never partially succeed: the answer is either the full
/// identity or `None`. Store outages are reported as
/// `AppError::VerifierUnavailable`, never as `None`.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, secret: &str) -> Result<Option<Identity>>;
}

#[async_trait]
impl CredentialVerifier for UserStore {
    async fn verify(&self, username: &str, secret: &str) -> Result<Option<Identity>> {
        tracing::debug!("🔐 Verifying credentials for: {}", username);

        let user = self.find_by_login(username).await;
        let hash = match &user {
            Some(u) => u.password.clone(),
            None => self.dummy_hash().to_string(),
        };

        let secret = Zeroizing::new(secret.to_string());
        let matches = tokio::task::spawn_blocking(move || password::verify_password(&secret, &hash))
            .await
            .map_err(|e| AppError::VerifierUnavailable(format!("password check aborted: {}", e)))??;

        match user {
            Some(user) if matches => {
                tracing::info!("✅ User authenticated: {}", user.id);
                Ok(Some(user.identity()))
            }
            _ => {
                tracing::debug!("Credential check failed");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::crypto::password::{PasswordParams, hash_password};
    use crate::models::user::User;

    async fn store_with_alice() -> (UserStore, Uuid) {
        let store = UserStore::new(PasswordParams::minimal()).unwrap();
        let id = Uuid::new_v4();
        store
            .insert(User {
                id,
                name: "Alice".to_string(),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                phone: 5_551_234_567,
                password: hash_password("correctpw", PasswordParams::minimal()).unwrap(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn correct_secret_yields_identity() {
        let (store, id) = store_with_alice().await;

        let identity = store.verify("alice", "correctpw").await.unwrap();

        assert_eq!(identity, Some(Identity::new(id.to_string(), "alice")));
    }

    #[tokio::test]
    async fn email_login_yields_same_identity() {
        let (store, id) = store_with_alice().await;

        let identity = store.verify("alice@example.com", "correctpw").await.unwrap();

        assert_eq!(identity, Some(Identity::new(id.to_string(), "alice")));
    }

    #[tokio::test]
    async fn wrong_secret_and_unknown_user_are_indistinguishable() {
        let (store, _) = store_with_alice().await;

        let wrong_secret = store.verify("alice", "wrongpw").await;
        let unknown_user = store.verify("ghost", "x").await;

        assert_eq!(wrong_secret, Ok(None));
        assert_eq!(wrong_secret, unknown_user);
    }
}
