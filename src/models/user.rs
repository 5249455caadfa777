use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::identity::Identity;

/// Represents a user in the system.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's full name.
    pub name: String,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// The user's phone number.
    pub phone: u64,
    /// The user's hashed password.
    pub password: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity a session for this user is issued to.
    pub fn identity(&self) -> Identity {
        Identity::new(self.id.to_string(), self.username.clone())
    }
}
