//! Registered user accounts.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account with its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl Account {
    /// Creates a new account with a time-ordered identifier.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Timestamp::now(),
        }
    }
}
