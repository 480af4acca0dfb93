//! Authentication response types.

use docsearch_core::types::Account as AccountModel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account created by registration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Account {
    /// ID of the account.
    pub id: Uuid,
    /// Unique name of the account.
    pub username: String,
}

impl Account {
    pub fn from_model(account: AccountModel) -> Self {
        Self {
            id: account.id,
            username: account.username,
        }
    }
}

/// Access token returned after a successful login.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AccessToken {
    /// Signed JWT to send as `Authorization: Bearer`.
    pub access_token: String,
    /// Always `Bearer`.
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_owned(),
        }
    }
}
