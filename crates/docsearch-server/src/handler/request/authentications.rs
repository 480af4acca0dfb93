//! Authentication request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for account registration.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct Register {
    /// Unique name of the account.
    #[validate(length(min = 3, max = 64))]
    pub username: String,

    /// Plain-text password, hashed before storage.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Form payload for login (OAuth2 password form).
#[must_use]
#[derive(Clone, Serialize, Deserialize, JsonSchema)]
pub struct Login {
    /// Name of the account.
    pub username: String,
    /// Password of the account.
    pub password: String,
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
