//! Monitor response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Liveness status response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonitorStatus {
    /// Always `ok` while the server answers.
    pub status: String,
    /// Application version.
    pub version: String,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            status: "ok".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}
