//! Semantic search request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request payload for a scoped semantic search.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct ExtractText {
    /// Natural-language query.
    #[validate(length(min = 1))]
    pub query_text: String,

    /// Document the search is restricted to.
    #[validate(length(min = 1))]
    pub file_id: String,
}
