//! Semantic search response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::service::MatchResult;

/// Matches of a scoped semantic search, in index order.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedText {
    pub data: Vec<MatchResult>,
}
