//! Upload response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::service::StoredDocument;

/// A stored document and its time-limited read URL.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadedFile {
    /// Original filename sent by the client.
    pub filename: String,
    /// Object name under which the file was stored.
    pub file_id: String,
    /// Signed read URL, accepted by the OCR endpoint until it expires.
    pub presigned_url: String,
}

impl UploadedFile {
    pub fn from_stored(document: StoredDocument) -> Self {
        Self {
            filename: document.filename,
            file_id: document.file_id,
            presigned_url: document.presigned_url.into(),
        }
    }
}

/// Response of a successful upload.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UploadedFiles {
    pub files: Vec<UploadedFile>,
}
