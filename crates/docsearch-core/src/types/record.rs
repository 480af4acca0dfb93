//! Vector index records, filters and matches.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Metadata stored next to every paragraph vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Paragraph text the vector was computed from.
    pub text: String,
    /// Identifier of the document the paragraph belongs to.
    pub file_id: String,
}

impl RecordMetadata {
    /// Metadata field holding the paragraph text.
    pub const TEXT: &str = "text";
    /// Metadata field holding the document identifier.
    pub const FILE_ID: &str = "file_id";

    pub fn new(text: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file_id: file_id.into(),
        }
    }

    /// Converts the metadata into a flat JSON object.
    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(2);
        map.insert(Self::TEXT.to_owned(), Value::String(self.text.clone()));
        map.insert(Self::FILE_ID.to_owned(), Value::String(self.file_id.clone()));
        map
    }

    /// Reads the metadata back from a flat JSON object.
    ///
    /// Returns `None` when either field is missing or not a string.
    pub fn from_json_map(map: &Map<String, Value>) -> Option<Self> {
        let text = map.get(Self::TEXT)?.as_str()?;
        let file_id = map.get(Self::FILE_ID)?.as_str()?;
        Some(Self::new(text, file_id))
    }
}

/// A single vector written to the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: Uuid,
    pub values: Vec<f32>,
    pub metadata: RecordMetadata,
}

impl VectorRecord {
    /// Creates a record with a freshly generated random identifier.
    pub fn new(values: Vec<f32>, metadata: RecordMetadata) -> Self {
        Self {
            id: Uuid::new_v4(),
            values,
            metadata,
        }
    }
}

/// Metadata filter applied to similarity queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFilter {
    /// Matches records whose `field` equals `value`.
    Eq { field: String, value: String },
}

impl MetadataFilter {
    /// Restricts a query to the vectors of a single document.
    pub fn file_id(file_id: impl Into<String>) -> Self {
        Self::Eq {
            field: RecordMetadata::FILE_ID.to_owned(),
            value: file_id.into(),
        }
    }

    /// Renders the filter in the `{"field": {"$eq": value}}` query language.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Eq { field, value } => {
                let mut clause = Map::with_capacity(1);
                clause.insert(field.clone(), json!({ "$eq": value }));
                Value::Object(clause)
            }
        }
    }
}

/// A ranked match returned by a similarity query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Option<RecordMetadata>,
}
