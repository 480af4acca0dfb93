//! Conversions between docsearch records and Pinecone metadata values.

use std::collections::BTreeMap;

use docsearch_core::types::{MetadataFilter, RecordMetadata};
use pinecone_sdk::models::{Kind, Metadata, Value as PineconeValue};
use serde_json::{Map, Number, Value};

/// Converts record metadata into Pinecone metadata fields.
pub(super) fn record_metadata(metadata: &RecordMetadata) -> Metadata {
    json_object_to_metadata(metadata.to_json_map())
}

/// Reads record metadata back from Pinecone metadata fields.
pub(super) fn metadata_to_record(metadata: Metadata) -> Option<RecordMetadata> {
    let map: Map<String, Value> = metadata
        .fields
        .into_iter()
        .map(|(k, v)| (k, pinecone_value_to_json(v)))
        .collect();
    RecordMetadata::from_json_map(&map)
}

/// Renders a metadata filter in the Pinecone filter language.
pub(super) fn filter_metadata(filter: &MetadataFilter) -> Option<Metadata> {
    match filter.to_json() {
        Value::Object(obj) => Some(json_object_to_metadata(obj)),
        _ => None,
    }
}

fn json_object_to_metadata(obj: Map<String, Value>) -> Metadata {
    let fields: BTreeMap<String, PineconeValue> = obj
        .into_iter()
        .map(|(k, v)| (k, json_to_pinecone_value(v)))
        .collect();
    Metadata { fields }
}

fn pinecone_value_to_json(value: PineconeValue) -> Value {
    match value.kind {
        Some(Kind::NullValue(_)) | None => Value::Null,
        Some(Kind::NumberValue(n)) => Number::from_f64(n).map_or(Value::Null, Value::Number),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, pinecone_value_to_json(v)))
                .collect(),
        ),
        Some(Kind::ListValue(list)) => Value::Array(
            list.values
                .into_iter()
                .map(pinecone_value_to_json)
                .collect(),
        ),
    }
}

fn json_to_pinecone_value(value: Value) -> PineconeValue {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s),
        Value::Array(arr) => Kind::ListValue(prost_types::ListValue {
            values: arr.into_iter().map(json_to_pinecone_value).collect(),
        }),
        Value::Object(obj) => Kind::StructValue(prost_types::Struct {
            fields: obj
                .into_iter()
                .map(|(k, v)| (k, json_to_pinecone_value(v)))
                .collect(),
        }),
    };

    PineconeValue { kind: Some(kind) }
}
