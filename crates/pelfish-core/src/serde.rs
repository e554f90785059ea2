use bson::{Bson, Document};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_rfc3339_ms(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Plain JSON rendering of a stored value for API responses.
///
/// Dates become RFC 3339 strings and object ids become hex, so clients never
/// see extended-JSON wrappers for the types records actually use.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::DateTime(dt) => Value::String(format_rfc3339_ms(&dt.to_chrono())),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Value {
    Value::Object(
        doc.into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect(),
    )
}
