//! # Document Codec
//!
//! Conversion between request/response JSON and stored BSON.
//!
//! Inbound, JSON numbers keep their integer-ness where possible: values
//! that fit in `i32` become `Int32`, wider integers `Int64`, everything
//! else `Double`. Outbound, the rendering matches what a JavaScript client
//! expects from this API: `_id` is the bare 24-hex string and dates are
//! ISO-8601 UTC with millisecond precision (`2024-05-01T10:00:00.000Z`).

use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Number, Value};

/// Name of the server-assigned creation timestamp field.
pub const CREATED_AT: &str = "createdAt";

/// Name of the identifier field.
pub const ID: &str = "_id";

/// Convert a JSON object into a BSON document.
pub fn document_from_json(object: Map<String, Value>) -> Document {
    object
        .into_iter()
        .map(|(key, value)| (key, bson_from_json(value)))
        .collect()
}

/// Convert a JSON value into BSON.
pub fn bson_from_json(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => number_to_bson(&n),
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(bson_from_json).collect()),
        Value::Object(object) => Bson::Document(document_from_json(object)),
    }
}

fn number_to_bson(n: &Number) -> Bson {
    if let Some(i) = n.as_i64() {
        return i32::try_from(i).map(Bson::Int32).unwrap_or(Bson::Int64(i));
    }
    n.as_f64().map(Bson::Double).unwrap_or(Bson::Null)
}

/// Render a stored document as a JSON object.
pub fn document_to_json(document: Document) -> Map<String, Value> {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// Render a BSON value as JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        // JSON has no NaN or Infinity.
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(document_to_json(doc)),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => render_datetime(dt),
        other => Value::String(other.to_string()),
    }
}

fn render_datetime(dt: bson::DateTime) -> Value {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
        .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)))
        .unwrap_or(Value::Null)
}

/// BSON date for a wall-clock instant.
pub fn datetime(at: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(at.timestamp_millis()))
}

/// Overwrite `createdAt` with `now`, whatever the client sent.
pub fn stamp_created_at(document: &mut Document, now: DateTime<Utc>) {
    document.insert(CREATED_AT, datetime(now));
}

/// Milliseconds since the epoch of the document's `createdAt`, if it is a date.
pub fn created_at_millis(document: &Document) -> Option<i64> {
    document
        .get_datetime(CREATED_AT)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
