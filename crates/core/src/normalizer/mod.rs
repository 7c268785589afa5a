//! Response normalization.
//!
//! The analysis service returns heterogeneous payloads: opaque text,
//! JSON-encoded text, structured objects, or arrays. This module converts any
//! of them into an ordered sequence of canonical [`Record`]s. Normalization is
//! total: unrecognized or empty shapes fall back to a single `"raw"` record
//! instead of failing the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical normalized output unit.
///
/// Immutable once produced; the result of a run is an ordered sequence of
/// records in normalizer emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Textual content of the record.
    pub content: String,
    /// Record tag, e.g. `"insight"`, `"text"`, `"research"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// When the record was produced (or the service-supplied instant).
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// Build a record stamped with the current instant.
    pub fn new(content: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: kind.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Service payload classified by shape.
///
/// Replaces ad hoc shape-sniffing with one exhaustive match per
/// normalization pass.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A textual value, possibly JSON-encoded.
    Text(String),
    /// An already-structured sequence.
    Sequence(Vec<Value>),
    /// A single non-text structured value.
    Structured(Value),
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Payload::Text(text),
            Value::Array(items) => Payload::Sequence(items),
            other => Payload::Structured(other),
        }
    }
}

/// Normalize an arbitrary service payload into at least one record.
///
/// `default_kind` tags records whose elements carry no `type` field; the
/// caller picks it per source mode. Never returns an empty sequence: shapes
/// that normalize to nothing yield a single `"raw"` record containing a
/// string rendering of the original payload.
pub fn normalize(value: &Value, default_kind: &str) -> Vec<Record> {
    let records = normalize_payload(Payload::from(value.clone()), default_kind);
    if records.is_empty() {
        vec![Record::new(render(value), "raw")]
    } else {
        records
    }
}

fn normalize_payload(payload: Payload, default_kind: &str) -> Vec<Record> {
    match payload {
        Payload::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => items
                .iter()
                .map(|item| element_record(item, default_kind))
                .collect(),
            Ok(decoded) => vec![element_record(&decoded, default_kind)],
            Err(_) => vec![Record::new(text, "text")],
        },
        Payload::Sequence(items) => items
            .iter()
            .map(|item| element_record(item, default_kind))
            .collect(),
        Payload::Structured(value) => vec![element_record(&value, default_kind)],
    }
}

/// Normalize one sequence element (or single wrapped value).
///
/// Objects keep their `content`/`type`/`timestamp` fields, defaulting what is
/// missing; anything else becomes a `"data"` record of its rendering.
fn element_record(value: &Value, default_kind: &str) -> Record {
    match value {
        Value::Object(fields) => {
            let content = match fields.get("content") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => render(other),
                None => render(value),
            };
            let kind = match fields.get("type") {
                Some(Value::String(s)) => s.clone(),
                _ => default_kind.to_string(),
            };
            let timestamp = fields
                .get("timestamp")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(Utc::now);

            Record {
                content,
                kind,
                timestamp,
            }
        }
        other => Record::new(render(other), "data"),
    }
}

/// String rendering of a JSON value. Strings render as their inner text,
/// everything else as compact JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
