//! Types for remote object tracking.

use std::fmt;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Object name prefix for raw ingested data.
pub const INGEST_PREFIX: &str = "seo_data";
/// Object name prefix for transform (extraction) outputs.
pub const TRANSFORM_PREFIX: &str = "extracted_seo";
/// Object name prefix for research outputs.
pub const RESEARCH_PREFIX: &str = "weekly_research";

/// Name of an object held by the remote analysis service.
///
/// Generated locally as `{prefix}_{unix-millis}`. The millisecond suffix
/// makes names unique per pipeline run, so the registry needs no
/// deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectName(String);

impl ObjectName {
    /// Generate a fresh name with the given prefix.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}_{}", prefix, Utc::now().timestamp_millis()))
    }

    /// Wrap an existing name (used by tests and deserialization paths).
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// In-memory registry of objects the pipeline has caused the service to
/// create. Append-only except for bulk [`clear`](Self::clear); insertion
/// order is creation order and drives deterministic bulk deletion.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    names: Mutex<Vec<ObjectName>>,
}

impl ObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly created object name.
    pub fn record(&self, name: ObjectName) {
        self.names.lock().expect("registry lock poisoned").push(name);
    }

    /// All recorded names, oldest first.
    pub fn all(&self) -> Vec<ObjectName> {
        self.names.lock().expect("registry lock poisoned").clone()
    }

    /// Number of recorded names.
    pub fn len(&self) -> usize {
        self.names.lock().expect("registry lock poisoned").len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all recorded names.
    pub fn clear(&self) {
        self.names.lock().expect("registry lock poisoned").clear();
    }
}
