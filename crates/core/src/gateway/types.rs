//! Types for the service gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::objects::ObjectName;

use super::GatewayError;

/// Representation requested from the service when retrieving an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrieveFormat {
    /// Structured JSON, used by the file-extraction path.
    Json,
    /// Human-readable text, used by the research path.
    PrettyText,
}

impl RetrieveFormat {
    /// Wire value for the `return_type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrieveFormat::Json => "json",
            RetrieveFormat::PrettyText => "pretty_text",
        }
    }
}

/// Outcome of one deletion attempt within a bulk teardown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionOutcome {
    /// The object the deletion was attempted for.
    pub name: ObjectName,
    /// Error message if the deletion failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-object results of a bulk deletion.
///
/// Deletion is best-effort: a failure for one object never blocks the
/// remaining attempts, so the report always covers every requested name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletionReport {
    /// One outcome per requested object, in request order.
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    /// Number of successful deletions.
    pub fn deleted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    /// Number of failed deletions.
    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    /// Whether every requested deletion succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Trait for the remote analysis service.
///
/// Each operation is a single network round trip. Implementations own the
/// call-log side channel: every call, regardless of outcome, is recorded
/// with its payload and raw (or error) response.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Upload raw content as a singleton string collection. Returns the name
    /// of the object the service now holds.
    async fn ingest(&self, content: &str) -> Result<ObjectName, GatewayError>;

    /// Apply a natural-language instruction to an existing object, combining
    /// all of its events into one derived object. Returns the derived name.
    async fn transform(
        &self,
        source: &ObjectName,
        instructions: &str,
    ) -> Result<ObjectName, GatewayError>;

    /// Kick off asynchronous server-side research toward a goal. The
    /// returned name is not guaranteed ready until the caller's settle delay
    /// has elapsed.
    async fn research(&self, goal: &str) -> Result<ObjectName, GatewayError>;

    /// Fetch the current value bound to an object. Only the `value` field of
    /// the response is consumed; its shape is opaque to the gateway.
    async fn retrieve(
        &self,
        name: &ObjectName,
        format: RetrieveFormat,
    ) -> Result<serde_json::Value, GatewayError>;

    /// Delete a single object.
    async fn delete(&self, name: &ObjectName) -> Result<(), GatewayError>;

    /// Delete objects sequentially, one call per name. Each failure is
    /// caught and logged independently so that a failure deleting object `i`
    /// never blocks attempts for `i+1..n`.
    async fn delete_all(&self, names: &[ObjectName]) -> DeletionReport {
        let mut report = DeletionReport::default();
        for name in names {
            match self.delete(name).await {
                Ok(()) => {
                    debug!(object = %name, "Deleted remote object");
                    report.outcomes.push(DeletionOutcome {
                        name: name.clone(),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(object = %name, error = %e, "Failed to delete remote object");
                    report.outcomes.push(DeletionOutcome {
                        name: name.clone(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        report
    }
}
