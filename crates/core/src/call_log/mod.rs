//! Bounded history of gateway interactions.
//!
//! Every remote call, successful or not, is appended here with its payload
//! and raw response. This is a diagnostics side channel only: nothing in the
//! pipeline's success/failure logic reads it. The buffer is capped so a
//! long-lived process never accumulates unbounded request history.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of entries retained. Appending beyond this evicts the
/// oldest entry first.
pub const CALL_LOG_CAPACITY: usize = 10;

/// One recorded gateway interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallLogEntry {
    /// When the call completed (success or failure).
    pub timestamp: DateTime<Utc>,
    /// Endpoint path, e.g. `/input_data` or `DELETE /objects/{name}`.
    pub endpoint: String,
    /// Request payload as sent.
    pub payload: serde_json::Value,
    /// Raw response body, or an error rendering for failed calls.
    pub response: serde_json::Value,
    /// Unique entry id.
    pub id: Uuid,
}

/// Fixed-capacity ring buffer of [`CallLogEntry`] values.
///
/// Cheaply cloneable; the gateway and any diagnostics consumer share the same
/// underlying buffer. The lock is only ever held for push/copy operations,
/// never across an await point.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<VecDeque<CallLogEntry>>>,
}

impl CallLog {
    /// Create an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an interaction, evicting the oldest entry once at capacity.
    pub fn append(&self, endpoint: &str, payload: serde_json::Value, response: serde_json::Value) {
        let entry = CallLogEntry {
            timestamp: Utc::now(),
            endpoint: endpoint.to_string(),
            payload,
            response,
            id: Uuid::new_v4(),
        };

        let mut entries = self.entries.lock().expect("call log lock poisoned");
        if entries.len() == CALL_LOG_CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Recorded entries, most recent first.
    pub fn recent(&self) -> Vec<CallLogEntry> {
        self.entries
            .lock()
            .expect("call log lock poisoned")
            .iter()
            .rev()
            .cloned()
            .collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("call log lock poisoned").len()
    }

    /// Whether no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.lock().expect("call log lock poisoned").clear();
    }
}
