//! Mock gateway for testing.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::call_log::CallLog;
use crate::gateway::{Gateway, GatewayError, RetrieveFormat};
use crate::objects::{ObjectName, INGEST_PREFIX, RESEARCH_PREFIX, TRANSFORM_PREFIX};

/// A recorded gateway call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Which operation was called ("ingest", "transform", ...).
    pub operation: String,
    /// The salient argument: content, instructions, goal, or object name.
    pub detail: String,
    /// When the call was made.
    pub timestamp: Instant,
}

/// Mock implementation of the Gateway trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable retrieve payload
/// - Track calls for assertions
/// - Simulate failures and delays
///
/// # Example
///
/// ```rust,ignore
/// use prospector_core::testing::MockGateway;
///
/// let gateway = MockGateway::new();
/// gateway.set_retrieve_value(serde_json::json!([{"content": "x", "type": "insight"}])).await;
///
/// let name = gateway.ingest("{\"a\":1}").await?;
/// let calls = gateway.recorded_calls().await;
/// assert_eq!(calls[0].operation, "ingest");
/// ```
///
/// Clones share all state, so a test can keep a handle to the mock after
/// moving another clone into a pipeline.
#[derive(Clone)]
pub struct MockGateway {
    /// Payload returned by retrieve.
    retrieve_value: Arc<RwLock<Value>>,
    /// Recorded calls in order.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// If set, the next ingest fails with this error.
    next_ingest_error: Arc<RwLock<Option<GatewayError>>>,
    /// If set, the next transform fails with this error.
    next_transform_error: Arc<RwLock<Option<GatewayError>>>,
    /// If set, the next research fails with this error.
    next_research_error: Arc<RwLock<Option<GatewayError>>>,
    /// If set, the next retrieve fails with this error.
    next_retrieve_error: Arc<RwLock<Option<GatewayError>>>,
    /// Object names whose deletion fails.
    delete_failures: Arc<RwLock<Vec<String>>>,
    /// Artificial delay applied before every call.
    call_delay: Arc<RwLock<Option<Duration>>>,
    /// Sequence for generated object names.
    sequence: Arc<AtomicU64>,
    /// Interaction log, appended per call like the HTTP gateway's.
    log: CallLog,
}

impl std::fmt::Debug for MockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockGateway")
            .field("retrieve_value", &"<value>")
            .field("calls", &"<calls>")
            .field("delete_failures", &"<names>")
            .finish()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Create a new mock gateway returning `null` from retrieve.
    pub fn new() -> Self {
        Self {
            retrieve_value: Arc::new(RwLock::new(Value::Null)),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_ingest_error: Arc::new(RwLock::new(None)),
            next_transform_error: Arc::new(RwLock::new(None)),
            next_research_error: Arc::new(RwLock::new(None)),
            next_retrieve_error: Arc::new(RwLock::new(None)),
            delete_failures: Arc::new(RwLock::new(Vec::new())),
            call_delay: Arc::new(RwLock::new(None)),
            sequence: Arc::new(AtomicU64::new(1)),
            log: CallLog::new(),
        }
    }

    /// The interaction log this mock appends to. Share it with a pipeline
    /// so that `pipeline.call_log()` observes the mock's calls the way it
    /// would the HTTP gateway's.
    pub fn call_log(&self) -> &CallLog {
        &self.log
    }

    /// Set the payload returned by subsequent retrieve calls.
    pub async fn set_retrieve_value(&self, value: Value) {
        *self.retrieve_value.write().await = value;
    }

    /// Configure the next ingest to fail with a 500 carrying the given body.
    pub async fn fail_ingest(&self, body: &str) {
        *self.next_ingest_error.write().await = Some(GatewayError::Status {
            status: 500,
            body: body.to_string(),
        });
    }

    /// Configure the next transform to fail with a 500 carrying the given body.
    pub async fn fail_transform(&self, body: &str) {
        *self.next_transform_error.write().await = Some(GatewayError::Status {
            status: 500,
            body: body.to_string(),
        });
    }

    /// Configure the next research to fail with a 500 carrying the given body.
    pub async fn fail_research(&self, body: &str) {
        *self.next_research_error.write().await = Some(GatewayError::Status {
            status: 500,
            body: body.to_string(),
        });
    }

    /// Configure the next retrieve to fail with a 500 carrying the given body.
    pub async fn fail_retrieve(&self, body: &str) {
        *self.next_retrieve_error.write().await = Some(GatewayError::Status {
            status: 500,
            body: body.to_string(),
        });
    }

    /// Make deletion of the given object name fail persistently.
    pub async fn fail_delete(&self, name: &str) {
        self.delete_failures.write().await.push(name.to_string());
    }

    /// Apply an artificial delay before every gateway call.
    pub async fn set_call_delay(&self, delay: Duration) {
        *self.call_delay.write().await = Some(delay);
    }

    /// Get recorded calls in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls made.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Get recorded calls matching the given operation.
    pub async fn calls_for(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    async fn enter(&self, operation: &str, detail: &str) {
        let delay = *self.call_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.write().await.push(RecordedCall {
            operation: operation.to_string(),
            detail: detail.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn next_name(&self, prefix: &str) -> ObjectName {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst);
        ObjectName::new(format!("{}_{}", prefix, n))
    }

    async fn take_error(
        &self,
        slot: &Arc<RwLock<Option<GatewayError>>>,
    ) -> Option<GatewayError> {
        slot.write().await.take()
    }
}

#[async_trait]
impl Gateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    async fn ingest(&self, content: &str) -> Result<ObjectName, GatewayError> {
        self.enter("ingest", content).await;
        let payload = json!({ "data_type": "strings", "input_data": [content] });
        if let Some(err) = self.take_error(&self.next_ingest_error).await {
            self.log
                .append("/input_data", payload, json!({ "error": err.to_string() }));
            return Err(err);
        }
        let name = self.next_name(INGEST_PREFIX);
        self.log.append(
            "/input_data",
            payload,
            json!({ "created_object_name": name.as_str() }),
        );
        Ok(name)
    }

    async fn transform(
        &self,
        source: &ObjectName,
        instructions: &str,
    ) -> Result<ObjectName, GatewayError> {
        self.enter("transform", instructions).await;
        let payload = json!({
            "prompt_string": instructions,
            "input_object_name": source.as_str(),
        });
        if let Some(err) = self.take_error(&self.next_transform_error).await {
            self.log
                .append("/apply_prompt", payload, json!({ "error": err.to_string() }));
            return Err(err);
        }
        let name = self.next_name(TRANSFORM_PREFIX);
        self.log.append(
            "/apply_prompt",
            payload,
            json!({ "created_object_name": name.as_str() }),
        );
        Ok(name)
    }

    async fn research(&self, goal: &str) -> Result<ObjectName, GatewayError> {
        self.enter("research", goal).await;
        let payload = json!({ "goal": goal });
        if let Some(err) = self.take_error(&self.next_research_error).await {
            self.log
                .append("/rapid_research", payload, json!({ "error": err.to_string() }));
            return Err(err);
        }
        let name = self.next_name(RESEARCH_PREFIX);
        self.log.append(
            "/rapid_research",
            payload,
            json!({ "created_object_name": name.as_str() }),
        );
        Ok(name)
    }

    async fn retrieve(
        &self,
        name: &ObjectName,
        format: RetrieveFormat,
    ) -> Result<Value, GatewayError> {
        self.enter("retrieve", name.as_str()).await;
        let payload = json!({
            "object_name": name.as_str(),
            "return_type": format.as_str(),
        });
        if let Some(err) = self.take_error(&self.next_retrieve_error).await {
            self.log
                .append("/return_data", payload, json!({ "error": err.to_string() }));
            return Err(err);
        }
        let value = self.retrieve_value.read().await.clone();
        self.log
            .append("/return_data", payload, json!({ "value": value }));
        Ok(value)
    }

    async fn delete(&self, name: &ObjectName) -> Result<(), GatewayError> {
        self.enter("delete", name.as_str()).await;
        let endpoint = format!("DELETE /objects/{}", name);
        let failed = self
            .delete_failures
            .read()
            .await
            .iter()
            .any(|n| n == name.as_str());
        if failed {
            let err = GatewayError::Status {
                status: 500,
                body: format!("cannot delete {}", name),
            };
            self.log.append(
                &endpoint,
                Value::Object(Default::default()),
                json!({ "error": err.to_string() }),
            );
            return Err(err);
        }
        self.log.append(
            &endpoint,
            Value::Object(Default::default()),
            json!({ "deleted": true }),
        );
        Ok(())
    }
}
