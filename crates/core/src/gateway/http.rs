//! HTTP implementation of the service gateway.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::call_log::CallLog;
use crate::metrics;
use crate::objects::{ObjectName, INGEST_PREFIX, RESEARCH_PREFIX, TRANSFORM_PREFIX};

use super::{Gateway, GatewayConfig, GatewayError, RetrieveFormat};

/// Gateway over the analysis service's HTTP API.
///
/// Object names are generated locally before each creating call; the service
/// response is never mined for identifiers.
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
    log: CallLog,
}

#[derive(Serialize)]
struct IngestRequest<'a> {
    created_object_name: &'a str,
    data_type: &'static str,
    input_data: Vec<&'a str>,
}

#[derive(Serialize)]
struct TransformRequest<'a> {
    created_object_names: Vec<&'a str>,
    prompt_string: &'a str,
    inputs: Vec<TransformInput<'a>>,
}

#[derive(Serialize)]
struct TransformInput<'a> {
    input_object_name: &'a str,
    mode: &'static str,
}

#[derive(Serialize)]
struct ResearchRequest<'a> {
    created_object_name: &'a str,
    goal: &'a str,
}

#[derive(Serialize)]
struct RetrieveRequest<'a> {
    object_name: &'a str,
    return_type: &'static str,
}

impl HttpGateway {
    /// Create a new gateway sharing the given call log.
    pub fn new(config: GatewayConfig, log: CallLog) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            log,
        }
    }

    /// Base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url(), endpoint)
    }

    /// POST a payload, record the interaction, and return the decoded body.
    async fn post_logged<T: Serialize>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<Value, GatewayError> {
        let payload_value = serde_json::to_value(payload).unwrap_or(Value::Null);
        let start = Instant::now();

        let result = self.execute_post(endpoint, &payload_value).await;
        metrics::GATEWAY_CALL_DURATION
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(body) => {
                metrics::GATEWAY_CALLS
                    .with_label_values(&[endpoint, "ok"])
                    .inc();
                self.log.append(endpoint, payload_value, body.clone());
            }
            Err(e) => {
                metrics::GATEWAY_CALLS
                    .with_label_values(&[endpoint, "error"])
                    .inc();
                self.log.append(
                    endpoint,
                    payload_value,
                    serde_json::json!({ "error": e.to_string() }),
                );
            }
        }

        result
    }

    async fn execute_post(&self, endpoint: &str, payload: &Value) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(self.endpoint_url(endpoint))
            .bearer_auth(&self.config.bearer_token)
            .header("X-Generated-App-ID", &self.config.app_id)
            .header("X-Usage-Key", &self.config.usage_key)
            .json(payload)
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn ingest(&self, content: &str) -> Result<ObjectName, GatewayError> {
        let name = ObjectName::generate(INGEST_PREFIX);
        let request = IngestRequest {
            created_object_name: name.as_str(),
            data_type: "strings",
            input_data: vec![content],
        };

        debug!(object = %name, bytes = content.len(), "Ingesting content");
        self.post_logged("/input_data", &request).await?;
        Ok(name)
    }

    async fn transform(
        &self,
        source: &ObjectName,
        instructions: &str,
    ) -> Result<ObjectName, GatewayError> {
        let name = ObjectName::generate(TRANSFORM_PREFIX);
        let request = TransformRequest {
            created_object_names: vec![name.as_str()],
            prompt_string: instructions,
            inputs: vec![TransformInput {
                input_object_name: source.as_str(),
                mode: "combine_events",
            }],
        };

        debug!(source = %source, derived = %name, "Applying transform");
        self.post_logged("/apply_prompt", &request).await?;
        Ok(name)
    }

    async fn research(&self, goal: &str) -> Result<ObjectName, GatewayError> {
        let name = ObjectName::generate(RESEARCH_PREFIX);
        let request = ResearchRequest {
            created_object_name: name.as_str(),
            goal,
        };

        debug!(object = %name, "Starting research");
        self.post_logged("/rapid_research", &request).await?;
        Ok(name)
    }

    async fn retrieve(
        &self,
        name: &ObjectName,
        format: RetrieveFormat,
    ) -> Result<Value, GatewayError> {
        let request = RetrieveRequest {
            object_name: name.as_str(),
            return_type: format.as_str(),
        };

        debug!(object = %name, format = format.as_str(), "Retrieving object");
        let body = self.post_logged("/return_data", &request).await?;

        // Only the `value` field is contractually consumed.
        Ok(body.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn delete(&self, name: &ObjectName) -> Result<(), GatewayError> {
        let endpoint = format!("/objects/{}", urlencoding::encode(name.as_str()));
        let log_endpoint = format!("DELETE {}", endpoint);
        let start = Instant::now();

        let result = self
            .client
            .delete(self.endpoint_url(&endpoint))
            .bearer_auth(&self.config.bearer_token)
            .header("X-Generated-App-ID", &self.config.app_id)
            .header("X-Usage-Key", &self.config.usage_key)
            .send()
            .await
            .map_err(GatewayError::from_transport);

        metrics::GATEWAY_CALL_DURATION
            .with_label_values(&["/objects"])
            .observe(start.elapsed().as_secs_f64());

        let outcome = match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    Ok(status.as_u16())
                } else {
                    let body = response.text().await.unwrap_or_default();
                    Err(GatewayError::Status {
                        status: status.as_u16(),
                        body: body.chars().take(200).collect(),
                    })
                }
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(status) => {
                metrics::GATEWAY_CALLS
                    .with_label_values(&["/objects", "ok"])
                    .inc();
                metrics::OBJECTS_DELETED.inc();
                self.log.append(
                    &log_endpoint,
                    Value::Object(Default::default()),
                    serde_json::json!({ "deleted": true, "status": status }),
                );
                Ok(())
            }
            Err(e) => {
                metrics::GATEWAY_CALLS
                    .with_label_values(&["/objects", "error"])
                    .inc();
                metrics::OBJECT_DELETE_FAILURES.inc();
                self.log.append(
                    &log_endpoint,
                    Value::Object(Default::default()),
                    serde_json::json!({ "error": e.to_string() }),
                );
                Err(e)
            }
        }
    }
}
