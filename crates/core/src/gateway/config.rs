//! Gateway configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP gateway.
///
/// The bearer token and the two routing identifiers are deployment
/// configuration supplied by the service operator; they are attached to
/// every request but are not part of the protocol contract itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the analysis service, e.g.
    /// `https://builder.example.com/api_tools`.
    pub base_url: String,

    /// Bearer credential sent in the `Authorization` header.
    pub bearer_token: String,

    /// Value for the `X-Generated-App-ID` header.
    pub app_id: String,

    /// Value for the `X-Usage-Key` header.
    pub usage_key: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
}

fn default_timeout_secs() -> u32 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bearer_token: String::new(),
            app_id: String::new(),
            usage_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
