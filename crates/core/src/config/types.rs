//! Configuration types.

use serde::{Deserialize, Serialize};

use crate::gateway::GatewayConfig;
use crate::pipeline::PipelineConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Analysis service gateway settings.
    pub gateway: GatewayConfig,

    /// Pipeline timing settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            [gateway]
            base_url = "http://localhost:8080/api_tools"
            bearer_token = "secret"
            app_id = "app-1"
            usage_key = "usage-1"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.gateway.timeout_secs, 30);
        assert_eq!(config.pipeline.research_settle_secs, 15);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            [gateway]
            base_url = "http://localhost:8080/api_tools"
            bearer_token = "secret"
            app_id = "app-1"
            usage_key = "usage-1"
            timeout_secs = 10

            [pipeline]
            research_settle_secs = 30
            completion_settle_ms = 250
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.gateway.timeout_secs, 10);
        assert_eq!(config.pipeline.research_settle_secs, 30);
        assert_eq!(config.pipeline.completion_settle_ms, 250);
    }

    #[test]
    fn test_missing_gateway_is_an_error() {
        let result: Result<Config, _> = toml::from_str("[pipeline]\n");
        assert!(result.is_err());
    }
}
