use super::{types::Config, ConfigError};

/// Validate configuration.
/// Currently validates:
/// - Gateway section exists (enforced by serde)
/// - Gateway base URL, bearer token, app id, and usage key are non-empty
/// - Gateway timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.gateway.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "gateway.base_url cannot be empty".to_string(),
        ));
    }
    if config.gateway.bearer_token.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "gateway.bearer_token cannot be empty".to_string(),
        ));
    }
    if config.gateway.app_id.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "gateway.app_id cannot be empty".to_string(),
        ));
    }
    if config.gateway.usage_key.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "gateway.usage_key cannot be empty".to_string(),
        ));
    }
    if config.gateway.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "gateway.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
