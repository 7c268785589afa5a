//! Application configuration.
//!
//! Loaded from a TOML file with `PROSPECTOR_`-prefixed environment variable
//! overrides, then validated before use.

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str};
pub use types::Config;
pub use validate::validate_config;

use thiserror::Error;

/// Errors that can occur loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("config file not found: {0}")]
    FileNotFound(String),

    /// Configuration could not be parsed.
    #[error("failed to parse config: {0}")]
    ParseError(String),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}
