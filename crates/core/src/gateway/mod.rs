//! Typed wrapper around the remote analysis service.
//!
//! The service exposes a four-operation protocol (ingest, transform,
//! research, retrieve) plus per-object deletion. The gateway owns
//! request/response logging into the [`CallLog`](crate::call_log::CallLog)
//! and generates object names locally; response bodies are otherwise opaque.

mod config;
mod error;
mod http;
mod types;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpGateway;
pub use types::*;
