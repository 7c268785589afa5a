use thiserror::Error;

/// Errors that can occur talking to the analysis service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Could not reach the service at all.
    #[error("service connection failed: {0}")]
    ConnectionFailed(String),

    /// The request timed out.
    #[error("request timeout")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to decode service response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Map a reqwest error into the transport taxonomy.
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::ConnectionFailed(e.to_string())
        }
    }
}
