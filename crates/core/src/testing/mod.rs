//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides a mock implementation of the Gateway trait,
//! allowing full pipeline testing without a real extraction backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use prospector_core::testing::{MockGateway, fixtures};
//!
//! let gateway = MockGateway::new();
//! gateway.set_retrieve_value(fixtures::extraction_payload()).await;
//!
//! // Use in an ExtractionPipeline...
//! ```

mod mock_gateway;

pub use mock_gateway::{MockGateway, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::pipeline::ResearchRequest;

    /// An extraction payload with well-formed records.
    pub fn extraction_payload() -> Value {
        json!([
            {"content": "Top query: rust tutorials", "type": "keyword"},
            {"content": "Ranked #3 for async programming", "type": "ranking"},
        ])
    }

    /// A research summary as the backend returns it in pretty-text form.
    pub fn research_summary() -> Value {
        json!("Search volume for \"rust web framework\" is up 40% month over month.")
    }

    /// A research request with reasonable defaults.
    pub fn research_request(website_url: &str) -> ResearchRequest {
        ResearchRequest {
            website_url: website_url.to_string(),
            target_keywords: vec!["rust".to_string(), "async".to_string()],
            competitor_urls: vec!["https://example.org".to_string()],
        }
    }
}
