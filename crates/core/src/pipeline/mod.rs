//! Extraction pipeline state machine.
//!
//! Drives one run at a time through the remote analysis service:
//! - File path: ingest -> transform -> retrieve (structured JSON)
//! - Research path: research -> fixed settle wait -> retrieve (pretty text)
//!
//! Progress, cancellation, and failure state are caller-observable through
//! [`ExtractionPipeline::status`]; results are published only after the
//! configured settle delays.

mod config;
mod runner;
mod types;

pub use config::PipelineConfig;
pub use runner::ExtractionPipeline;
pub use types::*;
