//! Types for the extraction pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::objects::ObjectName;

/// Externally observable stage of the pipeline.
///
/// Failure is not a distinct stage: a failed run transitions straight back to
/// `Idle` with progress reset to 0, and the error is returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    /// No run active; the only stage a new run may start from.
    Idle,
    /// A run is in flight.
    Running,
    /// A run finished and its records are available.
    Complete,
}

impl RunStage {
    /// Stage name for logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStage::Idle => "idle",
            RunStage::Running => "running",
            RunStage::Complete => "complete",
        }
    }
}

impl std::fmt::Display for RunStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a run's input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMode {
    /// Uploaded file content plus extraction instructions.
    FileUpload,
    /// Live web research from a site, keywords, and competitors.
    LiveResearch,
}

impl SourceMode {
    /// Mode name for logs and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::FileUpload => "file-upload",
            SourceMode::LiveResearch => "live-research",
        }
    }
}

/// Inputs for a live-research run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// Website under analysis.
    pub website_url: String,
    /// Keywords to research.
    pub target_keywords: Vec<String>,
    /// Competitor sites to compare against.
    pub competitor_urls: Vec<String>,
}

impl ResearchRequest {
    /// Compose the goal string sent to the research endpoint.
    pub fn goal(&self) -> String {
        format!(
            "Research SEO data for website {} with target keywords: {}. \
             Analyze competitor URLs: {}. \
             Find search volumes, trending topics, and competitor gaps.",
            self.website_url,
            self.target_keywords.join(", "),
            self.competitor_urls.join(", "),
        )
    }
}

/// Snapshot of the pipeline's observable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStatus {
    /// Current stage.
    pub stage: RunStage,
    /// Progress percentage, 0-100, monotonically non-decreasing per run.
    pub progress: u8,
    /// Source mode of the active (or completed) run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SourceMode>,
    /// Identifier of the active (or completed) run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
}

/// Errors surfaced by pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A run may only start while the pipeline is idle.
    #[error("cannot start a run while the pipeline is {0}")]
    NotIdle(RunStage),

    /// A gateway call failed; the run was aborted.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The retrieve call succeeded but carried no usable payload.
    #[error("no usable result for object {0}")]
    EmptyResult(ObjectName),

    /// The run was cancelled before it could finish.
    #[error("run was cancelled")]
    Cancelled,
}
