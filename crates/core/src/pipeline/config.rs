//! Pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the extraction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How long to wait after starting a research job before retrieving its
    /// result, in seconds. The service offers no readiness signal, so the
    /// pipeline assumes the job is done once this interval elapses; no
    /// result is ever surfaced earlier.
    #[serde(default = "default_research_settle_secs")]
    pub research_settle_secs: u64,

    /// Pause before publishing a finished result, in milliseconds.
    #[serde(default = "default_completion_settle_ms")]
    pub completion_settle_ms: u64,
}

fn default_research_settle_secs() -> u64 {
    15
}

fn default_completion_settle_ms() -> u64 {
    1000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            research_settle_secs: default_research_settle_secs(),
            completion_settle_ms: default_completion_settle_ms(),
        }
    }
}

impl PipelineConfig {
    /// Research settle delay as a [`Duration`].
    pub fn research_settle(&self) -> Duration {
        Duration::from_secs(self.research_settle_secs)
    }

    /// Completion settle delay as a [`Duration`].
    pub fn completion_settle(&self) -> Duration {
        Duration::from_millis(self.completion_settle_ms)
    }
}
