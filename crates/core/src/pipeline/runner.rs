//! Extraction pipeline implementation.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::call_log::CallLog;
use crate::gateway::{DeletionReport, Gateway, RetrieveFormat};
use crate::metrics;
use crate::normalizer::{normalize, Record};
use crate::objects::ObjectRegistry;

use super::config::PipelineConfig;
use super::types::{PipelineError, ResearchRequest, RunStage, RunStatus, SourceMode};

// Stage progress values, matching the contract observed by consumers.
const PROGRESS_CONTENT_STAGED: u8 = 30;
const PROGRESS_INGESTED: u8 = 60;
const PROGRESS_TRANSFORMED: u8 = 90;
const PROGRESS_RESEARCH_STARTED: u8 = 50;
const PROGRESS_RESEARCH_SETTLED: u8 = 80;
const PROGRESS_RETRIEVED: u8 = 100;

/// Mutable run state behind the state lock.
///
/// `epoch` increments on every start, cancel, and teardown; an in-flight run
/// carries the epoch it started with and discards its own late effects once
/// the epochs no longer match.
#[derive(Debug)]
struct RunState {
    stage: RunStage,
    progress: u8,
    mode: Option<SourceMode>,
    run_id: Option<Uuid>,
    result: Option<Vec<Record>>,
    epoch: u64,
}

impl RunState {
    fn reset_to_idle(&mut self) {
        self.stage = RunStage::Idle;
        self.progress = 0;
        self.mode = None;
        self.run_id = None;
        self.result = None;
    }
}

/// The extraction pipeline state machine.
///
/// Owns the gateway, the remote object registry, and the caller-observable
/// run state. Exactly one run is active at a time: starting is only allowed
/// from [`RunStage::Idle`]. All stages within a run execute strictly
/// sequentially; network calls are the suspension points.
pub struct ExtractionPipeline<G: Gateway> {
    gateway: G,
    registry: Arc<ObjectRegistry>,
    log: CallLog,
    config: PipelineConfig,
    state: Mutex<RunState>,
}

impl<G: Gateway> ExtractionPipeline<G> {
    /// Create a new pipeline. The call log is shared with the gateway so
    /// that diagnostics consumers see every remote interaction.
    pub fn new(gateway: G, config: PipelineConfig, log: CallLog) -> Self {
        Self {
            gateway,
            registry: Arc::new(ObjectRegistry::new()),
            log,
            config,
            state: Mutex::new(RunState {
                stage: RunStage::Idle,
                progress: 0,
                mode: None,
                run_id: None,
                result: None,
                epoch: 0,
            }),
        }
    }

    /// Registry of remote objects created by this pipeline's runs.
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Shared gateway interaction log.
    pub fn call_log(&self) -> &CallLog {
        &self.log
    }

    /// Snapshot of the observable run state.
    pub fn status(&self) -> RunStatus {
        let state = self.lock_state();
        RunStatus {
            stage: state.stage,
            progress: state.progress,
            mode: state.mode,
            run_id: state.run_id,
        }
    }

    /// Records of the completed run, if the pipeline is in
    /// [`RunStage::Complete`].
    pub fn records(&self) -> Option<Vec<Record>> {
        self.lock_state().result.clone()
    }

    /// Run the file-upload path: ingest the content, apply the extraction
    /// instructions, retrieve and normalize the derived object.
    ///
    /// The caller supplies the file content already read from disk. On any
    /// gateway failure the pipeline returns to idle with progress 0 and the
    /// error is returned.
    pub async fn run_file(
        &self,
        content: &str,
        instructions: &str,
    ) -> Result<Vec<Record>, PipelineError> {
        let epoch = self.begin(SourceMode::FileUpload)?;
        let start = Instant::now();
        let result = self.drive_file(epoch, content, instructions).await;
        self.finish(epoch, SourceMode::FileUpload, start, result)
    }

    /// Run the live-research path: start a server-side research job, wait
    /// out the settle delay, then retrieve the result as pretty text.
    ///
    /// An empty or absent result after a transport-successful retrieve is an
    /// error: the run fails even though every call succeeded.
    pub async fn run_research(
        &self,
        request: &ResearchRequest,
    ) -> Result<Vec<Record>, PipelineError> {
        let epoch = self.begin(SourceMode::LiveResearch)?;
        let start = Instant::now();
        let result = self.drive_research(epoch, request).await;
        self.finish(epoch, SourceMode::LiveResearch, start, result)
    }

    /// Cancel the active run. Valid only while running; returns whether a
    /// run was cancelled.
    ///
    /// The observable state flips to idle immediately. In-flight network
    /// calls are not aborted; their late responses are discarded when the
    /// stale run task next checks its epoch.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock_state();
        if state.stage != RunStage::Running {
            debug!(stage = %state.stage, "Cancel ignored, no active run");
            return false;
        }

        state.reset_to_idle();
        state.epoch += 1;
        info!("Run cancelled");
        true
    }

    /// Return a completed (or idle) pipeline to idle, dropping any held
    /// result. Required before starting a new run from
    /// [`RunStage::Complete`]. The registry is left untouched.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.reset_to_idle();
        state.epoch += 1;
    }

    /// Delete every registered remote object and clear the run state.
    ///
    /// Deletion is best-effort per object; failures are collected in the
    /// report and never block the remaining attempts. The registry and the
    /// held result are cleared regardless of individual outcomes.
    pub async fn teardown(&self) -> DeletionReport {
        let names = self.registry.all();
        info!(objects = names.len(), "Tearing down remote objects");

        let report = self.gateway.delete_all(&names).await;
        if !report.all_succeeded() {
            warn!(
                failed = report.failed_count(),
                deleted = report.deleted_count(),
                "Teardown finished with failures"
            );
        }

        self.registry.clear();
        let mut state = self.lock_state();
        state.reset_to_idle();
        state.epoch += 1;
        report
    }

    async fn drive_file(
        &self,
        epoch: u64,
        content: &str,
        instructions: &str,
    ) -> Result<Vec<Record>, PipelineError> {
        // Content is fully in hand before any network work starts.
        self.advance(epoch, PROGRESS_CONTENT_STAGED)?;

        let source = self.gateway.ingest(content).await?;
        self.registry.record(source.clone());
        self.advance(epoch, PROGRESS_INGESTED)?;

        let derived = self.gateway.transform(&source, instructions).await?;
        self.registry.record(derived.clone());
        self.advance(epoch, PROGRESS_TRANSFORMED)?;

        let payload = self.gateway.retrieve(&derived, RetrieveFormat::Json).await?;
        self.advance(epoch, PROGRESS_RETRIEVED)?;

        let records = normalize(&payload, "text");
        debug!(records = records.len(), "File extraction normalized");

        // No result is surfaced before the settle delay elapses.
        tokio::time::sleep(self.config.completion_settle()).await;
        self.complete(epoch, records.clone())?;
        Ok(records)
    }

    async fn drive_research(
        &self,
        epoch: u64,
        request: &ResearchRequest,
    ) -> Result<Vec<Record>, PipelineError> {
        let goal = request.goal();
        let object = self.gateway.research(&goal).await?;
        self.registry.record(object.clone());
        self.advance(epoch, PROGRESS_RESEARCH_STARTED)?;

        // The service gives no readiness signal. The contract is a fixed
        // wait: no result is surfaced before it elapses, and the job is
        // assumed done afterwards.
        tokio::time::sleep(self.config.research_settle()).await;
        self.advance(epoch, PROGRESS_RESEARCH_SETTLED)?;

        let payload = self
            .gateway
            .retrieve(&object, RetrieveFormat::PrettyText)
            .await?;
        self.advance(epoch, PROGRESS_RETRIEVED)?;

        if payload.is_null() || payload.as_str().is_some_and(str::is_empty) {
            return Err(PipelineError::EmptyResult(object));
        }

        let content = match &payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let records = vec![Record::new(content, "research")];

        tokio::time::sleep(self.config.completion_settle()).await;
        self.complete(epoch, records.clone())?;
        Ok(records)
    }

    /// Transition idle -> running, returning the new run epoch.
    fn begin(&self, mode: SourceMode) -> Result<u64, PipelineError> {
        let mut state = self.lock_state();
        if state.stage != RunStage::Idle {
            return Err(PipelineError::NotIdle(state.stage));
        }

        state.stage = RunStage::Running;
        state.progress = 0;
        state.mode = Some(mode);
        state.run_id = Some(Uuid::new_v4());
        state.result = None;
        state.epoch += 1;

        info!(mode = mode.as_str(), run_id = %state.run_id.unwrap_or_default(), "Run started");
        Ok(state.epoch)
    }

    /// Raise progress for the run identified by `epoch`. Progress never
    /// decreases within a run; a stale epoch means the run was cancelled.
    fn advance(&self, epoch: u64, progress: u8) -> Result<(), PipelineError> {
        let mut state = self.lock_state();
        if state.epoch != epoch {
            return Err(PipelineError::Cancelled);
        }
        state.progress = state.progress.max(progress);
        Ok(())
    }

    /// Publish the result and transition to complete.
    fn complete(&self, epoch: u64, records: Vec<Record>) -> Result<(), PipelineError> {
        let mut state = self.lock_state();
        if state.epoch != epoch {
            return Err(PipelineError::Cancelled);
        }
        state.stage = RunStage::Complete;
        state.progress = 100;
        state.result = Some(records);
        Ok(())
    }

    /// Return the run to idle after a failure, unless it was already
    /// cancelled (stale epoch).
    fn fail(&self, epoch: u64) {
        let mut state = self.lock_state();
        if state.epoch != epoch {
            return;
        }
        state.reset_to_idle();
    }

    /// Map the drive result to observable state and metrics.
    fn finish(
        &self,
        epoch: u64,
        mode: SourceMode,
        start: Instant,
        result: Result<Vec<Record>, PipelineError>,
    ) -> Result<Vec<Record>, PipelineError> {
        metrics::RUN_DURATION
            .with_label_values(&[mode.as_str()])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(records) => {
                metrics::RUNS_TOTAL
                    .with_label_values(&[mode.as_str(), "complete"])
                    .inc();
                info!(mode = mode.as_str(), records = records.len(), "Run complete");
            }
            Err(PipelineError::Cancelled) => {
                metrics::RUNS_TOTAL
                    .with_label_values(&[mode.as_str(), "cancelled"])
                    .inc();
                debug!(mode = mode.as_str(), "Run discarded after cancellation");
            }
            Err(e) => {
                self.fail(epoch);
                metrics::RUNS_TOTAL
                    .with_label_values(&[mode.as_str(), "failed"])
                    .inc();
                warn!(mode = mode.as_str(), error = %e, "Run failed");
            }
        }

        result
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RunState> {
        self.state.lock().expect("pipeline state lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGateway;

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            research_settle_secs: 0,
            completion_settle_ms: 0,
        }
    }

    fn pipeline_with(gateway: MockGateway) -> ExtractionPipeline<MockGateway> {
        ExtractionPipeline::new(gateway, fast_config(), CallLog::new())
    }

    #[tokio::test]
    async fn test_initial_status_is_idle() {
        let pipeline = pipeline_with(MockGateway::new());
        let status = pipeline.status();
        assert_eq!(status.stage, RunStage::Idle);
        assert_eq!(status.progress, 0);
        assert!(status.mode.is_none());
        assert!(status.run_id.is_none());
    }

    #[tokio::test]
    async fn test_cancel_without_active_run() {
        let pipeline = pipeline_with(MockGateway::new());
        assert!(!pipeline.cancel());
        assert_eq!(pipeline.status().stage, RunStage::Idle);
    }

    #[tokio::test]
    async fn test_file_run_happy_path() {
        let gateway = MockGateway::new();
        gateway
            .set_retrieve_value(serde_json::json!("[{\"content\":\"x\",\"type\":\"insight\"}]"))
            .await;

        let pipeline = pipeline_with(gateway);
        let records = pipeline.run_file("{\"a\":1}", "summarize").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "x");
        assert_eq!(records[0].kind, "insight");

        let status = pipeline.status();
        assert_eq!(status.stage, RunStage::Complete);
        assert_eq!(status.progress, 100);
        assert_eq!(pipeline.registry().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_run_returns_to_idle() {
        let gateway = MockGateway::new();
        gateway.fail_transform("boom").await;

        let pipeline = pipeline_with(gateway);
        let result = pipeline.run_file("content", "summarize").await;
        assert!(matches!(result, Err(PipelineError::Gateway(_))));

        let status = pipeline.status();
        assert_eq!(status.stage, RunStage::Idle);
        assert_eq!(status.progress, 0);
        // The ingest object was created before the failure and stays
        // registered until explicit teardown.
        assert_eq!(pipeline.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_start_from_complete_requires_reset() {
        let gateway = MockGateway::new();
        gateway.set_retrieve_value(serde_json::json!("done")).await;

        let pipeline = pipeline_with(gateway);
        pipeline.run_file("content", "summarize").await.unwrap();

        let err = pipeline.run_file("content", "again").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotIdle(RunStage::Complete)));

        pipeline.reset();
        assert!(pipeline.records().is_none());
        assert!(pipeline.run_file("content", "again").await.is_ok());
    }
}
