//! Run lifecycle integration tests.
//!
//! These tests verify the complete extraction pipeline with a mock gateway:
//! - File-upload and live-research paths end to end
//! - Single-run occupancy and cancellation
//! - Failure handling and return to idle
//! - Remote object teardown

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use prospector_core::{
    testing::{fixtures, MockGateway},
    ExtractionPipeline, PipelineConfig, PipelineError, RunStage, SourceMode,
};

/// Test helper bundling a pipeline with a shared handle to its mock gateway.
struct TestHarness {
    gateway: MockGateway,
    pipeline: Arc<ExtractionPipeline<MockGateway>>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(PipelineConfig {
            research_settle_secs: 0,
            completion_settle_ms: 0,
        })
    }

    fn with_config(config: PipelineConfig) -> Self {
        let gateway = MockGateway::new();
        // One log shared between gateway and pipeline, as in production.
        let log = gateway.call_log().clone();
        let pipeline = Arc::new(ExtractionPipeline::new(gateway.clone(), config, log));
        Self { gateway, pipeline }
    }
}

#[tokio::test]
async fn test_file_run_end_to_end() {
    let harness = TestHarness::new();
    harness
        .gateway
        .set_retrieve_value(fixtures::extraction_payload())
        .await;

    let records = harness
        .pipeline
        .run_file("{\"clicks\": 120}", "extract insights")
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].content, "Top query: rust tutorials");
    assert_eq!(records[0].kind, "keyword");
    assert_eq!(records[1].kind, "ranking");

    let status = harness.pipeline.status();
    assert_eq!(status.stage, RunStage::Complete);
    assert_eq!(status.progress, 100);
    assert_eq!(status.mode, Some(SourceMode::FileUpload));
    assert!(status.run_id.is_some());
    assert_eq!(harness.pipeline.records(), Some(records));

    // Ingest object first, derived object second.
    let names = harness.pipeline.registry().all();
    assert_eq!(names.len(), 2);
    assert!(names[0].as_str().starts_with("seo_data_"));
    assert!(names[1].as_str().starts_with("extracted_seo_"));

    let calls = harness.gateway.recorded_calls().await;
    let operations: Vec<&str> = calls.iter().map(|c| c.operation.as_str()).collect();
    assert_eq!(operations, vec!["ingest", "transform", "retrieve"]);
    assert_eq!(calls[1].detail, "extract insights");
}

#[tokio::test]
async fn test_research_run_end_to_end() {
    let harness = TestHarness::new();
    harness
        .gateway
        .set_retrieve_value(fixtures::research_summary())
        .await;

    let request = fixtures::research_request("https://example.com");
    let records = harness.pipeline.run_research(&request).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, "research");
    assert!(records[0].content.contains("rust web framework"));

    let names = harness.pipeline.registry().all();
    assert_eq!(names.len(), 1);
    assert!(names[0].as_str().starts_with("weekly_research_"));

    // The goal carries the site, keywords, and competitors from the request.
    let research_calls = harness.gateway.calls_for("research").await;
    assert_eq!(research_calls.len(), 1);
    assert!(research_calls[0].detail.contains("https://example.com"));
    assert!(research_calls[0].detail.contains("rust, async"));
    assert!(research_calls[0].detail.contains("https://example.org"));
}

#[tokio::test]
async fn test_research_empty_result_is_an_error() {
    let harness = TestHarness::new();
    harness.gateway.set_retrieve_value(json!(null)).await;

    let request = fixtures::research_request("https://example.com");
    let err = harness.pipeline.run_research(&request).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyResult(_)));

    // Every call succeeded, yet the run fails and returns to idle. The
    // research object stays registered for teardown.
    let status = harness.pipeline.status();
    assert_eq!(status.stage, RunStage::Idle);
    assert_eq!(status.progress, 0);
    assert_eq!(harness.pipeline.registry().len(), 1);
}

#[tokio::test]
async fn test_empty_string_result_is_an_error() {
    let harness = TestHarness::new();
    harness.gateway.set_retrieve_value(json!("")).await;

    let request = fixtures::research_request("https://example.com");
    let err = harness.pipeline.run_research(&request).await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyResult(_)));
}

#[tokio::test]
async fn test_cancel_discards_late_result() {
    let harness = TestHarness::new();
    harness
        .gateway
        .set_retrieve_value(fixtures::extraction_payload())
        .await;
    harness
        .gateway
        .set_call_delay(Duration::from_millis(200))
        .await;

    let pipeline = Arc::clone(&harness.pipeline);
    let handle =
        tokio::spawn(async move { pipeline.run_file("{\"a\": 1}", "extract").await });

    // Let the run reach its first gateway call, then cancel under it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.pipeline.status().stage, RunStage::Running);
    assert!(harness.pipeline.cancel());

    let status = harness.pipeline.status();
    assert_eq!(status.stage, RunStage::Idle);
    assert_eq!(status.progress, 0);
    assert!(status.mode.is_none());

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert!(harness.pipeline.records().is_none());
    assert_eq!(harness.pipeline.status().stage, RunStage::Idle);
}

#[tokio::test]
async fn test_second_run_rejected_while_running() {
    let harness = TestHarness::new();
    harness
        .gateway
        .set_retrieve_value(fixtures::extraction_payload())
        .await;
    harness
        .gateway
        .set_call_delay(Duration::from_millis(200))
        .await;

    let pipeline = Arc::clone(&harness.pipeline);
    let handle =
        tokio::spawn(async move { pipeline.run_file("{\"a\": 1}", "extract").await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let err = harness
        .pipeline
        .run_research(&fixtures::research_request("https://example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotIdle(RunStage::Running)));

    // The original run is unaffected by the rejected start.
    let records = handle.await.unwrap().unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_failed_file_run_keeps_partial_registry() {
    let harness = TestHarness::new();
    harness.gateway.fail_transform("backend exploded").await;

    let err = harness
        .pipeline
        .run_file("{\"a\": 1}", "extract")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Gateway(_)));

    assert_eq!(harness.pipeline.status().stage, RunStage::Idle);
    assert_eq!(harness.pipeline.registry().len(), 1);

    // Teardown still removes the orphaned ingest object.
    let report = harness.pipeline.teardown().await;
    assert!(report.all_succeeded());
    assert!(harness.pipeline.registry().is_empty());
}

#[tokio::test]
async fn test_teardown_attempts_every_object() {
    let harness = TestHarness::new();
    harness
        .gateway
        .set_retrieve_value(fixtures::extraction_payload())
        .await;
    harness
        .pipeline
        .run_file("{\"a\": 1}", "extract")
        .await
        .unwrap();

    let names = harness.pipeline.registry().all();
    assert_eq!(names.len(), 2);
    harness.gateway.fail_delete(names[0].as_str()).await;

    let report = harness.pipeline.teardown().await;

    // The first deletion fails but the second is still attempted.
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.failed_count(), 1);
    assert_eq!(report.deleted_count(), 1);
    assert!(!report.all_succeeded());
    assert_eq!(report.outcomes[0].name, names[0]);
    assert!(report.outcomes[0].error.is_some());
    assert!(report.outcomes[1].error.is_none());

    // State is cleared regardless of deletion failures.
    assert!(harness.pipeline.registry().is_empty());
    assert_eq!(harness.pipeline.status().stage, RunStage::Idle);
    assert!(harness.pipeline.records().is_none());
    assert_eq!(harness.gateway.calls_for("delete").await.len(), 2);
}

#[tokio::test]
async fn test_completion_settles_before_result_is_published() {
    let harness = TestHarness::with_config(PipelineConfig {
        research_settle_secs: 0,
        completion_settle_ms: 150,
    });
    harness
        .gateway
        .set_retrieve_value(fixtures::extraction_payload())
        .await;

    let start = Instant::now();
    harness
        .pipeline
        .run_file("{\"a\": 1}", "extract")
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(150));
    assert_eq!(harness.pipeline.status().stage, RunStage::Complete);
}

#[tokio::test]
async fn test_registry_names_match_creating_log_entries() {
    let harness = TestHarness::new();
    harness
        .gateway
        .set_retrieve_value(fixtures::extraction_payload())
        .await;
    harness
        .pipeline
        .run_file("{\"clicks\": 120}", "extract insights")
        .await
        .unwrap();

    // Every registered name corresponds to exactly one successful creating
    // call in the shared log.
    let names = harness.pipeline.registry().all();
    assert_eq!(names.len(), 2);
    let entries = harness.pipeline.call_log().recent();
    for name in &names {
        let creating = entries
            .iter()
            .filter(|e| e.response["created_object_name"] == name.as_str())
            .count();
        assert_eq!(creating, 1, "no unique creating entry for {}", name);
    }

    // A failed call is logged too, with its error response, and creates no
    // registry entry.
    harness.pipeline.reset();
    harness.gateway.fail_transform("boom").await;
    harness
        .pipeline
        .run_file("{\"clicks\": 7}", "extract insights")
        .await
        .unwrap_err();

    let entries = harness.pipeline.call_log().recent();
    let failed = entries
        .iter()
        .find(|e| e.endpoint == "/apply_prompt" && e.response.get("error").is_some())
        .expect("failed transform not logged");
    assert!(failed.response["error"]
        .as_str()
        .unwrap()
        .contains("boom"));
    assert_eq!(harness.pipeline.registry().len(), 3);
}

#[tokio::test]
async fn test_registry_accumulates_across_runs() {
    let harness = TestHarness::new();
    harness
        .gateway
        .set_retrieve_value(fixtures::extraction_payload())
        .await;

    harness
        .pipeline
        .run_file("{\"a\": 1}", "extract")
        .await
        .unwrap();
    harness.pipeline.reset();

    harness
        .gateway
        .set_retrieve_value(fixtures::research_summary())
        .await;
    harness
        .pipeline
        .run_research(&fixtures::research_request("https://example.com"))
        .await
        .unwrap();

    // Two objects from the file run plus one from the research run.
    assert_eq!(harness.pipeline.registry().len(), 3);
}
