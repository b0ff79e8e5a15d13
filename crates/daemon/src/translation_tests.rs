// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use std::sync::Arc;

use subflow_broker::{BrokerConfig, BrokerConnection};
use subflow_clients::{FakeLanguageModelClient, LmError};
use subflow_core::{Classify, FakeClock, Job, Phase, TokenCounter};
use subflow_engine::TranslationEngineConfig;
use subflow_storage::{InMemoryCheckpointStore, InMemoryJobStore, JobStore};
use subflow_wire::TranslationTask;
use tempfile::tempdir;

use super::*;

const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello there\n";

fn unconnected_ctx(
    job_store: Arc<dyn JobStore>,
    lm_client: Arc<dyn subflow_clients::LanguageModelClient>,
) -> TranslationContext {
    TranslationContext {
        job_store,
        lm_client,
        checkpoint_store: Arc::new(InMemoryCheckpointStore::new()),
        token_counter: Arc::new(TokenCounter::new()),
        broker: Arc::new(BrokerConnection::new(BrokerConfig::default())),
        subtitle_storage_path: std::env::temp_dir(),
        engine_config: TranslationEngineConfig::default(),
    }
}

#[tokio::test]
async fn handle_message_drops_malformed_payload() {
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let lm_client = Arc::new(FakeLanguageModelClient::new());
    let ctx = Arc::new(unconnected_ctx(job_store, lm_client));

    let result = handle_message(b"not json".to_vec(), ctx).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn handle_message_requeues_on_transient_lm_failure() {
    let storage_dir = tempdir().unwrap();
    let subtitle_path = storage_dir.path().join("job.en.srt");
    std::fs::write(&subtitle_path, SAMPLE_SRT).unwrap();

    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let job = Job::builder().source_language("en").target_language("es").build();
    let job_id = job.id;
    job_store.save_job(job).await.unwrap();

    // Every chunk failure — including an authentication error — is
    // aggregated by the engine into a transient `ChunkBatch` error, since
    // a fresh attempt resumes from checkpoint rather than repeating work.
    let lm_client = Arc::new(FakeLanguageModelClient::failing(LmError::Authentication("no key".into())));
    let ctx = Arc::new(unconnected_ctx(Arc::clone(&job_store), lm_client));

    let task = TranslationTask {
        job_id,
        subtitle_file_path: subtitle_path.to_string_lossy().into_owned(),
        source_language: "en".to_string(),
        target_language: "es".to_string(),
    };

    let result = handle_message(serde_json::to_vec(&task).unwrap(), ctx).await;
    assert!(result.is_err(), "chunk batch failures are redelivered, not failed outright");

    let job = job_store.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.phase, Phase::TranslateInProgress);
}

#[tokio::test]
async fn handle_message_fails_job_on_invalid_engine_config() {
    let storage_dir = tempdir().unwrap();
    let subtitle_path = storage_dir.path().join("job.en.srt");
    std::fs::write(&subtitle_path, SAMPLE_SRT).unwrap();

    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let job = Job::builder().source_language("en").target_language("es").build();
    let job_id = job.id;
    job_store.save_job(job).await.unwrap();

    let lm_client = Arc::new(FakeLanguageModelClient::new());
    let mut ctx = unconnected_ctx(Arc::clone(&job_store), lm_client);
    ctx.engine_config.split_options.max_tokens = 0;
    let ctx = Arc::new(ctx);

    let task = TranslationTask {
        job_id,
        subtitle_file_path: subtitle_path.to_string_lossy().into_owned(),
        source_language: "en".to_string(),
        target_language: "es".to_string(),
    };

    let result = handle_message(serde_json::to_vec(&task).unwrap(), ctx).await;
    assert!(result.is_ok(), "a permanent failure acks the message rather than requeuing it");

    let job = job_store.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.phase, Phase::Failed);
}

#[tokio::test]
async fn handle_message_requeues_when_broker_unreachable_after_successful_translation() {
    let storage_dir = tempdir().unwrap();
    let subtitle_path = storage_dir.path().join("job.en.srt");
    std::fs::write(&subtitle_path, SAMPLE_SRT).unwrap();

    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let job = Job::builder().source_language("en").target_language("es").build();
    let job_id = job.id;
    job_store.save_job(job).await.unwrap();

    let lm_client = Arc::new(FakeLanguageModelClient::new());
    let mut ctx = unconnected_ctx(Arc::clone(&job_store), lm_client);
    ctx.subtitle_storage_path = storage_dir.path().to_path_buf();
    let ctx = Arc::new(ctx);

    let task = TranslationTask {
        job_id,
        subtitle_file_path: subtitle_path.to_string_lossy().into_owned(),
        source_language: "en".to_string(),
        target_language: "es".to_string(),
    };

    let result = handle_message(serde_json::to_vec(&task).unwrap(), ctx).await;
    assert!(result.is_err());

    let job = job_store.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.phase, Phase::TranslateInProgress);

    let output_path = storage_dir.path().join(format!("{job_id}.es.srt"));
    assert!(output_path.exists(), "translated file is written before the event publish fails");
}

#[test]
fn broker_not_connected_is_classified_transient() {
    assert!(subflow_broker::BrokerError::NotConnected.class().is_retryable());
}
