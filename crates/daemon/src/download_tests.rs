// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use std::sync::Arc;

use subflow_broker::{BrokerConfig, BrokerConnection};
use subflow_clients::{FakeCatalogClient, SubtitleCandidate};
use subflow_core::{Classify, FakeClock, Job, Phase};
use subflow_storage::{InMemoryJobStore, JobStore};
use tempfile::tempdir;

use super::*;

fn candidate(id: &str, language: &str, download_count: u32) -> SubtitleCandidate {
    SubtitleCandidate {
        id: id.to_string(),
        language: language.to_string(),
        release_name: format!("{id}.srt"),
        download_count,
        uploaded_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

fn unconnected_ctx(
    job_store: Arc<dyn JobStore>,
    catalog_client: Arc<dyn subflow_clients::CatalogClient>,
    storage_dir: &std::path::Path,
) -> DownloadContext {
    DownloadContext {
        job_store,
        catalog_client,
        broker: Arc::new(BrokerConnection::new(BrokerConfig::default())),
        subtitle_storage_path: storage_dir.to_path_buf(),
    }
}

#[test]
fn parses_hash_size_source() {
    assert_eq!(parse_hash_source("deadbeef:12345"), Some(("deadbeef", 12345)));
}

#[test]
fn rejects_malformed_hash_source() {
    assert_eq!(parse_hash_source("not-a-hash-source"), None);
    assert_eq!(parse_hash_source("deadbeef:not-a-number"), None);
}

#[tokio::test]
async fn resolve_candidates_prefers_hash_match() {
    let hash_hit = candidate("hash-hit", "es", 10);
    let catalog = Arc::new(FakeCatalogClient::new(vec![hash_hit.clone()]));
    let storage_dir = tempdir().unwrap();
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let ctx = unconnected_ctx(job_store, catalog, storage_dir.path());

    let task = DownloadTask {
        job_id: subflow_core::JobId::new(),
        video_url: "https://example.test/video.mkv".to_string(),
        video_title: "Example Video".to_string(),
        language: "es".to_string(),
        preferred_sources: vec!["abc123:4096".to_string()],
    };

    let candidates = resolve_candidates(&ctx, &task).await.unwrap();
    assert_eq!(candidates, vec![hash_hit]);
}

#[tokio::test]
async fn resolve_candidates_falls_back_to_query_search() {
    let hit = candidate("query-hit", "es", 3);
    let catalog = Arc::new(FakeCatalogClient::new(vec![hit.clone()]));
    let storage_dir = tempdir().unwrap();
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let ctx = unconnected_ctx(job_store, catalog, storage_dir.path());

    let task = DownloadTask {
        job_id: subflow_core::JobId::new(),
        video_url: "https://example.test/video.mkv".to_string(),
        video_title: "Example Video".to_string(),
        language: "es".to_string(),
        preferred_sources: vec![],
    };

    let candidates = resolve_candidates(&ctx, &task).await.unwrap();
    assert_eq!(candidates, vec![hit]);
}

#[tokio::test]
async fn handle_message_drops_malformed_payload() {
    let storage_dir = tempdir().unwrap();
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let catalog = Arc::new(FakeCatalogClient::new(vec![]));
    let ctx = Arc::new(unconnected_ctx(job_store, catalog, storage_dir.path()));

    let result = handle_message(b"not json".to_vec(), ctx).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn handle_message_fails_job_when_no_candidates_found() {
    let storage_dir = tempdir().unwrap();
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let job = Job::builder().source_language("en").build();
    let job_id = job.id;
    job_store.save_job(job).await.unwrap();

    let catalog = Arc::new(FakeCatalogClient::new(vec![]));
    let ctx = Arc::new(unconnected_ctx(Arc::clone(&job_store), catalog, storage_dir.path()));

    let task = DownloadTask {
        job_id,
        video_url: "https://example.test/video.mkv".to_string(),
        video_title: "Example Video".to_string(),
        language: "es".to_string(),
        preferred_sources: vec![],
    };

    let result = handle_message(serde_json::to_vec(&task).unwrap(), ctx).await;
    assert!(result.is_ok(), "a permanent failure acks the message rather than requeuing it");

    let job = job_store.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.phase, Phase::Failed);
    assert!(job.error_message.unwrap().contains("no subtitle candidates"));
}

#[tokio::test]
async fn handle_message_requeues_on_unreachable_broker() {
    let storage_dir = tempdir().unwrap();
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let job = Job::builder().source_language("en").build();
    let job_id = job.id;
    job_store.save_job(job).await.unwrap();

    let catalog = Arc::new(FakeCatalogClient::new(vec![candidate("found-it", "es", 1)]));
    let ctx = Arc::new(unconnected_ctx(Arc::clone(&job_store), catalog, storage_dir.path()));

    let task = DownloadTask {
        job_id,
        video_url: "https://example.test/video.mkv".to_string(),
        video_title: "Example Video".to_string(),
        language: "es".to_string(),
        preferred_sources: vec![],
    };

    // A candidate is found and "downloaded" by the fake client, but
    // publishing the completion event needs a broker channel that was
    // never connected — a transient failure, so the message is requeued
    // and the job is left in progress rather than marked failed.
    let result = handle_message(serde_json::to_vec(&task).unwrap(), ctx).await;
    assert!(result.is_err());

    let job = job_store.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.phase, Phase::DownloadInProgress);
}

#[test]
fn broker_not_connected_is_classified_transient() {
    assert!(subflow_broker::BrokerError::NotConnected.class().is_retryable());
}
