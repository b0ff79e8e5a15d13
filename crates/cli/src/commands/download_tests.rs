// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use std::sync::Arc;

use subflow_broker::{BrokerConfig, BrokerConnection};
use subflow_core::{FakeClock, Phase};
use subflow_engine::Orchestrator;
use subflow_storage::{InMemoryJobStore, JobStore};

use super::*;

fn mock_mode_orchestrator() -> Orchestrator {
    Orchestrator::new(Arc::new(BrokerConnection::new(BrokerConfig::default())))
}

#[tokio::test]
async fn creates_job_and_enqueues_in_mock_mode() {
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let orchestrator = mock_mode_orchestrator();

    let job_id = run(
        &job_store,
        &orchestrator,
        "https://example.test/video.mkv".to_string(),
        "Example Video".to_string(),
        "en".to_string(),
        Some("es".to_string()),
        vec!["abc123:4096".to_string()],
    )
    .await
    .unwrap();

    let job = job_store.get_job(&job_id).await.unwrap().unwrap();
    assert_eq!(job.phase, Phase::Pending);
    assert_eq!(job.source_language, "en");
    assert_eq!(job.target_language.as_deref(), Some("es"));
}

#[tokio::test]
async fn without_target_language_job_has_none() {
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new(FakeClock::new()));
    let orchestrator = mock_mode_orchestrator();

    let job_id = run(
        &job_store,
        &orchestrator,
        "https://example.test/video.mkv".to_string(),
        "Example Video".to_string(),
        "en".to_string(),
        None,
        vec![],
    )
    .await
    .unwrap();

    let job = job_store.get_job(&job_id).await.unwrap().unwrap();
    assert!(job.target_language.is_none());
}
