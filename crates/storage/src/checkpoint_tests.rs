// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::memory::InMemoryCheckpointStore;
use super::*;
use subflow_core::JobId;
use subflow_subtitle::SubtitleSegment;

fn fp() -> CheckpointFingerprint {
    CheckpointFingerprint {
        subtitle_file_path: "/data/job.en.srt".into(),
        source_language: "en".into(),
        target_language: "es".into(),
    }
}

fn seg(index: u32) -> SubtitleSegment {
    SubtitleSegment {
        index,
        start_time: "00:00:01,000".into(),
        end_time: "00:00:02,000".into(),
        text: "hola".into(),
    }
}

#[test]
fn matches_requires_identical_fingerprint() {
    let checkpoint = Checkpoint::new(JobId::new(), fp(), 4);
    assert!(checkpoint.matches(&fp()));

    let mut other = fp();
    other.subtitle_file_path = "/data/other.en.srt".into();
    assert!(!checkpoint.matches(&other));
}

#[test]
fn record_batch_accumulates_completed_chunks_and_segments() {
    let mut checkpoint = Checkpoint::new(JobId::new(), fp(), 3);
    checkpoint.record_batch(&[0], vec![seg(1), seg(2)]);
    checkpoint.record_batch(&[1], vec![seg(3), seg(4)]);

    assert_eq!(checkpoint.completed_chunks.len(), 2);
    assert_eq!(checkpoint.translated_segments.len(), 4);
    assert!(!checkpoint.is_complete());

    checkpoint.record_batch(&[2], vec![seg(5)]);
    assert!(checkpoint.is_complete());
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let store = InMemoryCheckpointStore::new();
    let job_id = JobId::new();
    let mut checkpoint = Checkpoint::new(job_id, fp(), 2);
    checkpoint.record_batch(&[0], vec![seg(1)]);

    store.save(&checkpoint, "es").await;
    let loaded = store.load(&job_id, "es").await.unwrap();
    assert_eq!(loaded.completed_chunks, checkpoint.completed_chunks);
    assert_eq!(loaded.translated_segments.len(), 1);
}

#[tokio::test]
async fn load_missing_checkpoint_is_none() {
    let store = InMemoryCheckpointStore::new();
    assert!(store.load(&JobId::new(), "es").await.is_none());
}

#[tokio::test]
async fn delete_removes_checkpoint() {
    let store = InMemoryCheckpointStore::new();
    let job_id = JobId::new();
    let checkpoint = Checkpoint::new(job_id, fp(), 1);
    store.save(&checkpoint, "es").await;
    store.delete(&job_id, "es").await;
    assert!(store.load(&job_id, "es").await.is_none());
}
