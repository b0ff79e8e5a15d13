// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Crash-safe resumption state for an in-flight translation, persisted
//! under `checkpoint:{job_id}:{target_language}` and deleted on
//! terminal-success. Written after each parallel batch completes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use subflow_core::JobId;
use subflow_subtitle::SubtitleSegment;
use tracing::warn;

/// Identifies the exact task a checkpoint was produced for. A checkpoint
/// whose fingerprint doesn't match the current task's is stale — the
/// source file changed underneath it — and must be discarded rather than
/// resumed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointFingerprint {
    pub subtitle_file_path: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub job_id: JobId,
    pub fingerprint: CheckpointFingerprint,
    pub total_chunks: usize,
    pub completed_chunks: BTreeSet<usize>,
    pub translated_segments: Vec<SubtitleSegment>,
}

impl Checkpoint {
    pub fn new(job_id: JobId, fingerprint: CheckpointFingerprint, total_chunks: usize) -> Self {
        Self {
            job_id,
            fingerprint,
            total_chunks,
            completed_chunks: BTreeSet::new(),
            translated_segments: Vec::new(),
        }
    }

    /// Whether this checkpoint may be resumed against `fingerprint` — the
    /// invariant from §3: checkpoint metadata must match the current
    /// task's `(file path, source lang, target lang)` or it is discarded.
    pub fn matches(&self, fingerprint: &CheckpointFingerprint) -> bool {
        &self.fingerprint == fingerprint
    }

    pub fn record_batch(&mut self, chunk_indices: &[usize], mut segments: Vec<SubtitleSegment>) {
        self.completed_chunks.extend(chunk_indices.iter().copied());
        self.translated_segments.append(&mut segments);
    }

    pub fn is_complete(&self) -> bool {
        self.completed_chunks.len() == self.total_chunks
    }
}

fn checkpoint_key(job_id: &JobId, target_language: &str) -> String {
    format!("checkpoint:{job_id}:{target_language}")
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, job_id: &JobId, target_language: &str) -> Option<Checkpoint>;
    async fn save(&self, checkpoint: &Checkpoint, target_language: &str);
    async fn delete(&self, job_id: &JobId, target_language: &str);
}

pub struct RedisCheckpointStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisCheckpointStore {
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CheckpointStore for RedisCheckpointStore {
    async fn load(&self, job_id: &JobId, target_language: &str) -> Option<Checkpoint> {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(checkpoint_key(job_id, target_language)).await.ok()?;
        match raw {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(checkpoint) => Some(checkpoint),
                Err(err) => {
                    warn!(error = %err, "corrupt checkpoint, discarding");
                    None
                }
            },
            None => None,
        }
    }

    async fn save(&self, checkpoint: &Checkpoint, target_language: &str) {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        let key = checkpoint_key(&checkpoint.job_id, target_language);
        // Checkpoint-save failures are best-effort: log and continue,
        // never fail the translation over a storage hiccup.
        match serde_json::to_string(checkpoint) {
            Ok(body) => {
                if let Err(err) = conn.set::<_, _, ()>(&key, body).await {
                    warn!(error = %err, %key, "failed to persist checkpoint");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize checkpoint"),
        }
    }

    async fn delete(&self, job_id: &JobId, target_language: &str) {
        use redis::AsyncCommands;
        let mut conn = self.conn.clone();
        let _: Result<i64, _> = conn.del(checkpoint_key(job_id, target_language)).await;
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod memory {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct InMemoryCheckpointStore {
        checkpoints: Mutex<HashMap<String, Checkpoint>>,
    }

    impl InMemoryCheckpointStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl CheckpointStore for InMemoryCheckpointStore {
        async fn load(&self, job_id: &JobId, target_language: &str) -> Option<Checkpoint> {
            self.checkpoints.lock().get(&checkpoint_key(job_id, target_language)).cloned()
        }

        async fn save(&self, checkpoint: &Checkpoint, target_language: &str) {
            self.checkpoints
                .lock()
                .insert(checkpoint_key(&checkpoint.job_id, target_language), checkpoint.clone());
        }

        async fn delete(&self, job_id: &JobId, target_language: &str) {
            self.checkpoints.lock().remove(&checkpoint_key(job_id, target_language));
        }
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
