// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Duplicate-job prevention: a `dedup:{fingerprint}` key with a bounded
//! window, set atomically so two concurrent enqueue calls for the same
//! `(video_url, source_lang, target_lang)` never both win.

use async_trait::async_trait;
use subflow_core::JobId;
use tracing::warn;

/// Default dedup window: 1 hour.
pub const DEFAULT_DEDUP_WINDOW_SECS: u64 = 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub existing_job_id: Option<JobId>,
}

#[async_trait]
pub trait DedupService: Send + Sync {
    /// Atomically register `fingerprint -> job_id` if absent. If the store
    /// is unreachable, MUST degrade to "not a duplicate" rather than block
    /// the caller — a missed dedup is far cheaper than a stalled pipeline.
    async fn check_and_register(&self, fingerprint: &str, job_id: &JobId) -> DuplicateCheck;
}

pub fn fingerprint(video_url: &str, source_language: &str, target_language: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    video_url.hash(&mut hasher);
    source_language.hash(&mut hasher);
    target_language.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

pub struct RedisDedupService {
    conn: redis::aio::ConnectionManager,
    window_secs: u64,
}

impl RedisDedupService {
    pub fn new(conn: redis::aio::ConnectionManager) -> Self {
        Self { conn, window_secs: DEFAULT_DEDUP_WINDOW_SECS }
    }

    pub fn with_window(conn: redis::aio::ConnectionManager, window_secs: u64) -> Self {
        Self { conn, window_secs }
    }
}

#[async_trait]
impl DedupService for RedisDedupService {
    async fn check_and_register(&self, fingerprint: &str, job_id: &JobId) -> DuplicateCheck {
        use redis::AsyncCommands;

        let mut conn = self.conn.clone();
        let key = format!("dedup:{fingerprint}");

        let options = redis::SetOptions::default()
            .conditional_set(redis::ExistenceCheck::NX)
            .with_expiration(redis::SetExpiry::EX(self.window_secs));

        match conn.set_options::<_, _, Option<String>>(&key, job_id.to_string(), options).await {
            Ok(Some(_)) => DuplicateCheck { is_duplicate: false, existing_job_id: None },
            Ok(None) => {
                let existing: Option<String> = conn.get(&key).await.unwrap_or(None);
                DuplicateCheck {
                    is_duplicate: true,
                    existing_job_id: existing.map(JobId::from_string),
                }
            }
            Err(err) => {
                warn!(error = %err, "dedup store unreachable, treating as not duplicate");
                DuplicateCheck { is_duplicate: false, existing_job_id: None }
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod memory {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// In-memory dedup service with no expiry, for tests. Expiry is a
    /// storage-layer concern the test harness has no need to simulate.
    #[derive(Default)]
    pub struct InMemoryDedupService {
        seen: Mutex<HashMap<String, JobId>>,
    }

    impl InMemoryDedupService {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl DedupService for InMemoryDedupService {
        async fn check_and_register(&self, fingerprint: &str, job_id: &JobId) -> DuplicateCheck {
            let mut seen = self.seen.lock();
            match seen.get(fingerprint) {
                Some(existing) => DuplicateCheck { is_duplicate: true, existing_job_id: Some(*existing) },
                None => {
                    seen.insert(fingerprint.to_string(), *job_id);
                    DuplicateCheck { is_duplicate: false, existing_job_id: None }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "dedup_tests.rs"]
mod tests;
