// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! subflow-storage: job store, duplicate-job prevention, and checkpoint
//! store, all backed by a key/value service. Each is a trait plus a
//! single Redis production implementation, with an in-memory counterpart
//! behind `test-support` for tests and the orchestrator's mock mode.

pub mod checkpoint;
pub mod dedup;
pub mod error;
pub mod job_store;
pub mod redis_job_store;

pub use checkpoint::{Checkpoint, CheckpointFingerprint, CheckpointStore, RedisCheckpointStore};
pub use dedup::{fingerprint, DedupService, DuplicateCheck, RedisDedupService, DEFAULT_DEDUP_WINDOW_SECS};
pub use error::StorageError;
pub use job_store::{JobStore, FAILED_JOB_TTL_SECS, TERMINAL_JOB_TTL_SECS};
pub use redis_job_store::RedisJobStore;

#[cfg(any(test, feature = "test-support"))]
pub use checkpoint::memory::InMemoryCheckpointStore;
#[cfg(any(test, feature = "test-support"))]
pub use dedup::memory::InMemoryDedupService;
#[cfg(any(test, feature = "test-support"))]
pub use job_store::memory::InMemoryJobStore;
