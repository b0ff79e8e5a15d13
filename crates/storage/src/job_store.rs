// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! The job store: a thin abstraction over a key/value backend supporting
//! GET, SET, and atomic check-and-set, decoupling the rest of the
//! workspace from the concrete store.

use async_trait::async_trait;
use subflow_core::{Job, JobId, Phase};

use crate::error::StorageError;

/// How long a job record is retained once `update_phase` lands it in
/// `Completed`.
pub const TERMINAL_JOB_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// How long a job record is retained once `update_phase` lands it in
/// `Failed`. Shorter than [`TERMINAL_JOB_TTL_SECS`] — failed jobs are
/// diagnosed and retried (or abandoned) sooner than successes are queried.
pub const FAILED_JOB_TTL_SECS: u64 = 3 * 24 * 60 * 60;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a new record. Fails if `job.id` already exists.
    async fn save_job(&self, job: Job) -> Result<(), StorageError>;

    async fn get_job(&self, job_id: &JobId) -> Result<Option<Job>, StorageError>;

    /// Single-writer phase transition. Appends to the job's audit log and,
    /// when `new_phase` is terminal, applies a TTL: [`TERMINAL_JOB_TTL_SECS`]
    /// for `Completed`, [`FAILED_JOB_TTL_SECS`] for `Failed`.
    async fn update_phase(
        &self,
        job_id: &JobId,
        new_phase: Phase,
        source: &str,
        error_message: Option<String>,
    ) -> Result<Job, StorageError>;

    /// Idempotent connectivity probe used by every consumer loop's
    /// health-check tick.
    async fn ensure_connected(&self) -> bool;
}

#[cfg(any(test, feature = "test-support"))]
pub mod memory {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use subflow_core::Clock;

    /// In-memory `JobStore` for tests and for the orchestrator's mock mode.
    pub struct InMemoryJobStore<C: Clock> {
        clock: C,
        jobs: Mutex<HashMap<String, Job>>,
    }

    impl<C: Clock> InMemoryJobStore<C> {
        pub fn new(clock: C) -> Self {
            Self { clock, jobs: Mutex::new(HashMap::new()) }
        }
    }

    #[async_trait]
    impl<C: Clock> JobStore for InMemoryJobStore<C> {
        async fn save_job(&self, job: Job) -> Result<(), StorageError> {
            let mut jobs = self.jobs.lock();
            let key = job.id.to_string();
            if jobs.contains_key(&key) {
                return Err(StorageError::AlreadyExists(key));
            }
            jobs.insert(key, job);
            Ok(())
        }

        async fn get_job(&self, job_id: &JobId) -> Result<Option<Job>, StorageError> {
            Ok(self.jobs.lock().get(job_id.as_str()).cloned())
        }

        async fn update_phase(
            &self,
            job_id: &JobId,
            new_phase: Phase,
            source: &str,
            error_message: Option<String>,
        ) -> Result<Job, StorageError> {
            let mut jobs = self.jobs.lock();
            let job = jobs
                .get_mut(job_id.as_str())
                .ok_or_else(|| StorageError::NotFound(job_id.to_string()))?;
            if !job.phase.can_advance_to(new_phase) {
                return Err(StorageError::InvalidTransition {
                    job_id: job_id.to_string(),
                    from: job.phase.to_string(),
                    to: new_phase.to_string(),
                });
            }
            job.apply_phase_transition(&self.clock, new_phase, source, error_message);
            Ok(job.clone())
        }

        async fn ensure_connected(&self) -> bool {
            true
        }
    }
}

#[cfg(test)]
#[path = "job_store_tests.rs"]
mod tests;
