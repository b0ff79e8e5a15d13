// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Redis-backed [`JobStore`]. One record per job at `job:{job_id}`, the
//! whole `Job` serialized as JSON so `get_job` round-trips byte-for-byte.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use subflow_core::{Clock, Job, JobId, Phase};
use tracing::warn;

use crate::error::StorageError;
use crate::job_store::{JobStore, FAILED_JOB_TTL_SECS, TERMINAL_JOB_TTL_SECS};

fn job_key(job_id: &JobId) -> String {
    format!("job:{job_id}")
}

pub struct RedisJobStore<C: Clock> {
    clock: C,
    conn: ConnectionManager,
}

impl<C: Clock> RedisJobStore<C> {
    pub async fn connect(redis_url: &str, clock: C) -> Result<Self, StorageError> {
        let client = redis::Client::open(redis_url).map_err(StorageError::Redis)?;
        let conn = client.get_connection_manager().await.map_err(StorageError::Redis)?;
        Ok(Self { clock, conn })
    }

    pub fn from_connection_manager(conn: ConnectionManager, clock: C) -> Self {
        Self { clock, conn }
    }
}

#[async_trait]
impl<C: Clock> JobStore for RedisJobStore<C> {
    async fn save_job(&self, job: Job) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let key = job_key(&job.id);
        let body = serde_json::to_string(&job)?;
        // NX: fail rather than clobber if the job already exists.
        let created: bool = conn.set_nx(&key, body).await.map_err(StorageError::Redis)?;
        if !created {
            return Err(StorageError::AlreadyExists(job.id.to_string()));
        }
        Ok(())
    }

    async fn get_job(&self, job_id: &JobId) -> Result<Option<Job>, StorageError> {
        let mut conn = self.conn.clone();
        let body: Option<String> = conn.get(job_key(job_id)).await.map_err(StorageError::Redis)?;
        match body {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn update_phase(
        &self,
        job_id: &JobId,
        new_phase: Phase,
        source: &str,
        error_message: Option<String>,
    ) -> Result<Job, StorageError> {
        let mut conn = self.conn.clone();
        let key = job_key(job_id);
        let raw: Option<String> = conn.get(&key).await.map_err(StorageError::Redis)?;
        let mut job: Job = match raw {
            Some(raw) => serde_json::from_str(&raw)?,
            None => return Err(StorageError::NotFound(job_id.to_string())),
        };

        if !job.phase.can_advance_to(new_phase) {
            return Err(StorageError::InvalidTransition {
                job_id: job_id.to_string(),
                from: job.phase.to_string(),
                to: new_phase.to_string(),
            });
        }

        job.apply_phase_transition(&self.clock, new_phase, source, error_message);
        let body = serde_json::to_string(&job)?;

        match new_phase {
            Phase::Completed => {
                let _: () = conn
                    .set_ex(&key, body, TERMINAL_JOB_TTL_SECS)
                    .await
                    .map_err(StorageError::Redis)?;
            }
            Phase::Failed => {
                let _: () =
                    conn.set_ex(&key, body, FAILED_JOB_TTL_SECS).await.map_err(StorageError::Redis)?;
            }
            _ => {
                let _: () = conn.set(&key, body).await.map_err(StorageError::Redis)?;
            }
        }

        Ok(job)
    }

    async fn ensure_connected(&self) -> bool {
        let mut conn = self.conn.clone();
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "redis ping failed");
                false
            }
        }
    }
}
