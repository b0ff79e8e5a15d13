// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use std::sync::Arc;

use subflow_core::{Job, JobId, SystemClock};
use subflow_engine::Orchestrator;
use subflow_storage::JobStore;
use subflow_wire::DownloadTask;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    job_store: &Arc<dyn JobStore>,
    orchestrator: &Orchestrator,
    video_url: String,
    video_title: String,
    source_language: String,
    target_language: Option<String>,
    preferred_sources: Vec<String>,
) -> anyhow::Result<JobId> {
    let job = Job::new(&SystemClock, video_url.clone(), video_title.clone(), source_language.clone(), target_language);
    let job_id = job.id;
    job_store.save_job(job).await?;

    let task = DownloadTask {
        job_id,
        video_url,
        video_title,
        language: source_language,
        preferred_sources,
    };

    orchestrator.enqueue_download_with_translation(task, SystemClock.epoch_ms()).await?;

    Ok(job_id)
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
