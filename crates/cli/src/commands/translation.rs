// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use std::sync::Arc;

use subflow_core::JobId;
use subflow_engine::Orchestrator;
use subflow_storage::JobStore;
use subflow_wire::TranslationTask;

pub async fn run(
    job_store: &Arc<dyn JobStore>,
    orchestrator: &Orchestrator,
    job_id: String,
    subtitle_file_path: String,
    source_language: String,
    target_language: String,
) -> anyhow::Result<()> {
    let job_id = JobId::from_string(&job_id);
    if job_store.get_job(&job_id).await?.is_none() {
        anyhow::bail!("no such job: {job_id}");
    }

    let task = TranslationTask { job_id, subtitle_file_path, source_language, target_language };
    orchestrator.enqueue_translation_task(task).await?;

    println!("translation task enqueued for job {job_id}");
    Ok(())
}

#[cfg(test)]
#[path = "translation_tests.rs"]
mod tests;
