// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! The download worker (§4.9): consumes `subtitle.download`, resolves a
//! catalog candidate, downloads it to shared storage, and either
//! completes the job or chains a translation task.

use std::path::PathBuf;
use std::sync::Arc;

use subflow_broker::{publish_to_exchange, publish_to_queue, BrokerConnection, BrokerError};
use subflow_clients::{select_best_candidate, CatalogClient};
use subflow_core::{Job, JobId, Phase, SystemClock};
use subflow_storage::JobStore;
use subflow_wire::{
    DownloadTask, EventType, LifecycleEvent, TranslationTask, EVENTS_EXCHANGE, TRANSLATION_QUEUE,
};
use tracing::{error, info, warn};

use crate::error::DaemonError;

pub const SOURCE_COMPONENT: &str = "download_worker";

pub struct DownloadContext {
    pub job_store: Arc<dyn JobStore>,
    pub catalog_client: Arc<dyn CatalogClient>,
    pub broker: Arc<BrokerConnection>,
    pub subtitle_storage_path: PathBuf,
}

fn output_path(ctx: &DownloadContext, job_id: &JobId, language: &str) -> PathBuf {
    ctx.subtitle_storage_path.join(format!("{job_id}.{language}.srt"))
}

/// Parses a `preferred_sources` entry shaped `hash:size` into its parts, for
/// the hash+size catalog lookup the task requests when one is known ahead
/// of time (e.g. a filesystem watcher computed it from the media file).
fn parse_hash_source(source: &str) -> Option<(&str, u64)> {
    let (hash, size) = source.split_once(':')?;
    let size = size.parse().ok()?;
    Some((hash, size))
}

async fn resolve_candidates(
    ctx: &DownloadContext,
    task: &DownloadTask,
) -> Result<Vec<subflow_clients::SubtitleCandidate>, DaemonError> {
    for source in &task.preferred_sources {
        if let Some((hash, size)) = parse_hash_source(source) {
            let candidates = ctx
                .catalog_client
                .search_by_hash(hash, size, std::slice::from_ref(&task.language))
                .await?;
            if !candidates.is_empty() {
                return Ok(candidates);
            }
        }
    }
    Ok(ctx
        .catalog_client
        .search(None, Some(&task.video_title), std::slice::from_ref(&task.language))
        .await?)
}

async fn publish_event(ctx: &DownloadContext, event_type: EventType, job_id: JobId) -> Result<(), DaemonError> {
    let channel = ctx.broker.channel().await?;
    let event = LifecycleEvent::new(event_type, job_id, SystemClock.epoch_ms(), SOURCE_COMPONENT);
    publish_to_exchange(&channel, EVENTS_EXCHANGE, &event.event_type.routing_key(), &event).await?;
    Ok(())
}

async fn process(ctx: &DownloadContext, task: &DownloadTask) -> Result<(), DaemonError> {
    let job: Job = ctx
        .job_store
        .update_phase(&task.job_id, Phase::DownloadInProgress, SOURCE_COMPONENT, None)
        .await?;

    let candidates = resolve_candidates(ctx, task).await?;
    let best = select_best_candidate(&candidates, &task.language)
        .ok_or_else(|| DaemonError::NoCandidates(task.language.clone()))?;

    let destination = output_path(ctx, &task.job_id, &task.language);
    ctx.catalog_client.download(&best.id, Some(destination.clone())).await?;
    info!(job_id = %task.job_id, path = %destination.display(), "subtitle downloaded");

    publish_event(ctx, EventType::SubtitleDownloadCompleted, task.job_id).await?;

    if job.wants_translation() {
        let target_language = job.target_language.clone().unwrap_or_default();
        let translation_task = TranslationTask {
            job_id: task.job_id,
            subtitle_file_path: destination.to_string_lossy().into_owned(),
            source_language: task.language.clone(),
            target_language,
        };
        let channel = ctx.broker.channel().await?;
        publish_to_queue(&channel, TRANSLATION_QUEUE, &translation_task).await?;
        publish_event(ctx, EventType::SubtitleTranslateRequested, task.job_id).await?;
    } else {
        ctx.job_store
            .update_phase(&task.job_id, Phase::Completed, SOURCE_COMPONENT, None)
            .await?;
        publish_event(ctx, EventType::JobCompleted, task.job_id).await?;
    }

    Ok(())
}

async fn fail_job(ctx: &DownloadContext, job_id: JobId, error: &DaemonError) {
    error!(job_id = %job_id, %error, "download task failed permanently");
    let message = error.to_string();
    if let Err(store_error) =
        ctx.job_store.update_phase(&job_id, Phase::Failed, SOURCE_COMPONENT, Some(message)).await
    {
        warn!(job_id = %job_id, error = %store_error, "failed to record job failure");
    }
    if let Err(publish_error) = publish_event(ctx, EventType::SubtitleDownloadFailed, job_id).await {
        warn!(job_id = %job_id, error = %publish_error, "failed to publish download-failed event");
    }
    if let Err(publish_error) = publish_event(ctx, EventType::JobFailed, job_id).await {
        warn!(job_id = %job_id, error = %publish_error, "failed to publish job-failed event");
    }
}

/// The `run_consumer` handler: deserializes the task, processes it, and
/// decides whether a failure means "redeliver" (transient — propagated as
/// `Err`) or "fail the job" (permanent — handled here, message acked).
pub async fn handle_message(payload: Vec<u8>, ctx: Arc<DownloadContext>) -> Result<(), BrokerError> {
    let task: DownloadTask = match serde_json::from_slice(&payload) {
        Ok(task) => task,
        Err(error) => {
            error!(%error, "malformed download task payload, dropping");
            return Ok(());
        }
    };

    let span = tracing::info_span!("download_task", job_id = %task.job_id);
    let _entered = span.enter();

    if let Err(error) = process(&ctx, &task).await {
        use subflow_core::Classify;
        if error.class().is_retryable() {
            warn!(job_id = %task.job_id, %error, "transient download failure, will redeliver");
            return Err(BrokerError::Connection(error.to_string()));
        }
        fail_job(&ctx, task.job_id, &error).await;
    }

    Ok(())
}

#[cfg(test)]
#[path = "download_tests.rs"]
mod tests;
