// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! The translation worker (§4.10): consumes `subtitle.translation`, runs
//! the checkpointed bounded-parallel translation engine, and writes the
//! translated subtitle file to shared storage.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use subflow_broker::{publish_to_exchange, BrokerConnection, BrokerError};
use subflow_clients::LanguageModelClient;
use subflow_core::{JobId, Phase, SystemClock, TokenCounter};
use subflow_engine::{translate_with_checkpoint, TranslationEngineConfig, TranslationRequest};
use subflow_storage::{CheckpointStore, JobStore};
use subflow_subtitle::{format, parse};
use subflow_wire::{EventType, LifecycleEvent, EVENTS_EXCHANGE};
use tracing::{error, info, warn};

use crate::error::DaemonError;

pub const SOURCE_COMPONENT: &str = "translation_worker";

pub struct TranslationContext {
    pub job_store: Arc<dyn JobStore>,
    pub lm_client: Arc<dyn LanguageModelClient>,
    pub checkpoint_store: Arc<dyn CheckpointStore>,
    pub token_counter: Arc<TokenCounter>,
    pub broker: Arc<BrokerConnection>,
    pub subtitle_storage_path: PathBuf,
    pub engine_config: TranslationEngineConfig,
}

fn output_path(ctx: &TranslationContext, job_id: &JobId, target_language: &str) -> PathBuf {
    ctx.subtitle_storage_path.join(format!("{job_id}.{target_language}.srt"))
}

async fn publish_event(
    ctx: &TranslationContext,
    event_type: EventType,
    job_id: JobId,
    payload: serde_json::Map<String, serde_json::Value>,
) -> Result<(), DaemonError> {
    let channel = ctx.broker.channel().await?;
    let event =
        LifecycleEvent::new(event_type, job_id, SystemClock.epoch_ms(), SOURCE_COMPONENT).with_payload(payload);
    publish_to_exchange(&channel, EVENTS_EXCHANGE, &event.event_type.routing_key(), &event).await?;
    Ok(())
}

async fn process(ctx: &TranslationContext, task: &subflow_wire::TranslationTask) -> Result<(), DaemonError> {
    ctx.job_store
        .update_phase(&task.job_id, Phase::TranslateInProgress, SOURCE_COMPONENT, None)
        .await?;

    let content = tokio::fs::read_to_string(&task.subtitle_file_path).await?;
    let segments = parse(&content);

    let request = TranslationRequest {
        job_id: task.job_id,
        subtitle_file_path: task.subtitle_file_path.clone(),
        source_language: task.source_language.clone(),
        target_language: task.target_language.clone(),
    };

    let started = Instant::now();
    let translated = translate_with_checkpoint(
        segments,
        &request,
        ctx.lm_client.as_ref(),
        ctx.checkpoint_store.as_ref(),
        &ctx.token_counter,
        &ctx.engine_config,
    )
    .await?;
    let duration_ms = started.elapsed().as_millis() as u64;

    let destination = output_path(ctx, &task.job_id, &task.target_language);
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&destination, format(&translated)).await?;
    info!(job_id = %task.job_id, path = %destination.display(), duration_ms, "subtitle translated");

    let mut payload = serde_json::Map::new();
    payload.insert("duration_ms".to_string(), serde_json::json!(duration_ms));
    publish_event(ctx, EventType::SubtitleTranslateCompleted, task.job_id, payload).await?;

    ctx.job_store.update_phase(&task.job_id, Phase::Completed, SOURCE_COMPONENT, None).await?;
    publish_event(ctx, EventType::JobCompleted, task.job_id, serde_json::Map::new()).await?;

    Ok(())
}

async fn fail_job(ctx: &TranslationContext, job_id: JobId, error: &DaemonError) {
    error!(job_id = %job_id, %error, "translation task failed permanently");
    let message = error.to_string();
    if let Err(store_error) =
        ctx.job_store.update_phase(&job_id, Phase::Failed, SOURCE_COMPONENT, Some(message)).await
    {
        warn!(job_id = %job_id, error = %store_error, "failed to record job failure");
    }
    if let Err(publish_error) =
        publish_event(ctx, EventType::SubtitleTranslateFailed, job_id, serde_json::Map::new()).await
    {
        warn!(job_id = %job_id, error = %publish_error, "failed to publish translate-failed event");
    }
    if let Err(publish_error) = publish_event(ctx, EventType::JobFailed, job_id, serde_json::Map::new()).await {
        warn!(job_id = %job_id, error = %publish_error, "failed to publish job-failed event");
    }
}

pub async fn handle_message(payload: Vec<u8>, ctx: Arc<TranslationContext>) -> Result<(), BrokerError> {
    let task: subflow_wire::TranslationTask = match serde_json::from_slice(&payload) {
        Ok(task) => task,
        Err(error) => {
            error!(%error, "malformed translation task payload, dropping");
            return Ok(());
        }
    };

    let span = tracing::info_span!("translation_task", job_id = %task.job_id);
    let _entered = span.enter();

    if let Err(error) = process(&ctx, &task).await {
        use subflow_core::Classify;
        if error.class().is_retryable() {
            warn!(job_id = %task.job_id, %error, "transient translation failure, will redeliver");
            return Err(BrokerError::Connection(error.to_string()));
        }
        fail_job(&ctx, task.job_id, &error).await;
    }

    Ok(())
}

#[cfg(test)]
#[path = "translation_tests.rs"]
mod tests;
