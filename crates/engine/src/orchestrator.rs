// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Enqueues work onto the broker and publishes the lifecycle events that
//! accompany it. Never mutates job phase directly — phase transitions are
//! produced by whatever consumes the lifecycle events this emits, keeping
//! persistence event-driven.

use std::sync::Arc;

use subflow_broker::{publish_to_exchange, publish_to_queue, queue_message_count, BrokerConnection};
use subflow_wire::{DownloadTask, EventType, LifecycleEvent, TranslationTask, DOWNLOAD_QUEUE, EVENTS_EXCHANGE, TRANSLATION_QUEUE};
use tracing::{info, warn};

use crate::error::EngineError;

pub const SOURCE_COMPONENT: &str = "orchestrator";

/// Worker liveness counts, always reported as `0` placeholders until a
/// worker-registry feature exists to populate them for real.
#[derive(Debug, Clone, Default)]
pub struct ActiveWorkers {
    pub downloader: u32,
    pub translator: u32,
}

#[derive(Debug, Clone, Default)]
pub struct QueueStatus {
    pub download_queue_size: u32,
    pub translation_queue_size: u32,
    pub active_workers: ActiveWorkers,
}

pub struct Orchestrator {
    broker: Arc<BrokerConnection>,
}

impl Orchestrator {
    pub fn new(broker: Arc<BrokerConnection>) -> Self {
        Self { broker }
    }

    /// Enqueues a download task. Degrades to a documented mock mode (logs
    /// the task instead of publishing) when the broker is unreachable, so
    /// callers remain uncoupled from broker availability during startup.
    pub async fn enqueue_download_task(
        &self,
        task: DownloadTask,
        timestamp_epoch_ms: u64,
    ) -> Result<(), EngineError> {
        if !self.broker.ensure_connected().await {
            warn!(job_id = %task.job_id, ?task, "mock mode: would enqueue download task");
            return Ok(());
        }

        let channel = self.broker.channel().await?;
        publish_to_queue(&channel, DOWNLOAD_QUEUE, &task).await?;

        let event = LifecycleEvent::new(
            EventType::SubtitleDownloadRequested,
            task.job_id,
            timestamp_epoch_ms,
            SOURCE_COMPONENT,
        );
        publish_to_exchange(&channel, EVENTS_EXCHANGE, &event.event_type.routing_key(), &event).await?;

        info!(job_id = %task.job_id, "download task enqueued");
        Ok(())
    }

    /// Enqueues a translation task. Used for direct translation requests;
    /// the download worker enqueues translation tasks itself when chaining
    /// (§4.9), bypassing this method.
    pub async fn enqueue_translation_task(&self, task: TranslationTask) -> Result<(), EngineError> {
        if !self.broker.ensure_connected().await {
            warn!(job_id = %task.job_id, ?task, "mock mode: would enqueue translation task");
            return Ok(());
        }

        let channel = self.broker.channel().await?;
        publish_to_queue(&channel, TRANSLATION_QUEUE, &task).await?;
        info!(job_id = %task.job_id, "translation task enqueued");
        Ok(())
    }

    /// Enqueues a download task, relying on the download worker to chain
    /// translation automatically when the job carries a target language.
    pub async fn enqueue_download_with_translation(
        &self,
        task: DownloadTask,
        timestamp_epoch_ms: u64,
    ) -> Result<(), EngineError> {
        self.enqueue_download_task(task, timestamp_epoch_ms).await
    }

    pub async fn get_queue_status(&self) -> QueueStatus {
        if !self.broker.ensure_connected().await {
            warn!("mock mode: returning zeroed queue status");
            return QueueStatus::default();
        }

        let channel = match self.broker.channel().await {
            Ok(channel) => channel,
            Err(error) => {
                warn!(%error, "failed to get queue status");
                return QueueStatus::default();
            }
        };

        let download = queue_message_count(&channel, DOWNLOAD_QUEUE).await;
        let translation = queue_message_count(&channel, TRANSLATION_QUEUE).await;

        match (download, translation) {
            (Ok(download_queue_size), Ok(translation_queue_size)) => {
                QueueStatus { download_queue_size, translation_queue_size, active_workers: ActiveWorkers::default() }
            }
            _ => {
                warn!("failed to get queue status");
                QueueStatus::default()
            }
        }
    }

    pub fn broker(&self) -> &Arc<BrokerConnection> {
        &self.broker
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
