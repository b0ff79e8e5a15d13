// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Lifecycle events published to the topic exchange. Routing key equals
//! the event's wire string, produced by [`EventType::as_str`].

use serde::{Deserialize, Serialize};
use subflow_core::JobId;

/// Closed set of lifecycle event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    MediaFileDetected,
    SubtitleRequested,
    SubtitleDownloadRequested,
    SubtitleDownloadCompleted,
    SubtitleDownloadFailed,
    SubtitleTranslateRequested,
    SubtitleTranslateCompleted,
    SubtitleTranslateFailed,
    JobCompleted,
    JobFailed,
}

subflow_core::simple_display! {
    EventType {
        MediaFileDetected => "media.file.detected",
        SubtitleRequested => "subtitle.requested",
        SubtitleDownloadRequested => "subtitle.download.requested",
        SubtitleDownloadCompleted => "subtitle.download.completed",
        SubtitleDownloadFailed => "subtitle.download.failed",
        SubtitleTranslateRequested => "subtitle.translate.requested",
        SubtitleTranslateCompleted => "subtitle.translate.completed",
        SubtitleTranslateFailed => "subtitle.translate.failed",
        JobCompleted => "job.completed",
        JobFailed => "job.failed",
    }
}

impl EventType {
    /// The routing key this event type is published under. Identical to
    /// its `Display` form; named separately because at call sites
    /// "routing key" is the semantically relevant concept.
    pub fn routing_key(self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub event_type: EventType,
    pub job_id: JobId,
    pub timestamp_epoch_ms: u64,
    pub source_component: String,
    #[serde(default)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl LifecycleEvent {
    pub fn new(event_type: EventType, job_id: JobId, timestamp_epoch_ms: u64, source_component: impl Into<String>) -> Self {
        Self {
            event_type,
            job_id,
            timestamp_epoch_ms,
            source_component: source_component.into(),
            payload: serde_json::Map::new(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Map<String, serde_json::Value>) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
