// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! The job record and its phase state machine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::clock::Clock;

crate::define_id! {
    /// Opaque identifier for a subtitle acquisition (and optional translation) job.
    pub struct JobId("job-");
}

/// The job's lifecycle state. See the module-level state diagram in the
/// design document: `PENDING -> DOWNLOAD_IN_PROGRESS -> (TRANSLATE_IN_PROGRESS)? -> COMPLETED`,
/// with `FAILED` reachable from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pending,
    DownloadInProgress,
    TranslateInProgress,
    Completed,
    Failed,
}

crate::simple_display! {
    Phase {
        Pending => "pending",
        DownloadInProgress => "download_in_progress",
        TranslateInProgress => "translate_in_progress",
        Completed => "completed",
        Failed => "failed",
    }
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed)
    }

    /// Whether moving from `self` to `next` is legal along the success
    /// path or as a `FAILED` escape hatch. Does not enforce *who* may call
    /// it — that is the job store's single-writer responsibility.
    pub fn can_advance_to(self, next: Phase) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Phase::Failed {
            return true;
        }
        matches!(
            (self, next),
            (Phase::Pending, Phase::DownloadInProgress)
                | (Phase::DownloadInProgress, Phase::TranslateInProgress)
                | (Phase::DownloadInProgress, Phase::Completed)
                | (Phase::TranslateInProgress, Phase::Completed)
        )
    }
}

/// One audit-log entry appended by `update_phase`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub phase: Phase,
    pub source: String,
    pub at_epoch_ms: u64,
}

/// A persisted job record, as stored verbatim at `job:{job_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub video_url: String,
    pub video_title: String,
    pub source_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    pub phase: Phase,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub phase_history: Vec<PhaseTransition>,
}

impl Job {
    pub fn new(
        clock: &impl Clock,
        video_url: impl Into<String>,
        video_title: impl Into<String>,
        source_language: impl Into<String>,
        target_language: Option<String>,
    ) -> Self {
        let now = clock.epoch_ms();
        Self {
            id: JobId::new(),
            video_url: video_url.into(),
            video_title: video_title.into(),
            source_language: source_language.into(),
            target_language,
            phase: Phase::Pending,
            created_at_epoch_ms: now,
            updated_at_epoch_ms: now,
            metadata: HashMap::new(),
            error_message: None,
            phase_history: Vec::new(),
        }
    }

    pub fn wants_translation(&self) -> bool {
        match &self.target_language {
            Some(target) => target != &self.source_language,
            None => false,
        }
    }

    /// Applies a phase transition in-process. Callers embedding this in a
    /// store implementation are responsible for persisting the result and
    /// for rejecting transitions where [`Phase::can_advance_to`] is false
    /// before calling this.
    pub fn apply_phase_transition(
        &mut self,
        clock: &impl Clock,
        new_phase: Phase,
        source: impl Into<String>,
        error_message: Option<String>,
    ) {
        let now = clock.epoch_ms();
        self.phase = new_phase;
        self.updated_at_epoch_ms = now;
        if new_phase == Phase::Failed {
            self.error_message = error_message;
        }
        self.phase_history.push(PhaseTransition { phase: new_phase, source: source.into(), at_epoch_ms: now });
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobBuilder => Job {
        into {
            video_url: String = "https://example.test/video.mkv",
            video_title: String = "Example Video",
            source_language: String = "en",
        }
        option {
            target_language: String = None,
        }
        computed {
            id: JobId = JobId::new(),
            phase: Phase = Phase::Pending,
            created_at_epoch_ms: u64 = 1_000_000,
            updated_at_epoch_ms: u64 = 1_000_000,
            metadata: HashMap<String, serde_json::Value> = HashMap::new(),
            error_message: Option<String> = None,
            phase_history: Vec<PhaseTransition> = Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
