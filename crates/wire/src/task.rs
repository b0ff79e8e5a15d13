// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Work-queue message bodies. Each is published once, consumed exactly
//! once, and acknowledged by the consuming worker.

use serde::{Deserialize, Serialize};
use subflow_core::JobId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    pub job_id: JobId,
    pub video_url: String,
    pub video_title: String,
    pub language: String,
    #[serde(default)]
    pub preferred_sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationTask {
    pub job_id: JobId,
    pub subtitle_file_path: String,
    pub source_language: String,
    pub target_language: String,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
