// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "subflow",
    version = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_GIT_HASH")),
    about = "Operator CLI for the subflow subtitle pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a job and enqueue a subtitle download task.
    EnqueueDownload {
        /// Source video URL.
        video_url: String,
        /// Human-readable title, used in logs and catalog search fallback.
        video_title: String,
        /// Language to search the catalog for (e.g. "en").
        #[arg(long, default_value = "en")]
        source_language: String,
        /// If set and different from the obtained subtitle's language,
        /// the download worker chains a translation task automatically.
        #[arg(long)]
        target_language: Option<String>,
        /// Known "hash:size" hints to prefer during catalog search, can be
        /// repeated.
        #[arg(long = "preferred-source")]
        preferred_sources: Vec<String>,
    },
    /// Enqueue a translation task for an existing job's subtitle file.
    EnqueueTranslation {
        /// Existing job id (as printed by `enqueue-download`).
        job_id: String,
        /// Path to the subtitle file to translate.
        subtitle_file_path: String,
        source_language: String,
        target_language: String,
    },
    /// Report how many messages are waiting on each queue.
    QueueStatus,
}
