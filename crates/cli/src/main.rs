// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! `subflow`: operator CLI. A thin client over the same
//! [`subflow_engine::Orchestrator`] and job store the worker binaries use —
//! enqueues work by talking directly to the broker and key/value store,
//! rather than through a running daemon process.

mod cli;
mod commands;
mod context;

use clap::Parser;

use cli::{Cli, Command};
use context::Context;

#[tokio::main]
async fn main() {
    let directive = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::connect().await?;

    match cli.command {
        Command::EnqueueDownload { video_url, video_title, source_language, target_language, preferred_sources } => {
            let job_id = commands::download::run(
                &ctx.job_store,
                &ctx.orchestrator,
                video_url,
                video_title,
                source_language,
                target_language,
                preferred_sources,
            )
            .await?;
            println!("job {job_id} created, download task enqueued");
            Ok(())
        }
        Command::EnqueueTranslation { job_id, subtitle_file_path, source_language, target_language } => {
            commands::translation::run(
                &ctx.job_store,
                &ctx.orchestrator,
                job_id,
                subtitle_file_path,
                source_language,
                target_language,
            )
            .await
        }
        Command::QueueStatus => commands::queue::run(&ctx.orchestrator).await,
    }
}
