// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use subflow_engine::Orchestrator;

pub async fn run(orchestrator: &Orchestrator) -> anyhow::Result<()> {
    let status = orchestrator.get_queue_status().await;
    println!("subtitle.download:    {} message(s) pending", status.download_queue_size);
    println!("subtitle.translation: {} message(s) pending", status.translation_queue_size);
    println!(
        "active workers:       downloader={}, translator={}",
        status.active_workers.downloader, status.active_workers.translator
    );
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
