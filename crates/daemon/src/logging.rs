// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Process-wide logging init: stdout plus a rolling daily file under
//! `log_dir`, filtered by `RUST_LOG` (falling back to `info`).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Installs the subscriber and returns the non-blocking file writer's
/// guard — keep it alive for the process lifetime or buffered lines are
/// dropped on exit.
pub fn init(component: &str, log_dir: &Path) -> WorkerGuard {
    if let Err(error) = std::fs::create_dir_all(log_dir) {
        eprintln!("warning: failed to create log directory {}: {error}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, format!("{component}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let directive = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::new(directive.clone())))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(directive)),
        )
        .init();

    guard
}
