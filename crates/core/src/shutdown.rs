// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Graceful shutdown: signal handling, LIFO cleanup callbacks, bounded
//! timeouts. One instance per process, shared via `Arc` with every
//! component that needs to poll `shutdown_requested()` or register a
//! cleanup callback.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::signal::unix::{signal, SignalKind};

pub type CleanupFuture = Pin<Box<dyn Future<Output = Result<(), String>> + Send>>;
pub type CleanupFn = Box<dyn FnOnce() -> CleanupFuture + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum State {
    NotStarted = 0,
    Initiated = 1,
    InProgress = 2,
    Completed = 3,
}

/// Per-process shutdown coordinator.
pub struct ShutdownManager {
    state: AtomicU8,
    signal_count: AtomicU32,
    cleanups: Mutex<Vec<(String, CleanupFn)>>,
    timeout: Duration,
    fast_cleanup_timeout: Duration,
}

impl ShutdownManager {
    /// `timeout` bounds the first (graceful) shutdown attempt; the second
    /// signal always uses a fixed 5s fast-cleanup window regardless.
    pub fn new(timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: AtomicU8::new(State::NotStarted as u8),
            signal_count: AtomicU32::new(0),
            cleanups: Mutex::new(Vec::new()),
            timeout,
            fast_cleanup_timeout: Duration::from_secs(5),
        })
    }

    pub fn shutdown_requested(&self) -> bool {
        self.state.load(Ordering::SeqCst) != State::NotStarted as u8
    }

    pub fn is_completed(&self) -> bool {
        self.state.load(Ordering::SeqCst) == State::Completed as u8
    }

    /// Registers a cleanup callback. Callbacks run in reverse registration
    /// order (LIFO) during shutdown; a failing callback is logged and does
    /// not prevent the rest from running.
    pub fn register_cleanup(&self, name: impl Into<String>, cleanup: CleanupFn) {
        self.cleanups.lock().push((name.into(), cleanup));
    }

    /// Spawns the SIGINT/SIGTERM listener task. Call once per process.
    pub fn install_signal_handlers(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut sigint = match signal(SignalKind::interrupt()) {
                Ok(s) => s,
                Err(error) => {
                    tracing::error!(%error, "failed to install SIGINT handler");
                    return;
                }
            };
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(error) => {
                    tracing::error!(%error, "failed to install SIGTERM handler");
                    return;
                }
            };
            loop {
                tokio::select! {
                    _ = sigint.recv() => manager.on_signal(),
                    _ = sigterm.recv() => manager.on_signal(),
                }
            }
        });
    }

    fn on_signal(self: &Arc<Self>) {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst) + 1;
        match count {
            1 => {
                tracing::info!("shutdown signal received, initiating graceful shutdown");
                let manager = Arc::clone(self);
                tokio::spawn(async move { manager.run_graceful().await });
            }
            2 => {
                tracing::warn!("second shutdown signal received, forcing fast cleanup");
                let manager = Arc::clone(self);
                tokio::spawn(async move {
                    let _ =
                        tokio::time::timeout(manager.fast_cleanup_timeout, manager.run_cleanups()).await;
                    std::process::exit(1);
                });
            }
            n => {
                tracing::warn!(signal_count = n, "additional shutdown signal ignored");
            }
        }
    }

    async fn run_graceful(self: Arc<Self>) {
        self.state.store(State::Initiated as u8, Ordering::SeqCst);
        if tokio::time::timeout(self.timeout, self.run_cleanups()).await.is_err() {
            tracing::warn!("graceful shutdown timed out before all cleanups finished");
        }
        self.state.store(State::Completed as u8, Ordering::SeqCst);
    }

    /// Runs every registered cleanup callback in LIFO order. Exposed for
    /// tests and for callers that want to drive shutdown manually (e.g. a
    /// CLI command) rather than through OS signals.
    pub async fn run_cleanups(&self) {
        self.state.store(State::InProgress as u8, Ordering::SeqCst);
        let callbacks = std::mem::take(&mut *self.cleanups.lock());
        for (name, cleanup) in callbacks.into_iter().rev() {
            match cleanup().await {
                Ok(()) => tracing::debug!(cleanup = %name, "cleanup callback completed"),
                Err(error) => {
                    tracing::warn!(cleanup = %name, %error, "cleanup callback failed, continuing")
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
