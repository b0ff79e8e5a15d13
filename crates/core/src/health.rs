// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Uniform "check connection health, log only on state transitions" helper
//! shared by the broker connection, the job store connection, and the
//! event publisher, so a steady-state healthy connection never spams logs
//! on every health-check tick.

use std::future::Future;

/// Calls `ensure_connected` and logs a reconnection line only on the
/// false→true transition (and a warning on failure). `was_connected`
/// reports whether the caller believes the connection was healthy before
/// this check; pass a cheap synchronous probe, not `ensure_connected`
/// itself.
pub async fn check_and_log_reconnection<F, Fut>(
    connection_name: &str,
    component: Option<&str>,
    was_connected: bool,
    ensure_connected: F,
) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = bool>,
{
    let context = component.map(|c| format!(" ({c})")).unwrap_or_default();
    let is_connected = ensure_connected().await;

    if is_connected && !was_connected {
        tracing::info!(connection = connection_name, "reconnected successfully{context}");
    } else if !is_connected {
        tracing::warn!(connection = connection_name, "connection check failed{context}");
    }

    is_connected
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
