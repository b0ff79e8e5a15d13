// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::*;

#[tokio::test]
async fn reports_connected_state_from_probe() {
    let connected = check_and_log_reconnection("redis", Some("translator"), true, || async { true }).await;
    assert!(connected);
}

#[tokio::test]
async fn reports_failure_when_ensure_connected_returns_false() {
    let connected = check_and_log_reconnection("redis", None, true, || async { false }).await;
    assert!(!connected);
}

#[tokio::test]
async fn reconnection_from_disconnected_to_connected_is_reported_true() {
    let connected = check_and_log_reconnection("amqp", Some("downloader"), false, || async { true }).await;
    assert!(connected);
}
