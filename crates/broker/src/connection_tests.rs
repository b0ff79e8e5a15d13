// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::*;

#[test]
fn default_config_is_sane() {
    let config = BrokerConfig::default();
    assert!(config.amqp_url.starts_with("amqp://"));
    assert!(config.reconnect_max_delay >= config.reconnect_initial_delay);
}

#[tokio::test]
async fn fresh_connection_reports_not_connected() {
    let connection = BrokerConnection::new(BrokerConfig::default());
    assert!(!connection.is_connected().await);
}

#[tokio::test]
async fn channel_before_connect_is_not_connected_error() {
    let connection = BrokerConnection::new(BrokerConfig::default());
    let err = connection.channel().await.unwrap_err();
    assert!(matches!(err, BrokerError::NotConnected));
}
