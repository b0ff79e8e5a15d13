// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Shared worker-process bootstrap: broker configuration and the
//! periodic health-check tick (§4.12/§5), identical across both worker
//! binaries.

use std::sync::Arc;
use std::time::Duration;

use subflow_broker::BrokerConnection;
use subflow_core::{check_and_log_reconnection, ShutdownManager};
use subflow_storage::JobStore;

use crate::config::CoreConfig;

pub fn broker_config(core: &CoreConfig) -> subflow_broker::BrokerConfig {
    subflow_broker::BrokerConfig {
        amqp_url: core.amqp_url.clone(),
        reconnect_max_retries: core.reconnect_max_retries,
        reconnect_initial_delay: Duration::from_secs(core.reconnect_initial_delay_secs),
        reconnect_max_delay: Duration::from_secs(core.reconnect_max_delay_secs),
        reconnect_exponential_base: core.reconnect_exponential_base,
        health_check_interval: Duration::from_secs(core.health_check_interval_secs),
    }
}

/// Spawns the periodic broker connectivity probe: on `interval`, calls
/// `ensure_connected` and logs only on the false→true transition, via the
/// shared [`check_and_log_reconnection`] helper. Stops once shutdown is
/// requested.
pub fn spawn_broker_health_check(broker: Arc<BrokerConnection>, shutdown: Arc<ShutdownManager>, interval: Duration) {
    tokio::spawn(async move {
        let mut was_connected = broker.is_connected().await;
        while !shutdown.shutdown_requested() {
            tokio::time::sleep(interval).await;
            if shutdown.shutdown_requested() {
                break;
            }
            was_connected = check_and_log_reconnection("broker", None, was_connected, || async {
                broker.ensure_connected().await
            })
            .await;
        }
    });
}

/// Same tick, for the job store connection.
pub fn spawn_store_health_check(
    job_store: Arc<dyn JobStore>,
    shutdown: Arc<ShutdownManager>,
    interval: Duration,
) {
    tokio::spawn(async move {
        let mut was_connected = job_store.ensure_connected().await;
        while !shutdown.shutdown_requested() {
            tokio::time::sleep(interval).await;
            if shutdown.shutdown_requested() {
                break;
            }
            was_connected = check_and_log_reconnection("job_store", None, was_connected, || async {
                job_store.ensure_connected().await
            })
            .await;
        }
    });
}
