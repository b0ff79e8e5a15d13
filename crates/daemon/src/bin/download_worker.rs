// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! The download worker process (§4.9): connects to the broker and job
//! store, declares topology, and consumes `subtitle.download` at
//! prefetch 1 until shut down.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use subflow_broker::{run_consumer, BrokerConnection};
use subflow_clients::{CatalogClient, CatalogConfig, OpenSubtitlesClient};
use subflow_core::{RetryPolicy, ShutdownManager, SystemClock};
use subflow_daemon::bootstrap::{broker_config, spawn_broker_health_check, spawn_store_health_check};
use subflow_daemon::config::load_download_config;
use subflow_daemon::download::{handle_message, DownloadContext};
use subflow_daemon::logging;
use subflow_storage::{JobStore, RedisJobStore};
use subflow_wire::DOWNLOAD_QUEUE;

const CONFIG_PATH_ENV: &str = "SUBFLOW_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "/etc/subflow/subflow.toml";
const LOG_DIR_ENV: &str = "SUBFLOW_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "/var/log/subflow";
const CONSUMER_TAG: &str = "subflow-download-worker";

#[tokio::main]
async fn main() {
    let log_dir =
        std::env::var(LOG_DIR_ENV).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR));
    let _guard = logging::init("download-worker", &log_dir);

    let config_path =
        std::env::var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = match load_download_config(&config_path) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "failed to load configuration");
            std::process::exit(1);
        }
    };

    let shutdown = ShutdownManager::new(Duration::from_secs(config.core.shutdown_timeout_secs));
    shutdown.install_signal_handlers();

    let broker = Arc::new(BrokerConnection::new(broker_config(&config.core)));
    if let Err(error) = broker.connect().await {
        tracing::error!(%error, "failed to connect to broker");
        std::process::exit(1);
    }

    let job_store: Arc<dyn JobStore> = match RedisJobStore::connect(&config.core.redis_url, SystemClock).await {
        Ok(store) => Arc::new(store),
        Err(error) => {
            tracing::error!(%error, "failed to connect to job store");
            std::process::exit(1);
        }
    };

    let catalog_client: Arc<dyn CatalogClient> = Arc::new(OpenSubtitlesClient::new(CatalogConfig {
        base_url: config.catalog_base_url.clone(),
        username: config.catalog_username.clone(),
        password: config.catalog_password.clone(),
        user_agent: config.catalog_user_agent.clone(),
        storage_path: config.core.subtitle_storage_path.clone(),
        retry_policy: RetryPolicy::new(
            config.catalog_retry_max_retries,
            Duration::from_secs(config.catalog_retry_initial_delay_secs),
            config.catalog_retry_exponential_base,
            Duration::from_secs(config.catalog_retry_max_delay_secs),
        ),
    }));
    if let Err(error) = catalog_client.connect().await {
        tracing::warn!(%error, "catalog client failed to authenticate at startup, will retry per task");
    }

    let health_check_interval = Duration::from_secs(config.core.health_check_interval_secs);
    spawn_broker_health_check(Arc::clone(&broker), Arc::clone(&shutdown), health_check_interval);
    spawn_store_health_check(Arc::clone(&job_store), Arc::clone(&shutdown), health_check_interval);

    let ctx = Arc::new(DownloadContext {
        job_store,
        catalog_client,
        broker: Arc::clone(&broker),
        subtitle_storage_path: config.core.subtitle_storage_path.clone(),
    });

    let channel = match broker.channel().await {
        Ok(channel) => channel,
        Err(error) => {
            tracing::error!(%error, "failed to obtain broker channel");
            std::process::exit(1);
        }
    };

    tracing::info!("download worker started");
    let processing_timeout = Duration::from_secs(config.core.processing_timeout_secs);
    let result = run_consumer(&channel, DOWNLOAD_QUEUE, CONSUMER_TAG, &shutdown, processing_timeout, {
        let ctx = Arc::clone(&ctx);
        move |payload| {
            let ctx = Arc::clone(&ctx);
            async move { handle_message(payload, ctx).await }
        }
    })
    .await;

    if let Err(error) = result {
        tracing::error!(%error, "consumer loop exited with error");
    }

    while !shutdown.is_completed() && shutdown.shutdown_requested() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tracing::info!("download worker stopped");
}
