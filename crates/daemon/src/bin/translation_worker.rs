// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! The translation worker process (§4.10): connects to the broker, job
//! store, and checkpoint store, and consumes `subtitle.translation` at
//! prefetch 1 until shut down.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use subflow_broker::{run_consumer, BrokerConnection};
use subflow_clients::{LanguageModelClient, LmConfig, OpenAiClient};
use subflow_core::{RetryPolicy, ShutdownManager, SystemClock, TokenCounter};
use subflow_daemon::bootstrap::{broker_config, spawn_broker_health_check, spawn_store_health_check};
use subflow_daemon::config::load_translation_config;
use subflow_daemon::logging;
use subflow_daemon::translation::{handle_message, TranslationContext};
use subflow_engine::TranslationEngineConfig;
use subflow_storage::{CheckpointStore, JobStore, RedisCheckpointStore, RedisJobStore};
use subflow_subtitle::SplitOptions;
use subflow_wire::TRANSLATION_QUEUE;

const CONFIG_PATH_ENV: &str = "SUBFLOW_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "/etc/subflow/subflow.toml";
const LOG_DIR_ENV: &str = "SUBFLOW_LOG_DIR";
const DEFAULT_LOG_DIR: &str = "/var/log/subflow";
const CONSUMER_TAG: &str = "subflow-translation-worker";

#[tokio::main]
async fn main() {
    let log_dir =
        std::env::var(LOG_DIR_ENV).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR));
    let _guard = logging::init("translation-worker", &log_dir);

    let config_path =
        std::env::var(CONFIG_PATH_ENV).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = match load_translation_config(&config_path) {
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

    let checkpoint_store: Arc<dyn CheckpointStore> = {
        let client = match redis::Client::open(config.core.redis_url.as_str()) {
            Ok(client) => client,
            Err(error) => {
                tracing::error!(%error, "failed to build redis client for checkpoint store");
                std::process::exit(1);
            }
        };
        match client.get_connection_manager().await {
            Ok(conn) => Arc::new(RedisCheckpointStore::new(conn)),
            Err(error) => {
                tracing::error!(%error, "failed to connect checkpoint store");
                std::process::exit(1);
            }
        }
    };

    let lm_client: Arc<dyn LanguageModelClient> = Arc::new(OpenAiClient::new(LmConfig {
        api_key: config.lm_api_key.clone(),
        base_url: config.lm_base_url.clone(),
        model: config.lm_model.clone(),
        max_completion_tokens: config.lm_max_completion_tokens,
        temperature: config.lm_temperature,
        retry_policy: RetryPolicy::new(
            config.lm_retry_max_retries,
            Duration::from_secs(config.lm_retry_initial_delay_secs),
            config.lm_retry_exponential_base,
            Duration::from_secs(config.lm_retry_max_delay_secs),
        ),
    }));

    let health_check_interval = Duration::from_secs(config.core.health_check_interval_secs);
    spawn_broker_health_check(Arc::clone(&broker), Arc::clone(&shutdown), health_check_interval);
    spawn_store_health_check(Arc::clone(&job_store), Arc::clone(&shutdown), health_check_interval);

    let engine_config = TranslationEngineConfig {
        split_options: SplitOptions {
            max_tokens: config.translation_max_tokens_per_chunk,
            model: config.lm_model.clone(),
            safety_margin: config.translation_token_safety_margin,
            max_segments_per_chunk: config.translation_max_segments_per_chunk,
        },
        parallel_requests: config.translation_parallel_requests,
        checkpoint_enabled: config.checkpoint_enabled,
        cleanup_checkpoint_on_success: config.checkpoint_cleanup_on_success,
    };

    let ctx = Arc::new(TranslationContext {
        job_store,
        lm_client,
        checkpoint_store,
        token_counter: Arc::new(TokenCounter::new()),
        broker: Arc::clone(&broker),
        subtitle_storage_path: config.core.subtitle_storage_path.clone(),
        engine_config,
    });

    let channel = match broker.channel().await {
        Ok(channel) => channel,
        Err(error) => {
            tracing::error!(%error, "failed to obtain broker channel");
            std::process::exit(1);
        }
    };

    tracing::info!("translation worker started");
    let processing_timeout = Duration::from_secs(config.core.processing_timeout_secs);
    let result = run_consumer(&channel, TRANSLATION_QUEUE, CONSUMER_TAG, &shutdown, processing_timeout, {
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
    tracing::info!("translation worker stopped");
}
