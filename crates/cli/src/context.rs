// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Wires up the same broker connection and job store the worker binaries
//! use, from the same `subflow.toml` configuration file. One-shot: connect,
//! run a command, exit — no health-check ticks or signal handling needed
//! for a CLI invocation.

use std::path::PathBuf;
use std::sync::Arc;

use subflow_core::SystemClock;
use subflow_daemon::bootstrap::broker_config;
use subflow_daemon::config::{load_core_config, CoreConfig};
use subflow_engine::Orchestrator;
use subflow_storage::{JobStore, RedisJobStore};

const CONFIG_PATH_ENV: &str = "SUBFLOW_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "/etc/subflow/subflow.toml";

pub struct Context {
    pub core: CoreConfig,
    pub orchestrator: Orchestrator,
    pub job_store: Arc<dyn JobStore>,
}

impl Context {
    pub async fn connect() -> anyhow::Result<Self> {
        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let core = load_core_config(&config_path)?;

        let broker = Arc::new(subflow_broker::BrokerConnection::new(broker_config(&core)));
        if let Err(error) = broker.connect().await {
            tracing::warn!(%error, "could not connect to broker, enqueue operations will run in mock mode");
        }
        let orchestrator = Orchestrator::new(broker);

        let job_store: Arc<dyn JobStore> = Arc::new(RedisJobStore::connect(&core.redis_url, SystemClock).await?);

        Ok(Self { core, orchestrator, job_store })
    }
}
