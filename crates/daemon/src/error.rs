// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Worker-level error type. Wraps every collaborator's error and
//! delegates classification to it, so the message-handler boundary in
//! [`crate::download`]/[`crate::translation`] can decide "redeliver" vs
//! "fail the job" with one `match` on [`Classify::class`].

use subflow_core::{Classify, ErrorClass};

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error(transparent)]
    Storage(#[from] subflow_storage::StorageError),
    #[error(transparent)]
    Catalog(#[from] subflow_clients::CatalogError),
    #[error(transparent)]
    Engine(#[from] subflow_engine::EngineError),
    #[error(transparent)]
    Broker(#[from] subflow_broker::BrokerError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no subtitle candidates found for language {0}")]
    NoCandidates(String),
}

impl Classify for DaemonError {
    fn class(&self) -> ErrorClass {
        match self {
            DaemonError::Storage(inner) => inner.class(),
            DaemonError::Catalog(inner) => inner.class(),
            DaemonError::Engine(inner) => inner.class(),
            DaemonError::Broker(inner) => inner.class(),
            DaemonError::Io(_) => ErrorClass::Transient,
            DaemonError::NoCandidates(_) => ErrorClass::Permanent,
        }
    }
}
