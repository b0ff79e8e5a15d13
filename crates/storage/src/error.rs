// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use subflow_core::{Classify, ErrorClass};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("connection to key/value store failed: {0}")]
    Connection(String),
    #[error("job {0} already exists")]
    AlreadyExists(String),
    #[error("job {0} not found")]
    NotFound(String),
    #[error("invalid phase transition for job {job_id}: {from} -> {to}")]
    InvalidTransition {
        job_id: String,
        from: String,
        to: String,
    },
    #[error("failed to (de)serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}

impl Classify for StorageError {
    fn class(&self) -> ErrorClass {
        match self {
            StorageError::Connection(_) | StorageError::Redis(_) => ErrorClass::Transient,
            StorageError::AlreadyExists(_)
            | StorageError::NotFound(_)
            | StorageError::InvalidTransition { .. } => ErrorClass::Permanent,
            StorageError::Serialization(_) => ErrorClass::Structural,
        }
    }
}
