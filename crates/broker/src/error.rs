// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use subflow_core::{Classify, ErrorClass};

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker connection unavailable: {0}")]
    Connection(String),
    #[error("not connected to broker")]
    NotConnected,
    #[error("failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Lapin(#[from] lapin::Error),
}

impl Classify for BrokerError {
    fn class(&self) -> ErrorClass {
        match self {
            BrokerError::Connection(_) => ErrorClass::Transient,
            BrokerError::NotConnected => ErrorClass::Transient,
            BrokerError::Serialization(_) => ErrorClass::Structural,
            BrokerError::Lapin(_) => ErrorClass::Transient,
        }
    }
}
