// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use subflow_clients::LmError;
use subflow_core::{Classify, ErrorClass};
use subflow_subtitle::SubtitleError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("language model error: {0}")]
    LanguageModel(#[from] LmError),
    #[error("subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),
    /// At least one chunk in the batch failed translation. Classified as
    /// transient: a fresh attempt resumes from the checkpoint rather than
    /// repeating the chunks that already succeeded.
    #[error("translation failed for {failed_count} chunk(s) (first failure at chunk {first_chunk}): {first_error}")]
    ChunkBatch { failed_count: usize, first_chunk: usize, first_error: String },
    #[error("broker error: {0}")]
    Broker(#[from] subflow_broker::BrokerError),
}

impl Classify for EngineError {
    fn class(&self) -> ErrorClass {
        match self {
            EngineError::LanguageModel(inner) => inner.class(),
            EngineError::Subtitle(inner) => inner.class(),
            EngineError::ChunkBatch { .. } => ErrorClass::Transient,
            EngineError::Broker(inner) => inner.class(),
        }
    }
}
