// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use subflow_core::{Classify, ErrorClass};

/// Classify a generic API error message by substring, the same heuristic
/// both external clients use when the backend doesn't give a structured
/// status code: 5xx/timeout/unavailable-shaped messages are worth
/// retrying, everything else is assumed permanent.
fn classify_api_message(message: &str) -> ErrorClass {
    let lower = message.to_lowercase();
    let transient_markers = ["503", "502", "504", "500", "timeout", "unavailable"];
    if transient_markers.iter().any(|m| lower.contains(m)) {
        ErrorClass::Transient
    } else {
        ErrorClass::Permanent
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog authentication failed: {0}")]
    Authentication(String),
    #[error("catalog rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("catalog API error: {0}")]
    Api(String),
    #[error("not authenticated with catalog")]
    NotAuthenticated,
    #[error("catalog response malformed: {0}")]
    MalformedResponse(String),
    #[error("I/O error writing subtitle to disk: {0}")]
    Io(#[from] std::io::Error),
}

impl Classify for CatalogError {
    fn class(&self) -> ErrorClass {
        match self {
            CatalogError::Authentication(_) => ErrorClass::Permanent,
            CatalogError::RateLimit(_) => ErrorClass::Transient,
            CatalogError::Api(message) => classify_api_message(message),
            CatalogError::NotAuthenticated => ErrorClass::Permanent,
            CatalogError::MalformedResponse(_) => ErrorClass::Structural,
            CatalogError::Io(_) => ErrorClass::Transient,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LmError {
    #[error("language model authentication failed: {0}")]
    Authentication(String),
    #[error("language model rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("language model API error: {0}")]
    Api(String),
    /// More than one expected translation never came back. Retried: the
    /// same batch frequently succeeds on a second attempt.
    #[error("translation count mismatch: expected {expected}, parsed {actual}")]
    TranslationCountMismatch { expected: usize, actual: usize },
    /// `finish_reason = length` with empty content, or no choices at all —
    /// a malformed completion rather than a transport failure.
    #[error("malformed language model response: {0}")]
    MalformedResponse(String),
}

impl Classify for LmError {
    fn class(&self) -> ErrorClass {
        match self {
            LmError::Authentication(_) => ErrorClass::Permanent,
            LmError::RateLimit(_) => ErrorClass::Transient,
            LmError::Api(message) => classify_api_message(message),
            LmError::TranslationCountMismatch { .. } => ErrorClass::Transient,
            LmError::MalformedResponse(_) => ErrorClass::Structural,
        }
    }
}
