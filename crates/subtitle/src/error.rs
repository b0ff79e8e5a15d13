// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use subflow_core::{Classify, ErrorClass};

/// The maximum number of missing segment numbers to list in an error message.
const MAX_MISSING_SEGMENTS_TO_DISPLAY: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    /// A translated-chunk response came back with a segment count other
    /// than the one expected. Missing-by-one is tolerated upstream in
    /// [`crate::merge::merge_translations`] and never reaches this variant;
    /// this is for every other mismatch.
    #[error("translation count mismatch: expected {expected} translations, got {actual} (missing {missing}){chunk_info}{missing_numbers}")]
    TranslationCountMismatch {
        expected: usize,
        actual: usize,
        missing: usize,
        chunk_info: String,
        missing_numbers: String,
    },
    #[error("max_segments must be at least 1, got {0}")]
    InvalidMaxSegments(usize),
    #[error("max_tokens must be positive, got {0}")]
    InvalidMaxTokens(i64),
    #[error("safety_margin must be between 0.0 and 1.0, got {0}")]
    InvalidSafetyMargin(f64),
}

impl Classify for SubtitleError {
    fn class(&self) -> ErrorClass {
        match self {
            // A batch that comes back malformed is often just LLM flakiness;
            // retrying the same chunk frequently succeeds.
            SubtitleError::TranslationCountMismatch { .. } => ErrorClass::Structural,
            SubtitleError::InvalidMaxSegments(_)
            | SubtitleError::InvalidMaxTokens(_)
            | SubtitleError::InvalidSafetyMargin(_) => ErrorClass::Permanent,
        }
    }
}

impl SubtitleError {
    pub fn translation_count_mismatch(
        expected: usize,
        actual: usize,
        chunk_index: Option<usize>,
        total_chunks: Option<usize>,
    ) -> Self {
        let chunk_info = match (chunk_index, total_chunks) {
            (Some(idx), Some(total)) => format!(" in chunk {}/{}", idx + 1, total),
            _ => String::new(),
        };
        SubtitleError::TranslationCountMismatch {
            expected,
            actual,
            missing: expected.saturating_sub(actual),
            chunk_info,
            missing_numbers: String::new(),
        }
    }

    /// Attach the list of 1-based segment numbers that never came back,
    /// truncated to [`MAX_MISSING_SEGMENTS_TO_DISPLAY`].
    pub fn with_missing_numbers(mut self, mut missing: Vec<u32>) -> Self {
        if let SubtitleError::TranslationCountMismatch { missing_numbers, .. } = &mut self {
            missing.sort_unstable();
            let total_missing = missing.len();
            let shown: Vec<String> = missing
                .iter()
                .take(MAX_MISSING_SEGMENTS_TO_DISPLAY)
                .map(|n| n.to_string())
                .collect();
            if !shown.is_empty() {
                let mut s = format!(". Missing segment numbers: [{}]", shown.join(", "));
                if total_missing > MAX_MISSING_SEGMENTS_TO_DISPLAY {
                    s.push_str(&format!(
                        " (and {} more)",
                        total_missing - MAX_MISSING_SEGMENTS_TO_DISPLAY
                    ));
                }
                *missing_numbers = s;
            }
        }
        self
    }
}
