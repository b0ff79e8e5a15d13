// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! The in-memory subtitle unit shared by the parser, chunker, and merger.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single SRT cue: an index, a timing pair, and its text.
///
/// `start_time`/`end_time` are kept as the original `HH:MM:SS,mmm` strings
/// rather than parsed into a duration type — nothing downstream needs to do
/// arithmetic on them, and re-emitting the exact source formatting avoids a
/// whole class of round-trip drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleSegment {
    pub index: u32,
    pub start_time: String,
    pub end_time: String,
    pub text: String,
}

impl fmt::Display for SubtitleSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start_time, self.end_time)?;
        writeln!(f, "{}", self.text)
    }
}

/// Extract the raw text of each segment, in order, for batch translation.
pub fn extract_text_for_translation(segments: &[SubtitleSegment]) -> Vec<String> {
    segments.iter().map(|s| s.text.clone()).collect()
}

#[cfg(test)]
#[path = "segment_tests.rs"]
mod tests;
