// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Splitting a subtitle's segments into batches small enough to send to a
//! language model in one request. A segment is never split across chunks.

use subflow_core::TokenCounter;
use tracing::{debug, info, warn};

use crate::error::SubtitleError;
use crate::segment::SubtitleSegment;

/// Segment-count batch size used by [`chunk_segments`] when the caller
/// doesn't need token awareness (e.g. non-LLM batch processing).
pub const DEFAULT_MAX_SEGMENTS_PER_CHUNK: usize = 50;

/// Split segments into fixed-size batches, ignoring token budgets.
pub fn chunk_segments(
    segments: &[SubtitleSegment],
    max_segments: usize,
) -> Result<Vec<Vec<SubtitleSegment>>, SubtitleError> {
    if max_segments < 1 {
        return Err(SubtitleError::InvalidMaxSegments(max_segments));
    }
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let chunks: Vec<Vec<SubtitleSegment>> = segments
        .chunks(max_segments)
        .map(|c| c.to_vec())
        .collect();
    info!(segments = segments.len(), chunks = chunks.len(), "split segments into chunks");
    Ok(chunks)
}

/// Tunables for [`split_subtitle_content`], mirroring its Python defaults:
/// model `"gpt-4"`, 80% safety margin, 200 segments per chunk ceiling.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub max_tokens: u32,
    pub model: String,
    pub safety_margin: f64,
    pub max_segments_per_chunk: usize,
}

impl SplitOptions {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            model: "gpt-4".to_string(),
            safety_margin: 0.8,
            max_segments_per_chunk: 200,
        }
    }
}

/// Split segments into token-safe chunks, respecting `max_tokens` (scaled
/// by `safety_margin`) and `max_segments_per_chunk`, whichever is hit
/// first. A segment that alone exceeds the effective limit is still
/// emitted — in its own chunk — rather than dropped or truncated.
pub fn split_subtitle_content(
    segments: &[SubtitleSegment],
    options: &SplitOptions,
    counter: &TokenCounter,
) -> Result<Vec<Vec<SubtitleSegment>>, SubtitleError> {
    if options.max_tokens == 0 {
        return Err(SubtitleError::InvalidMaxTokens(options.max_tokens as i64));
    }
    if !(options.safety_margin > 0.0 && options.safety_margin <= 1.0) {
        return Err(SubtitleError::InvalidSafetyMargin(options.safety_margin));
    }
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let effective_limit = (options.max_tokens as f64 * options.safety_margin) as usize;

    let mut chunks = Vec::new();
    let mut current_chunk: Vec<SubtitleSegment> = Vec::new();
    let mut current_token_count = 0usize;

    for segment in segments {
        let segment_tokens = counter.count(&segment.text, &options.model);

        let would_exceed_tokens =
            current_token_count + segment_tokens > effective_limit && !current_chunk.is_empty();
        let would_exceed_segment_count = current_chunk.len() >= options.max_segments_per_chunk;

        if would_exceed_tokens || would_exceed_segment_count {
            debug!(
                segments = current_chunk.len(),
                tokens = current_token_count,
                "closed chunk"
            );
            if would_exceed_segment_count {
                info!(limit = options.max_segments_per_chunk, "chunk reached max_segments_per_chunk, starting new chunk");
            }
            chunks.push(std::mem::take(&mut current_chunk));
            current_chunk.push(segment.clone());
            current_token_count = segment_tokens;
        } else {
            current_chunk.push(segment.clone());
            current_token_count += segment_tokens;
        }

        if segment_tokens > effective_limit {
            warn!(
                segment = segment.index,
                tokens = segment_tokens,
                limit = effective_limit,
                "segment exceeds token limit on its own, including anyway"
            );
        }
    }

    if !current_chunk.is_empty() {
        debug!(segments = current_chunk.len(), tokens = current_token_count, "closed final chunk");
        chunks.push(current_chunk);
    }

    info!(
        segments = segments.len(),
        chunks = chunks.len(),
        limit = effective_limit,
        "split subtitle content into token-aware chunks"
    );
    Ok(chunks)
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
