// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! subflow-subtitle: SRT parsing, token-aware chunking, and translation
//! merging shared by the download and translation workers.
//!
//! - [`srt`] — parse/format SRT content
//! - [`chunk`] — split segments into batches, by count or by token budget
//! - [`merge`] — stitch translated text back into segments, across chunks
//! - [`segment`] — the shared [`SubtitleSegment`] type
//! - [`error`] — [`SubtitleError`] and its [`subflow_core::Classify`] impl

pub mod chunk;
pub mod error;
pub mod merge;
pub mod segment;
pub mod srt;

pub use chunk::{chunk_segments, split_subtitle_content, SplitOptions, DEFAULT_MAX_SEGMENTS_PER_CHUNK};
pub use error::SubtitleError;
pub use merge::{merge_translated_chunks, merge_translations};
pub use segment::{extract_text_for_translation, SubtitleSegment};
pub use srt::{format, parse};
