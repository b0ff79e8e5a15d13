// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Stitching translated text back into subtitle segments.
//!
//! Translation responses are free text parsed out of an LLM reply, so they
//! sometimes come back short by exactly one segment (a truncated final
//! line, a skipped "segment 7:" marker). [`merge_translations`] tolerates
//! that one case by falling back to the original text for whichever
//! segment is missing, rather than failing the whole chunk and forcing a
//! full retry.

use std::collections::{BTreeSet, HashMap};

use tracing::{info, warn};

use crate::error::SubtitleError;
use crate::segment::SubtitleSegment;

fn calculate_missing_segment_numbers(
    segment_count: usize,
    parsed_segment_numbers: &[u32],
) -> BTreeSet<u32> {
    let expected: BTreeSet<u32> = (1..=segment_count as u32).collect();
    let parsed: BTreeSet<u32> = parsed_segment_numbers.iter().copied().collect();
    expected.difference(&parsed).copied().collect()
}

fn identify_missing_segment_index(
    segment_count: usize,
    parsed_segment_numbers: Option<&[u32]>,
) -> usize {
    let Some(parsed) = parsed_segment_numbers.filter(|p| !p.is_empty()) else {
        return segment_count - 1;
    };

    let missing = calculate_missing_segment_numbers(segment_count, parsed);
    let Some(&missing_number) = missing.iter().next() else {
        return segment_count - 1;
    };

    if missing_number < 1 || missing_number as usize > segment_count {
        warn!(
            missing_number,
            segment_count, "invalid missing segment number, falling back to last segment"
        );
        return segment_count - 1;
    }

    missing_number as usize - 1
}

fn create_translation_map(
    translations: &[String],
    parsed_segment_numbers: Option<&[u32]>,
) -> HashMap<u32, String> {
    if let Some(parsed) = parsed_segment_numbers.filter(|p| !p.is_empty()) {
        if parsed.len() != translations.len() {
            warn!(
                parsed = parsed.len(),
                translations = translations.len(),
                "parsed segment number count does not match translation count, using sequential fallback"
            );
            return translations
                .iter()
                .enumerate()
                .map(|(i, t)| (i as u32 + 1, t.trim().to_string()))
                .collect();
        }
        return parsed
            .iter()
            .zip(translations.iter())
            .map(|(&n, t)| (n, t.trim().to_string()))
            .collect();
    }

    translations
        .iter()
        .enumerate()
        .map(|(i, t)| (i as u32 + 1, t.trim().to_string()))
        .collect()
}

fn build_translated_segments_with_missing(
    segments: &[SubtitleSegment],
    translation_map: &HashMap<u32, String>,
    missing_index: usize,
) -> Vec<SubtitleSegment> {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let text = if i == missing_index {
                info!(segment = segment.index, "using original text for missing translation");
                segment.text.clone()
            } else {
                translation_map.get(&segment.index).cloned().unwrap_or_else(|| {
                    warn!(segment = segment.index, "no translation found, using original text");
                    segment.text.clone()
                })
            };
            SubtitleSegment {
                index: segment.index,
                start_time: segment.start_time.clone(),
                end_time: segment.end_time.clone(),
                text,
            }
        })
        .collect()
}

fn merge_translations_with_one_missing(
    segments: &[SubtitleSegment],
    translations: &[String],
    parsed_segment_numbers: Option<&[u32]>,
) -> Vec<SubtitleSegment> {
    let missing_index = identify_missing_segment_index(segments.len(), parsed_segment_numbers);
    warn!(
        segment = segments[missing_index].index,
        "translation count mismatch: missing 1, using original text for that segment"
    );
    let translation_map = create_translation_map(translations, parsed_segment_numbers);
    build_translated_segments_with_missing(segments, &translation_map, missing_index)
}

/// Merge translated text into `segments`, tolerating exactly one missing
/// translation. `parsed_segment_numbers`, when given, identifies which
/// segment numbers the translations actually correspond to, so the one
/// missing segment can be pinpointed instead of assumed to be the last.
pub fn merge_translations(
    segments: &[SubtitleSegment],
    translations: &[String],
    chunk_index: Option<usize>,
    total_chunks: Option<usize>,
    parsed_segment_numbers: Option<&[u32]>,
) -> Result<Vec<SubtitleSegment>, SubtitleError> {
    let segment_count = segments.len();
    let translation_count = translations.len();

    if segment_count.checked_sub(translation_count) == Some(1) {
        return Ok(merge_translations_with_one_missing(
            segments,
            translations,
            parsed_segment_numbers,
        ));
    }

    if segment_count != translation_count {
        let mut err = SubtitleError::translation_count_mismatch(
            segment_count,
            translation_count,
            chunk_index,
            total_chunks,
        );
        if let Some(parsed) = parsed_segment_numbers {
            let missing = calculate_missing_segment_numbers(segment_count, parsed);
            err = err.with_missing_numbers(missing.into_iter().collect());
        }
        return Err(err);
    }

    Ok(segments
        .iter()
        .zip(translations.iter())
        .map(|(segment, translation)| SubtitleSegment {
            index: segment.index,
            start_time: segment.start_time.clone(),
            end_time: segment.end_time.clone(),
            text: translation.trim().to_string(),
        })
        .collect())
}

/// Merge translated segments from multiple chunks, restoring chronological
/// order and renumbering sequentially from 1.
pub fn merge_translated_chunks(translated_segments: &[SubtitleSegment]) -> Vec<SubtitleSegment> {
    if translated_segments.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&SubtitleSegment> = translated_segments.iter().collect();
    sorted.sort_by_key(|s| s.index);

    sorted
        .into_iter()
        .enumerate()
        .map(|(i, segment)| SubtitleSegment {
            index: i as u32 + 1,
            start_time: segment.start_time.clone(),
            end_time: segment.end_time.clone(),
            text: segment.text.clone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
