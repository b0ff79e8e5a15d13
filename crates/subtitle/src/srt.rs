// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Parser and formatter for the SRT subtitle format.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::segment::SubtitleSegment;

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{2}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2}),(\d{3})")
            .expect("static timestamp regex is valid")
    })
}

/// Parse SRT content into segments, skipping malformed entries rather than
/// failing the whole file. A strict parser would reject perfectly watchable
/// subtitle files over one corrupted cue.
pub fn parse(content: &str) -> Vec<SubtitleSegment> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.trim().lines().collect();
    let mut segments = Vec::new();

    let mut i = 0usize;
    while i < lines.len() {
        if lines[i].trim().is_empty() {
            i += 1;
            continue;
        }

        let index: u32 = match lines[i].trim().parse() {
            Ok(n) => n,
            Err(_) => {
                warn!(line = i, "error parsing segment index");
                i += 1;
                continue;
            }
        };
        i += 1;
        if i >= lines.len() {
            break;
        }

        let caps = match timestamp_pattern().captures(lines[i]) {
            Some(c) => c,
            None => {
                warn!(line = i, text = lines[i], "invalid timestamp format");
                i += 1;
                continue;
            }
        };
        let start_time = format!("{}:{}:{},{}", &caps[1], &caps[2], &caps[3], &caps[4]);
        let end_time = format!("{}:{}:{},{}", &caps[5], &caps[6], &caps[7], &caps[8]);
        i += 1;

        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i].trim());
            i += 1;
        }

        if !text_lines.is_empty() {
            segments.push(SubtitleSegment {
                index,
                start_time,
                end_time,
                text: text_lines.join("\n"),
            });
        }
    }

    info!(count = segments.len(), "parsed subtitle segments");
    segments
}

/// Format segments back to SRT, one blank line between entries and a single
/// trailing newline.
pub fn format(segments: &[SubtitleSegment]) -> String {
    if segments.is_empty() {
        return String::new();
    }
    let body = segments
        .iter()
        .map(|s| s.to_string().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n\n");
    debug!(count = segments.len(), "formatted subtitle segments");
    format!("{body}\n")
}

#[cfg(test)]
#[path = "srt_tests.rs"]
mod tests;
