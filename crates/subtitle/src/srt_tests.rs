// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::*;

const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n2\n00:00:03,000 --> 00:00:04,000\nSecond line\n";

#[test]
fn parse_reads_two_segments() {
    let segments = parse(SAMPLE);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].index, 1);
    assert_eq!(segments[0].start_time, "00:00:01,000");
    assert_eq!(segments[0].end_time, "00:00:02,500");
    assert_eq!(segments[0].text, "Hello there");
    assert_eq!(segments[1].index, 2);
}

#[test]
fn parse_strips_bom() {
    let with_bom = format!("\u{feff}{SAMPLE}");
    assert_eq!(parse(&with_bom).len(), parse(SAMPLE).len());
}

#[test]
fn parse_joins_multiline_text() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nLine one\nLine two\n";
    let segments = parse(content);
    assert_eq!(segments[0].text, "Line one\nLine two");
}

#[test]
fn parse_skips_segment_with_malformed_timestamp() {
    let content = "1\nnot a timestamp\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nValid\n";
    let segments = parse(content);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].index, 2);
}

#[test]
fn parse_skips_entry_with_no_text() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nValid\n";
    let segments = parse(content);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].index, 2);
}

#[test]
fn parse_empty_content_yields_no_segments() {
    assert!(parse("").is_empty());
}

#[test]
fn format_round_trips_single_segment() {
    let segments = parse(SAMPLE);
    let formatted = format(&segments);
    assert_eq!(parse(&formatted), segments);
}

#[test]
fn format_empty_segments_is_empty_string() {
    assert_eq!(format(&[]), "");
}

#[test]
fn format_has_no_trailing_blank_line() {
    let segments = parse(SAMPLE);
    let formatted = format(&segments);
    assert!(!formatted.ends_with("\n\n"));
    assert!(formatted.ends_with('\n'));
}
