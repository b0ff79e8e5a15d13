// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::*;

#[test]
fn routing_key_matches_wire_string() {
    assert_eq!(EventType::SubtitleDownloadCompleted.routing_key(), "subtitle.download.completed");
    assert_eq!(EventType::JobFailed.routing_key(), "job.failed");
    assert_eq!(EventType::MediaFileDetected.routing_key(), "media.file.detected");
}

#[test]
fn lifecycle_event_round_trips_through_json() {
    let event = LifecycleEvent::new(EventType::SubtitleTranslateCompleted, JobId::new(), 123, "translation_worker");
    let json = serde_json::to_string(&event).unwrap();
    let back: LifecycleEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(back.event_type, EventType::SubtitleTranslateCompleted);
    assert_eq!(back.source_component, "translation_worker");
}

#[test]
fn event_type_serializes_as_snake_case_tag() {
    let json = serde_json::to_value(EventType::SubtitleDownloadFailed).unwrap();
    assert_eq!(json, serde_json::json!("subtitle_download_failed"));
}
