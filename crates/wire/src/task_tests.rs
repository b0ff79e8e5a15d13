// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::*;

#[test]
fn download_task_round_trips_through_json() {
    let task = DownloadTask {
        job_id: JobId::new(),
        video_url: "https://x/video.mkv".into(),
        video_title: "Example".into(),
        language: "en".into(),
        preferred_sources: vec!["opensubtitles".into()],
    };
    let json = serde_json::to_string(&task).unwrap();
    let back: DownloadTask = serde_json::from_str(&json).unwrap();
    assert_eq!(back.job_id, task.job_id);
    assert_eq!(back.video_url, task.video_url);
    assert_eq!(back.preferred_sources, task.preferred_sources);
}

#[test]
fn translation_task_round_trips_through_json() {
    let task = TranslationTask {
        job_id: JobId::new(),
        subtitle_file_path: "/data/job.en.srt".into(),
        source_language: "en".into(),
        target_language: "es".into(),
    };
    let json = serde_json::to_string(&task).unwrap();
    let back: TranslationTask = serde_json::from_str(&json).unwrap();
    assert_eq!(back.subtitle_file_path, task.subtitle_file_path);
    assert_eq!(back.target_language, "es");
}

#[test]
fn download_task_defaults_preferred_sources_when_absent() {
    let json = serde_json::json!({
        "job_id": JobId::new().to_string(),
        "video_url": "https://x/video.mkv",
        "video_title": "Example",
        "language": "en",
    });
    let task: DownloadTask = serde_json::from_value(json).unwrap();
    assert!(task.preferred_sources.is_empty());
}
