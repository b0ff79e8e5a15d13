// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::fake::FakeCatalogClient;
use super::*;
use subflow_core::{Classify, ErrorClass};

fn candidate(id: &str) -> SubtitleCandidate {
    candidate_with(id, "es", 10, "2024-01-01")
}

fn candidate_with(id: &str, language: &str, download_count: u32, uploaded_at: &str) -> SubtitleCandidate {
    SubtitleCandidate {
        id: id.to_string(),
        language: language.to_string(),
        release_name: "Movie.2024.1080p".into(),
        download_count,
        uploaded_at: uploaded_at.to_string(),
    }
}

#[test]
fn default_output_path_joins_storage_dir_and_id() {
    let path = default_output_path(Path::new("/data/subs"), "abc123");
    assert_eq!(path, PathBuf::from("/data/subs/abc123.srt"));
}

#[tokio::test]
async fn fake_client_connect_then_search_returns_candidates() {
    let client = FakeCatalogClient::new(vec![candidate("1"), candidate("2")]);
    client.connect().await.unwrap();
    let results = client.search(Some("tt123"), None, &["es".to_string()]).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn fake_client_failing_to_connect_surfaces_authentication_error() {
    let client = FakeCatalogClient::failing_to_connect();
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, CatalogError::Authentication(_)));
}

#[tokio::test]
async fn fake_client_download_writes_file_to_requested_path() {
    let dir = std::env::temp_dir().join(format!("subflow-catalog-test-{}", std::process::id()));
    let client = FakeCatalogClient::new(vec![]);
    let target = dir.join("out.srt");
    let path = client.download("1", Some(target.clone())).await.unwrap();
    assert_eq!(path, target);
    assert!(tokio::fs::read(&target).await.unwrap().len() > 0);
    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[test]
fn not_authenticated_classifies_as_permanent() {
    assert_eq!(CatalogError::NotAuthenticated.class(), ErrorClass::Permanent);
}

#[test]
fn select_best_candidate_prefers_highest_download_count() {
    let candidates = vec![
        candidate_with("1", "es", 5, "2024-01-01"),
        candidate_with("2", "es", 50, "2024-01-01"),
        candidate_with("3", "es", 20, "2024-01-01"),
    ];
    let best = select_best_candidate(&candidates, "es").unwrap();
    assert_eq!(best.id, "2");
}

#[test]
fn select_best_candidate_breaks_tie_by_most_recent_upload() {
    let candidates = vec![
        candidate_with("1", "es", 10, "2024-01-01"),
        candidate_with("2", "es", 10, "2024-06-01"),
    ];
    let best = select_best_candidate(&candidates, "es").unwrap();
    assert_eq!(best.id, "2");
}

#[test]
fn select_best_candidate_breaks_tie_by_lowest_id() {
    let candidates = vec![
        candidate_with("9", "es", 10, "2024-01-01"),
        candidate_with("2", "es", 10, "2024-01-01"),
    ];
    let best = select_best_candidate(&candidates, "es").unwrap();
    assert_eq!(best.id, "2");
}

#[test]
fn select_best_candidate_filters_by_language() {
    let candidates = vec![candidate_with("1", "en", 999, "2024-01-01")];
    assert!(select_best_candidate(&candidates, "es").is_none());
}
