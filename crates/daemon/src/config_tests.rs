// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use std::io::Write;

use super::*;

#[test]
fn missing_file_falls_back_to_defaults() {
    let config = load_translation_config(Path::new("/nonexistent/subflow.toml")).unwrap();
    assert_eq!(config.translation_max_tokens_per_chunk, 8000);
    assert_eq!(config.translation_token_safety_margin, 0.8);
    assert_eq!(config.translation_max_segments_per_chunk, 100);
    assert_eq!(config.core.duplicate_prevention_window_seconds, 3600);
}

#[test]
fn toml_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [core]
        redis_url = "redis://example.test:6379"

        [translation]
        translation_parallel_requests = 8
        "#
    )
    .unwrap();

    let config = load_translation_config(file.path()).unwrap();
    assert_eq!(config.core.redis_url, "redis://example.test:6379");
    assert_eq!(config.translation_parallel_requests, 8);
    assert_eq!(config.translation_max_tokens_per_chunk, 8000, "unset fields keep their default");
}

#[test]
#[serial_test::serial(subflow_env)]
fn env_var_overrides_file_and_default() {
    std::env::set_var("SUBFLOW_TRANSLATION__PARALLEL_REQUESTS", "3");
    let config = load_translation_config(Path::new("/nonexistent/subflow.toml")).unwrap();
    std::env::remove_var("SUBFLOW_TRANSLATION__PARALLEL_REQUESTS");
    assert_eq!(config.translation_parallel_requests, 3);
}

#[test]
fn zero_parallel_requests_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[translation]\ntranslation_parallel_requests = 0").unwrap();
    let err = load_translation_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn safety_margin_out_of_range_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[translation]\ntranslation_token_safety_margin = 1.5").unwrap();
    let err = load_translation_config(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn download_config_falls_back_to_defaults() {
    let config = load_download_config(Path::new("/nonexistent/subflow.toml")).unwrap();
    assert_eq!(config.catalog_retry_max_retries, 3);
    assert_eq!(config.core.shutdown_timeout_secs, 30);
}
