// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

use super::fake::FakeLanguageModelClient;
use super::*;

#[test]
fn build_translation_prompt_numbers_each_segment() {
    let texts = vec!["hello".to_string(), "world".to_string()];
    let prompt = build_translation_prompt(&texts, "English", "Spanish");
    assert!(prompt.contains("[1]\nhello"));
    assert!(prompt.contains("[2]\nworld"));
    assert!(prompt.contains("2 subtitle segments"));
}

#[test]
fn parse_translation_response_exact_match() {
    let response = "[1]\nHola\n\n[2]\nMundo";
    let (translations, parsed) = parse_translation_response(response, 2).unwrap();
    assert_eq!(translations, vec!["Hola", "Mundo"]);
    assert!(parsed.is_none());
}

#[test]
fn parse_translation_response_tolerates_one_missing() {
    let response = "[1]\nHola";
    let (translations, parsed) = parse_translation_response(response, 2).unwrap();
    assert_eq!(translations, vec!["Hola"]);
    assert_eq!(parsed, Some(vec![1]));
}

#[test]
fn parse_translation_response_errors_on_two_missing() {
    let response = "[1]\nHola";
    let err = parse_translation_response(response, 3).unwrap_err();
    assert!(matches!(err, LmError::TranslationCountMismatch { expected: 3, actual: 1 }));
}

#[test]
fn parse_translation_response_skips_malformed_numbers() {
    let response = "[one]\nbad\n\n[1]\nHola";
    let (translations, _) = parse_translation_response(response, 1).unwrap();
    assert_eq!(translations, vec!["Hola"]);
}

#[tokio::test]
async fn fake_client_mirrors_mock_mode_output() {
    let client = FakeLanguageModelClient::new();
    let texts = vec!["hi".to_string()];
    let (translations, parsed) = client.translate_batch(&texts, "en", "es").await.unwrap();
    assert_eq!(translations, vec!["[TRANSLATED to es] hi"]);
    assert!(parsed.is_none());
}

#[tokio::test]
async fn fake_client_can_simulate_failure() {
    let client = FakeLanguageModelClient::failing(LmError::RateLimit("too fast".into()));
    let err = client.translate_batch(&["hi".to_string()], "en", "es").await.unwrap_err();
    assert!(matches!(err, LmError::RateLimit(_)));
}

#[test]
fn language_name_falls_back_to_code_for_unknown() {
    assert_eq!(language_name("xx"), "xx");
    assert_eq!(language_name("en"), "English");
}
