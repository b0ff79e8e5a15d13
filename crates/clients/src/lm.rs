// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! A chat-completions translation client. Runs in mock mode (no network
//! calls, deterministic `[TRANSLATED to {lang}] {text}` output) whenever no
//! API key is configured, so the rest of the pipeline can be exercised
//! without a live model backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use subflow_core::retry::{retry_with_backoff, RetryPolicy};
use tracing::{debug, info, warn};

use crate::error::LmError;

#[derive(Debug, Clone)]
pub struct LmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_completion_tokens: u32,
    pub temperature: f32,
    pub retry_policy: RetryPolicy,
}

impl LmConfig {
    pub fn is_mock_mode(&self) -> bool {
        self.api_key.is_none()
    }
}

/// Translations plus the 1-based segment numbers that were actually parsed
/// out of the response, when that differs from "all of them".
pub type TranslationResult = (Vec<String>, Option<Vec<u32>>);

#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslationResult, LmError>;
}

fn language_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "he" => "Hebrew",
        "hi" => "Hindi",
        "nl" => "Dutch",
        "pl" => "Polish",
        "tr" => "Turkish",
        other => return other.to_string(),
    }
    .to_string()
}

pub fn build_translation_prompt(texts: &[String], source_language: &str, target_language: &str) -> String {
    let numbered: Vec<String> =
        texts.iter().enumerate().map(|(i, text)| format!("[{}]\n{}", i + 1, text)).collect();

    format!(
        "Translate the following {count} subtitle segments from {source} to {target}.\n\n\
         TRANSLATION STYLE:\n\
         - Translate each subtitle as a complete sentence or phrase, not word-by-word\n\
         - Use natural, idiomatic expressions and figures of speech in {target}\n\
         - Adapt cultural references and idioms to be natural in {target}\n\
         - Maintain the original meaning and tone while making it sound natural in {target}\n\
         - Keep translations concise and suitable for subtitle display (readable in 2-3 seconds)\n\n\
         FORMATTING REQUIREMENTS:\n\
         - Preserve all HTML tags (like <i>, <b>, <u>, etc.) exactly as they appear\n\
         - Only translate the text content inside the tags, not the tags themselves\n\
         - Preserve line breaks and formatting structure\n\n\
         Return ONLY the translations, numbered the same way, with no additional commentary.\n\n\
         Format your response exactly like this:\n\
         [1]\nNatural translation with preserved HTML tags\n\n\
         [2]\nNatural translation with preserved HTML tags\n\n\
         etc.\n\n\
         Subtitles to translate:\n\n{body}",
        count = texts.len(),
        source = source_language,
        target = target_language,
        body = numbered.join("\n\n"),
    )
}

fn system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "You are a professional subtitle translator specializing in natural, idiomatic \
         translations from {source_language} to {target_language}. Your translations should:\n\
         - Translate complete sentences and phrases naturally, not word-by-word\n\
         - Use appropriate figures of speech and idiomatic expressions in {target_language}\n\
         - Adapt cultural references to be natural in {target_language}\n\
         - Maintain the original meaning, tone, and style\n\
         - Be concise and readable within 2-3 seconds (suitable for subtitles)\n\
         - Preserve all HTML tags (like <i>, <b>, <u>, etc.) exactly as they appear\n\
         - Only translate the text content inside tags, keeping tags unchanged"
    )
}

/// Parses a GPT-shaped `[n]\ntext` response. Tolerates exactly one missing
/// translation; more than that is a [`LmError::TranslationCountMismatch`],
/// which is retried since the same batch frequently succeeds the next time.
pub fn parse_translation_response(response: &str, expected_count: usize) -> Result<TranslationResult, LmError> {
    let mut translations = Vec::new();
    let mut parsed_segment_numbers = Vec::new();

    for segment in response.split('[') {
        if segment.trim().is_empty() {
            continue;
        }
        let Some((number_part, text_part)) = segment.split_once(']') else {
            continue;
        };
        let Ok(segment_number) = number_part.trim().parse::<u32>() else {
            continue;
        };
        translations.push(text_part.trim().to_string());
        parsed_segment_numbers.push(segment_number);
    }

    if translations.len() != expected_count {
        let missing = expected_count.saturating_sub(translations.len());
        if missing == 1 {
            warn!(
                expected = expected_count,
                parsed = translations.len(),
                "translation parsing: missing 1 segment, using original text as fallback"
            );
            return Ok((translations, Some(parsed_segment_numbers)));
        }

        debug!(response_sample = %sample_for_log(response), "unparseable translation response");
        warn!(
            expected = expected_count,
            parsed = translations.len(),
            missing,
            "translation parsing mismatch"
        );
        return Err(LmError::TranslationCountMismatch { expected: expected_count, actual: translations.len() });
    }

    Ok((translations, None))
}

fn sample_for_log(response: &str) -> String {
    if response.len() > 1000 {
        format!("{}...\n...{}", &response[..500], &response[response.len() - 500..])
    } else {
        response.to_string()
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    completion_tokens: u32,
    completion_tokens_details: Option<CompletionTokensDetails>,
}

#[derive(Deserialize)]
struct CompletionTokensDetails {
    reasoning_tokens: Option<u32>,
}

pub struct OpenAiClient {
    config: LmConfig,
    http: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: LmConfig) -> Self {
        if config.is_mock_mode() {
            warn!("language model API key not configured - translator will run in mock mode");
        } else {
            info!(model = %config.model, "language model client initialized");
        }
        Self { config, http: reqwest::Client::new() }
    }

    async fn call_once(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslationResult, LmError> {
        let source_name = language_name(source_language);
        let target_name = language_name(target_language);
        let prompt = build_translation_prompt(texts, &source_name, &target_name);
        let system = system_prompt(&source_name, &target_name);

        if texts.len() > 300 {
            warn!(segments = texts.len(), "very large translation chunk, may hit token limits");
        }

        let api_key =
            self.config.api_key.as_ref().ok_or_else(|| LmError::Authentication("no API key configured".into()))?;

        let temperature = if self.config.model.to_lowercase().contains("nano") {
            None
        } else {
            Some(self.config.temperature)
        };

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: &system },
                ChatMessage { role: "user", content: &prompt },
            ],
            max_completion_tokens: self.config.max_completion_tokens,
            temperature,
        };

        let response: ChatResponse = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LmError::Api(e.to_string()))?
            .json()
            .await
            .map_err(|e| LmError::MalformedResponse(e.to_string()))?;

        let choice =
            response.choices.into_iter().next().ok_or_else(|| LmError::MalformedResponse("no choices".into()))?;
        let content = choice.message.content;

        if choice.finish_reason.as_deref() == Some("length") {
            match &content {
                None => return Err(truncated_empty_error(texts.len(), response.usage)),
                Some(_) => warn!("response truncated (finish_reason=length), may be incomplete"),
            }
        } else if content.is_none() {
            return Err(LmError::MalformedResponse("empty content".into()));
        }

        let content = content.ok_or_else(|| LmError::MalformedResponse("empty content".into()))?;
        parse_translation_response(&content, texts.len())
    }
}

fn truncated_empty_error(chunk_size: usize, usage: Option<ChatUsage>) -> LmError {
    if let Some(usage) = usage {
        if let Some(reasoning) = usage.completion_tokens_details.and_then(|d| d.reasoning_tokens) {
            if usage.completion_tokens > 0 && reasoning as f64 >= usage.completion_tokens as f64 * 0.9 {
                return LmError::MalformedResponse(format!(
                    "response truncated: {reasoning}/{} completion tokens spent on reasoning, \
                     consider raising max_completion_tokens or reducing chunk size (current {chunk_size})",
                    usage.completion_tokens
                ));
            }
        }
    }
    LmError::MalformedResponse(format!(
        "response truncated (finish_reason=length) with empty content, chunk size {chunk_size}"
    ))
}

#[async_trait]
impl LanguageModelClient for OpenAiClient {
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslationResult, LmError> {
        if self.config.is_mock_mode() {
            warn!("mock mode: returning original texts with [TRANSLATED] prefix");
            let translations =
                texts.iter().map(|text| format!("[TRANSLATED to {target_language}] {text}")).collect();
            return Ok((translations, None));
        }

        retry_with_backoff(&self.config.retry_policy, "lm_translate_batch", || {
            self.call_once(texts, source_language, target_language)
        })
        .await
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;

    /// Deterministic in-process stand-in matching [`OpenAiClient`]'s mock
    /// mode output, for engine and worker tests.
    pub struct FakeLanguageModelClient {
        pub fail_with: Option<LmError>,
    }

    impl FakeLanguageModelClient {
        pub fn new() -> Self {
            Self { fail_with: None }
        }

        pub fn failing(error: LmError) -> Self {
            Self { fail_with: Some(error) }
        }
    }

    impl Default for FakeLanguageModelClient {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl LanguageModelClient for FakeLanguageModelClient {
        async fn translate_batch(
            &self,
            texts: &[String],
            _source_language: &str,
            target_language: &str,
        ) -> Result<TranslationResult, LmError> {
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }
            let translations =
                texts.iter().map(|text| format!("[TRANSLATED to {target_language}] {text}")).collect();
            Ok((translations, None))
        }
    }
}

#[cfg(test)]
#[path = "lm_tests.rs"]
mod tests;
