// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Checkpointed, bounded-parallel chunk translation. One call handles a
//! whole translation task: split into chunks, resume from any matching
//! checkpoint, translate the remaining chunks concurrently under a
//! semaphore, persist progress, and merge the result back into one
//! sequentially-numbered segment list.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use subflow_clients::LanguageModelClient;
use subflow_core::JobId;
use subflow_storage::{Checkpoint, CheckpointFingerprint, CheckpointStore};
use subflow_subtitle::{
    extract_text_for_translation, merge_translated_chunks, merge_translations, split_subtitle_content, SplitOptions,
    SubtitleSegment,
};
use subflow_core::TokenCounter;

use crate::error::EngineError;

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub job_id: JobId,
    pub subtitle_file_path: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug, Clone)]
pub struct TranslationEngineConfig {
    pub split_options: SplitOptions,
    pub parallel_requests: usize,
    pub checkpoint_enabled: bool,
    pub cleanup_checkpoint_on_success: bool,
}

impl Default for TranslationEngineConfig {
    fn default() -> Self {
        Self {
            split_options: SplitOptions::new(8192),
            parallel_requests: 5,
            checkpoint_enabled: true,
            cleanup_checkpoint_on_success: true,
        }
    }
}

struct ResumeState {
    start_chunk_idx: usize,
    previously_completed: Vec<usize>,
    accumulated: Vec<SubtitleSegment>,
}

impl ResumeState {
    fn fresh() -> Self {
        Self { start_chunk_idx: 0, previously_completed: Vec::new(), accumulated: Vec::new() }
    }
}

async fn load_resume_state(
    checkpoint_store: &dyn CheckpointStore,
    request: &TranslationRequest,
    total_chunks: usize,
    enabled: bool,
) -> ResumeState {
    if !enabled {
        return ResumeState::fresh();
    }

    let Some(checkpoint) = checkpoint_store.load(&request.job_id, &request.target_language).await else {
        return ResumeState::fresh();
    };

    let fingerprint = CheckpointFingerprint {
        subtitle_file_path: request.subtitle_file_path.clone(),
        source_language: request.source_language.clone(),
        target_language: request.target_language.clone(),
    };

    if !checkpoint.matches(&fingerprint) {
        warn!(job_id = %request.job_id, "checkpoint metadata mismatch, starting fresh translation");
        return ResumeState::fresh();
    }
    if checkpoint.total_chunks != total_chunks {
        warn!(
            job_id = %request.job_id,
            checkpoint_chunks = checkpoint.total_chunks,
            current_chunks = total_chunks,
            "checkpoint chunk count doesn't match current split, starting fresh translation"
        );
        return ResumeState::fresh();
    }

    info!(
        job_id = %request.job_id,
        completed = checkpoint.completed_chunks.len(),
        total = checkpoint.total_chunks,
        "resuming translation from checkpoint"
    );

    ResumeState {
        start_chunk_idx: checkpoint.completed_chunks.len(),
        previously_completed: checkpoint.completed_chunks.into_iter().collect(),
        accumulated: checkpoint.translated_segments,
    }
}

async fn translate_one_chunk(
    chunk_idx: usize,
    chunk: Vec<SubtitleSegment>,
    total_chunks: usize,
    request: &TranslationRequest,
    lm_client: &dyn LanguageModelClient,
    semaphore: &Semaphore,
) -> Result<(usize, Vec<SubtitleSegment>), (usize, EngineError)> {
    let _permit = semaphore.acquire().await.expect("semaphore is never closed");

    info!(chunk = chunk_idx + 1, total = total_chunks, segments = chunk.len(), "translating chunk");
    let texts = extract_text_for_translation(&chunk);
    let (translations, parsed_segment_numbers) = lm_client
        .translate_batch(&texts, &request.source_language, &request.target_language)
        .await
        .map_err(|e| (chunk_idx, EngineError::from(e)))?;

    let translated = merge_translations(
        &chunk,
        &translations,
        Some(chunk_idx),
        Some(total_chunks),
        parsed_segment_numbers.as_deref(),
    )
    .map_err(|e| (chunk_idx, EngineError::from(e)))?;
    info!(chunk = chunk_idx + 1, total = total_chunks, "chunk translated");
    Ok((chunk_idx, translated))
}

/// Splits, resumes, translates, checkpoints, and merges. Returns the final
/// sequentially-numbered, fully-translated segment list.
pub async fn translate_with_checkpoint(
    segments: Vec<SubtitleSegment>,
    request: &TranslationRequest,
    lm_client: &dyn LanguageModelClient,
    checkpoint_store: &dyn CheckpointStore,
    token_counter: &TokenCounter,
    config: &TranslationEngineConfig,
) -> Result<Vec<SubtitleSegment>, EngineError> {
    let chunks = split_subtitle_content(&segments, &config.split_options, token_counter)?;

    let mut resume = load_resume_state(checkpoint_store, request, chunks.len(), config.checkpoint_enabled).await;

    let remaining: Vec<(usize, Vec<SubtitleSegment>)> =
        chunks.iter().cloned().enumerate().skip(resume.start_chunk_idx).collect();

    info!(
        job_id = %request.job_id,
        remaining = remaining.len(),
        parallel_requests = config.parallel_requests,
        "starting parallel translation batch"
    );

    let semaphore = Arc::new(Semaphore::new(config.parallel_requests.max(1)));
    let futures = remaining.into_iter().map(|(chunk_idx, chunk)| {
        let semaphore = Arc::clone(&semaphore);
        async move { translate_one_chunk(chunk_idx, chunk, chunks.len(), request, lm_client, &semaphore).await }
    });

    let results = join_all(futures).await;

    let mut succeeded = Vec::new();
    let mut failed: Vec<(usize, EngineError)> = Vec::new();
    for result in results {
        match result {
            Ok(pair) => succeeded.push(pair),
            Err(pair) => failed.push(pair),
        }
    }

    if !failed.is_empty() {
        failed.sort_by_key(|(chunk_idx, _)| *chunk_idx);
        let failed_indices: Vec<usize> = failed.iter().map(|(chunk_idx, _)| *chunk_idx).collect();
        warn!(job_id = %request.job_id, failed_chunks = ?failed_indices, "chunk translation batch failed");
        let (first_chunk, first_error) = failed.remove(0);
        return Err(EngineError::ChunkBatch {
            failed_count: failed.len() + 1,
            first_chunk,
            first_error: first_error.to_string(),
        });
    }

    succeeded.sort_by_key(|(chunk_idx, _)| *chunk_idx);
    let mut newly_completed = Vec::with_capacity(succeeded.len());
    for (chunk_idx, translated_chunk) in succeeded {
        resume.accumulated.extend(translated_chunk);
        newly_completed.push(chunk_idx);
    }

    if config.checkpoint_enabled {
        let mut completed_chunks = resume.previously_completed.clone();
        completed_chunks.extend(newly_completed);
        let mut checkpoint = Checkpoint::new(
            request.job_id,
            CheckpointFingerprint {
                subtitle_file_path: request.subtitle_file_path.clone(),
                source_language: request.source_language.clone(),
                target_language: request.target_language.clone(),
            },
            chunks.len(),
        );
        checkpoint.completed_chunks = completed_chunks.into_iter().collect();
        checkpoint.translated_segments = resume.accumulated.clone();
        checkpoint_store.save(&checkpoint, &request.target_language).await;
    }

    let merged = merge_translated_chunks(&resume.accumulated);
    info!(job_id = %request.job_id, segments = merged.len(), "translation merge complete");

    if config.cleanup_checkpoint_on_success && config.checkpoint_enabled {
        checkpoint_store.delete(&request.job_id, &request.target_language).await;
    }

    Ok(merged)
}

#[cfg(test)]
#[path = "translation_tests.rs"]
mod tests;
