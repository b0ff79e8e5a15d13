// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! subflow-clients: the two external-service clients the pipeline depends
//! on — a subtitle catalog and a chat-completions language model — each
//! behind a trait so the engine and workers can run against fakes in
//! tests without reaching the network.

pub mod catalog;
pub mod error;
pub mod lm;

pub use catalog::{select_best_candidate, CatalogClient, CatalogConfig, OpenSubtitlesClient, SubtitleCandidate};
pub use error::{CatalogError, LmError};
pub use lm::{LanguageModelClient, LmConfig, OpenAiClient, TranslationResult};

#[cfg(any(test, feature = "test-support"))]
pub use catalog::fake::FakeCatalogClient;
#[cfg(any(test, feature = "test-support"))]
pub use lm::fake::FakeLanguageModelClient;
