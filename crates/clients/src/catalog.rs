// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! A synchronous-feeling remote client over a third-party subtitle
//! catalog. Authenticates once, holds an opaque session token, and wraps
//! every remote call with the shared retry engine.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use parking_lot::Mutex;
use serde::Deserialize;
use subflow_core::retry::{retry_with_backoff, RetryPolicy};
use tracing::info;

use crate::error::CatalogError;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub storage_path: PathBuf,
    pub retry_policy: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCandidate {
    pub id: String,
    pub language: String,
    pub release_name: String,
    pub download_count: u32,
    /// ISO 8601 upload timestamp as reported by the catalog, kept as the
    /// raw string since it only ever needs to sort, not to be computed on.
    pub uploaded_at: String,
}

/// Picks the best candidate for `language` among a search result set:
/// highest download count, then most recent upload, then lowest catalog
/// id — the deterministic tiebreaker a non-interactive worker needs since
/// there is no human in the loop to choose among near-identical hits.
pub fn select_best_candidate<'a>(
    candidates: &'a [SubtitleCandidate],
    language: &str,
) -> Option<&'a SubtitleCandidate> {
    candidates
        .iter()
        .filter(|c| c.language == language)
        .max_by(|a, b| {
            a.download_count
                .cmp(&b.download_count)
                .then_with(|| a.uploaded_at.cmp(&b.uploaded_at))
                .then_with(|| b.id.cmp(&a.id))
        })
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn connect(&self) -> Result<(), CatalogError>;
    async fn disconnect(&self);
    async fn search(
        &self,
        imdb_id: Option<&str>,
        query: Option<&str>,
        languages: &[String],
    ) -> Result<Vec<SubtitleCandidate>, CatalogError>;
    async fn search_by_hash(
        &self,
        movie_hash: &str,
        file_size: u64,
        languages: &[String],
    ) -> Result<Vec<SubtitleCandidate>, CatalogError>;
    async fn download(
        &self,
        subtitle_id: &str,
        output_path: Option<PathBuf>,
    ) -> Result<PathBuf, CatalogError>;
}

#[derive(Deserialize)]
struct LoginResponse {
    status: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    data: Vec<SearchResultEntry>,
}

#[derive(Deserialize)]
struct SearchResultEntry {
    #[serde(rename = "IDSubtitleFile")]
    id: String,
    #[serde(rename = "SubLanguageID")]
    language: String,
    #[serde(rename = "SubFileName", default)]
    release_name: String,
    #[serde(rename = "SubDownloadsCnt", default)]
    download_count: u32,
    #[serde(rename = "SubAddDate", default)]
    uploaded_at: String,
}

#[derive(Deserialize)]
struct DownloadResponse {
    status: String,
    #[serde(default)]
    data: Vec<DownloadResultEntry>,
}

#[derive(Deserialize)]
struct DownloadResultEntry {
    data: String,
}

pub struct OpenSubtitlesClient {
    config: CatalogConfig,
    http: reqwest::Client,
    token: Mutex<Option<String>>,
}

impl OpenSubtitlesClient {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config, http: reqwest::Client::new(), token: Mutex::new(None) }
    }

    fn token(&self) -> Result<String, CatalogError> {
        self.token.lock().clone().ok_or(CatalogError::NotAuthenticated)
    }

    async fn authenticate_once(&self) -> Result<(), CatalogError> {
        let response: LoginResponse = self
            .http
            .post(format!("{}/login", self.config.base_url))
            .json(&serde_json::json!({
                "username": self.config.username,
                "password": self.config.password,
                "user_agent": self.config.user_agent,
            }))
            .send()
            .await
            .map_err(|e| CatalogError::Api(e.to_string()))?
            .json()
            .await
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

        if response.status != "200 OK" {
            return Err(CatalogError::Authentication(response.status));
        }
        let token = response.token.ok_or_else(|| {
            CatalogError::Authentication("no token in response".to_string())
        })?;
        *self.token.lock() = Some(token);
        Ok(())
    }

    async fn search_inner(
        &self,
        criteria: serde_json::Value,
    ) -> Result<Vec<SubtitleCandidate>, CatalogError> {
        let token = self.token()?;
        let response: SearchResponse = self
            .http
            .post(format!("{}/search", self.config.base_url))
            .json(&serde_json::json!({ "token": token, "criteria": criteria }))
            .send()
            .await
            .map_err(|e| CatalogError::Api(e.to_string()))?
            .json()
            .await
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

        if response.status != "200 OK" {
            return Err(CatalogError::Api(response.status));
        }

        Ok(response
            .data
            .into_iter()
            .map(|entry| SubtitleCandidate {
                id: entry.id,
                language: entry.language,
                release_name: entry.release_name,
                download_count: entry.download_count,
                uploaded_at: entry.uploaded_at,
            })
            .collect())
    }
}

#[async_trait]
impl CatalogClient for OpenSubtitlesClient {
    async fn connect(&self) -> Result<(), CatalogError> {
        if self.config.username.is_empty() || self.config.password.is_empty() {
            return Err(CatalogError::Authentication(
                "no valid credentials provided (need username and password)".into(),
            ));
        }
        retry_with_backoff(&self.config.retry_policy, "catalog_connect", || {
            self.authenticate_once()
        })
        .await?;
        info!("catalog client connected");
        Ok(())
    }

    async fn disconnect(&self) {
        *self.token.lock() = None;
        info!("catalog client disconnected");
    }

    async fn search(
        &self,
        imdb_id: Option<&str>,
        query: Option<&str>,
        languages: &[String],
    ) -> Result<Vec<SubtitleCandidate>, CatalogError> {
        let mut criteria = serde_json::Map::new();
        if let Some(id) = imdb_id {
            criteria.insert("imdbid".into(), serde_json::json!(id));
        }
        if let Some(q) = query {
            criteria.insert("query".into(), serde_json::json!(q));
        }
        if !languages.is_empty() {
            criteria.insert("sublanguageid".into(), serde_json::json!(languages.join(",")));
        }
        if criteria.is_empty() {
            return Ok(Vec::new());
        }

        retry_with_backoff(&self.config.retry_policy, "catalog_search", || {
            self.search_inner(serde_json::Value::Object(criteria.clone()))
        })
        .await
    }

    async fn search_by_hash(
        &self,
        movie_hash: &str,
        file_size: u64,
        languages: &[String],
    ) -> Result<Vec<SubtitleCandidate>, CatalogError> {
        let mut criteria = serde_json::Map::new();
        criteria.insert("moviehash".into(), serde_json::json!(movie_hash));
        criteria.insert("moviebytesize".into(), serde_json::json!(file_size.to_string()));
        if !languages.is_empty() {
            criteria.insert("sublanguageid".into(), serde_json::json!(languages.join(",")));
        }

        retry_with_backoff(&self.config.retry_policy, "catalog_search_by_hash", || {
            self.search_inner(serde_json::Value::Object(criteria.clone()))
        })
        .await
    }

    async fn download(
        &self,
        subtitle_id: &str,
        output_path: Option<PathBuf>,
    ) -> Result<PathBuf, CatalogError> {
        let token = self.token()?;
        let do_download = || async {
            let response: DownloadResponse = self
                .http
                .post(format!("{}/download", self.config.base_url))
                .json(&serde_json::json!({ "token": token, "subtitle_ids": [subtitle_id] }))
                .send()
                .await
                .map_err(|e| CatalogError::Api(e.to_string()))?
                .json()
                .await
                .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

            if response.status != "200 OK" {
                return Err(CatalogError::Api(response.status));
            }
            let entry = response
                .data
                .into_iter()
                .next()
                .ok_or_else(|| CatalogError::MalformedResponse("no subtitle data in response".into()))?;
            Ok(entry.data)
        };

        let encoded: String =
            retry_with_backoff(&self.config.retry_policy, "catalog_download", do_download).await?;

        let compressed = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;
        let mut decoder = flate2::read::GzDecoder::new(&compressed[..]);
        let mut content = Vec::new();
        decoder.read_to_end(&mut content)?;

        let final_path = output_path.unwrap_or_else(|| {
            self.config.storage_path.join(format!("{subtitle_id}.srt"))
        });
        if let Some(parent) = final_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&final_path, content).await?;
        info!(path = %final_path.display(), "downloaded subtitle");
        Ok(final_path)
    }
}

pub fn default_output_path(storage_path: &Path, subtitle_id: &str) -> PathBuf {
    storage_path.join(format!("{subtitle_id}.srt"))
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// In-process stand-in for [`OpenSubtitlesClient`] used by download
    /// worker and orchestrator tests.
    pub struct FakeCatalogClient {
        pub connected: AtomicBool,
        pub candidates: Mutex<Vec<SubtitleCandidate>>,
        pub fail_connect: bool,
    }

    impl FakeCatalogClient {
        pub fn new(candidates: Vec<SubtitleCandidate>) -> Self {
            Self { connected: AtomicBool::new(false), candidates: Mutex::new(candidates), fail_connect: false }
        }

        pub fn failing_to_connect() -> Self {
            Self { connected: AtomicBool::new(false), candidates: Mutex::new(Vec::new()), fail_connect: true }
        }
    }

    #[async_trait]
    impl CatalogClient for FakeCatalogClient {
        async fn connect(&self) -> Result<(), CatalogError> {
            if self.fail_connect {
                return Err(CatalogError::Authentication("fake auth failure".into()));
            }
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn disconnect(&self) {
            self.connected.store(false, Ordering::SeqCst);
        }

        async fn search(
            &self,
            _imdb_id: Option<&str>,
            _query: Option<&str>,
            _languages: &[String],
        ) -> Result<Vec<SubtitleCandidate>, CatalogError> {
            Ok(self.candidates.lock().clone())
        }

        async fn search_by_hash(
            &self,
            _movie_hash: &str,
            _file_size: u64,
            _languages: &[String],
        ) -> Result<Vec<SubtitleCandidate>, CatalogError> {
            Ok(self.candidates.lock().clone())
        }

        async fn download(
            &self,
            subtitle_id: &str,
            output_path: Option<PathBuf>,
        ) -> Result<PathBuf, CatalogError> {
            let path = output_path.unwrap_or_else(|| PathBuf::from(format!("{subtitle_id}.srt")));
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, b"1\n00:00:01,000 --> 00:00:02,000\nfake subtitle\n").await?;
            Ok(path)
        }
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
