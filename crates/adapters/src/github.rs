// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TypeSpec sources fetched from a GitHub repository at a fixed commit.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("sg/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {status}")]
    Status { status: reqwest::StatusCode },

    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to deserialize GitHub API response: {0}")]
    Deserialize(#[source] serde_json::Error),

    #[error("Failed to download file {name}: {reason}")]
    Download { name: String, reason: String },

    #[error("GitHub download was cancelled")]
    Cancelled,
}

/// One entry of a contents API directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ContentEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Clone)]
pub struct GitHubSource {
    client: Client,
    api_url: String,
    repository: String,
    token: Option<String>,
}

impl GitHubSource {
    /// `repository` is `owner/name`.
    pub fn new(repository: &str, token: Option<String>) -> Result<Self, GitHubError> {
        Self::with_api_url(DEFAULT_API_URL, repository, token)
    }

    pub fn with_api_url(
        api_url: &str,
        repository: &str,
        token: Option<String>,
    ) -> Result<Self, GitHubError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn contents_url(&self, dir: &str, commit: &str) -> String {
        format!("{}/repos/{}/contents/{}?ref={}", self.api_url, self.repository, dir, commit)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Download the `.tsp` files directly inside `dir` at `commit`, keyed by
    /// file name. Empty files are kept.
    pub async fn fetch_typespec_files(
        &self,
        commit: &str,
        dir: &str,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, String>, GitHubError> {
        let url = self.contents_url(dir, commit);
        tracing::info!(repository = %self.repository, %dir, %commit, "fetching TypeSpec files from GitHub");

        let listing = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(GitHubError::Cancelled),
            listing = self.list(&url) => listing?,
        };

        let mut files = BTreeMap::new();
        for (name, download_url) in typespec_downloads(listing) {
            let content = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(GitHubError::Cancelled),
                content = self.download(&name, &download_url) => content?,
            };
            files.insert(name, content);
        }
        tracing::info!(files = files.len(), "downloaded TypeSpec files");
        Ok(files)
    }

    async fn list(&self, url: &str) -> Result<Vec<ContentEntry>, GitHubError> {
        let response = self
            .authorized(self.client.get(url))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GitHubError::Status { status });
        }
        let body = response.text().await?;
        parse_listing(&body)
    }

    async fn download(&self, name: &str, url: &str) -> Result<String, GitHubError> {
        let failed = |reason: String| GitHubError::Download { name: name.to_string(), reason };
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(status.to_string()));
        }
        response.text().await.map_err(|e| failed(e.to_string()))
    }
}

pub(crate) fn parse_listing(body: &str) -> Result<Vec<ContentEntry>, GitHubError> {
    serde_json::from_str(body).map_err(GitHubError::Deserialize)
}

/// Files with a `.tsp` extension (any case) and a download URL.
pub(crate) fn typespec_downloads(listing: Vec<ContentEntry>) -> Vec<(String, String)> {
    listing
        .into_iter()
        .filter(|entry| entry.kind == "file")
        .filter(|entry| {
            std::path::Path::new(&entry.name)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tsp"))
        })
        .filter_map(|entry| entry.download_url.map(|url| (entry.name, url)))
        .collect()
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
