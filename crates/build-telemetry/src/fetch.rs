// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Retrieval of status blobs from the blob store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::config::{normalize_blob_url, TelemetryConfig};
use crate::errors::{ConfigError, FetchError};
use crate::event::JobId;

/// Source of raw status blobs, keyed by job.
#[async_trait]
pub trait BlobFetcher: Send + Sync {
    async fn fetch(&self, job_id: &JobId) -> Result<Vec<u8>, FetchError>;
}

/// Base URL of the blob store. Status blobs live under `status/<job_id>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUrl(Url);

impl BlobUrl {
    pub fn new(base: &str) -> Result<Self, ConfigError> {
        let normalized = normalize_blob_url(base);
        Url::parse(&normalized)
            .map(Self)
            .map_err(|e| ConfigError::InvalidConfig(format!("Invalid blob url '{base}': {e}")))
    }

    pub fn status_url(&self, job_id: &JobId) -> Result<Url, FetchError> {
        self.0
            .join(&format!("status/{job_id}.json"))
            .map_err(|e| FetchError::Url {
                job_id: job_id.to_string(),
                reason: e.to_string(),
            })
    }
}

pub fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(proxy) = proxy_url {
        let proxy = reqwest::Proxy::https(proxy).map_err(|e| FetchError::Client(e.to_string()))?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(|e| FetchError::Client(e.to_string()))
}

/// Fetches status blobs over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBlobFetcher {
    client: reqwest::Client,
    blob_url: BlobUrl,
}

impl HttpBlobFetcher {
    pub fn new(client: reqwest::Client, blob_url: BlobUrl) -> Self {
        Self { client, blob_url }
    }

    pub fn from_config(config: &TelemetryConfig) -> Result<Self, FetchError> {
        let blob_url =
            BlobUrl::new(&config.blob_url).map_err(|e| FetchError::Client(e.to_string()))?;
        let client = build_client(config.https_proxy.as_deref(), config.timeout)?;
        Ok(Self::new(client, blob_url))
    }
}

#[async_trait]
impl BlobFetcher for HttpBlobFetcher {
    async fn fetch(&self, job_id: &JobId) -> Result<Vec<u8>, FetchError> {
        let url = self.blob_url.status_url(job_id)?;
        debug!("Fetching status blob from {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!("Fetched {} bytes from {url}", body.len());
        Ok(body.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mockito::Server;

    fn job(id: &str) -> JobId {
        JobId::new(id).unwrap()
    }

    #[test]
    fn test_status_url() {
        let blob_url = BlobUrl::new("https://blobs.example.com/builds").unwrap();
        assert_eq!(
            blob_url.status_url(&job("abc123")).unwrap().as_str(),
            "https://blobs.example.com/builds/status/abc123.json"
        );
    }

    #[test]
    fn test_invalid_blob_url() {
        assert!(BlobUrl::new("blobs without scheme").is_err());
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/status/job-1.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let fetcher = HttpBlobFetcher::new(
            build_client(None, Duration::from_secs(5)).unwrap(),
            BlobUrl::new(&server.url()).unwrap(),
        );
        let body = fetcher.fetch(&job("job-1")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn test_fetch_non_ok_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/status/missing.json")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpBlobFetcher::new(
            build_client(None, Duration::from_secs(5)).unwrap(),
            BlobUrl::new(&server.url()).unwrap(),
        );
        let err = fetcher.fetch(&job("missing")).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = HttpBlobFetcher::new(
            build_client(None, Duration::from_secs(5)).unwrap(),
            BlobUrl::new("http://127.0.0.1:1/").unwrap(),
        );
        let err = fetcher.fetch(&job("job-1")).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
