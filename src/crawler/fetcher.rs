//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the pipeline, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests for listing pages
//! - Error classification into [`FetchError`]
//! - The optional fixed retry count

use crate::config::{CatalogConfig, PipelineConfig};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;

/// Source of listing page bodies
///
/// The pipeline only needs "URL in, body or failure out"; the production
/// implementation is [`HttpFetcher`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page and returns its decoded body
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `catalog` - Supplies the User-Agent header
/// * `pipeline` - Supplies the per-request timeout
///
/// # Example
///
/// ```no_run
/// use bookrank::config::Config;
/// use bookrank::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.catalog, &config.pipeline).unwrap();
/// ```
pub fn build_http_client(
    catalog: &CatalogConfig,
    pipeline: &PipelineConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(catalog.user_agent.as_str())
        .timeout(pipeline.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies any failure
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx with a decodable body | `Ok(body)` |
/// | Non-2xx status | `FetchError::Status` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection/DNS/TLS error | `FetchError::Network` |
/// | Body decode error | `FetchError::Decode` |
pub async fn fetch_url(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: e,
            }
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Decode {
                url: url.to_string(),
                source: e,
            }
        }
    })
}

/// reqwest-backed [`PageFetcher`]
///
/// A failed request is repeated `retries` more times, immediately and without
/// backoff; the last error is returned.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(client: Client, retries: u32) -> Self {
        Self { client, retries }
    }

    /// Builds the client from configuration
    pub fn from_config(
        catalog: &CatalogConfig,
        pipeline: &PipelineConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(catalog, pipeline)?;
        Ok(Self::new(client, pipeline.retries))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match fetch_url(&self.client, url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!("Retrying {} ({}/{}): {}", url, attempt, self.retries, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
