//! HTTP page fetching.
//!
//! The crawler consumes fetching through the [`PageFetcher`] trait so tests
//! can substitute an in-memory fetcher; [`HttpFetcher`] is the production
//! implementation built on reqwest.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, header};

use sweep_core::Error;

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "a11ysweep/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "a11ysweep/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(10_000),
            max_redirects: 5,
        }
    }
}

/// Source of page content for the crawler and single-page validation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page and return its decoded body.
    async fn fetch(&self, url: &str) -> Result<String, Error>;
}

/// HTTP fetcher with timeout, redirect, and body-size limits.
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::FetchTimeout(format!("{url}: {e}"))
                } else {
                    Error::HttpError(format!("network error: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{len} bytes exceeds {}", self.config.max_bytes)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {e}")))?;

        if text.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{} bytes exceeds {}",
                text.len(),
                self.config.max_bytes
            )));
        }

        tracing::debug!(url, elapsed_ms = start.elapsed().as_millis() as u64, bytes = text.len(), "fetched page");

        Ok(text)
    }
}
