//! HTTP document fetching for product pages
//!
//! Every attempt builds its own reqwest client so that the User-Agent,
//! timeout and redirect policy belong to that attempt alone. No connection
//! pool outlives a request.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::ClientBuilder;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::infrastructure::config::ScraperConfig;

/// Request identity presented to the remote site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub user_agent: String,
}

impl ClientIdentity {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    /// Identities in configured order, blank entries skipped
    pub fn from_config(config: &ScraperConfig) -> Vec<Self> {
        config
            .user_agents
            .iter()
            .map(|ua| ua.trim())
            .filter(|ua| !ua.is_empty())
            .map(Self::new)
            .collect()
    }
}

/// Response of a single fetch attempt, whatever its status
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
    /// Address after redirects
    pub final_url: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of product page documents
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Single GET presenting `identity`; non-2xx statuses are returned, not raised
    async fn fetch_document(&self, url: &str, identity: &ClientIdentity) -> Result<FetchedPage, FetchError>;
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout per attempt
    pub timeout: Duration,
    pub accept: String,
    pub accept_language: String,
    /// Redirects followed before giving up
    pub max_redirects: usize,
}

impl HttpClientConfig {
    pub fn from_scraper_config(config: &ScraperConfig) -> Self {
        Self {
            timeout: config.timeout(),
            accept: config.accept.clone(),
            accept_language: config.accept_language.clone(),
            max_redirects: config.max_redirects,
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self::from_scraper_config(&ScraperConfig::default())
    }
}

/// reqwest-backed document fetcher
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    fn build_client(&self, identity: &ClientIdentity) -> Result<reqwest::Client, FetchError> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&self.config.accept)
            .map_err(|e| FetchError::Client(format!("invalid Accept header: {}", e)))?;
        let accept_language = HeaderValue::from_str(&self.config.accept_language)
            .map_err(|e| FetchError::Client(format!("invalid Accept-Language header: {}", e)))?;
        headers.insert(ACCEPT, accept);
        headers.insert(ACCEPT_LANGUAGE, accept_language);

        ClientBuilder::new()
            .timeout(self.config.timeout)
            .user_agent(identity.user_agent.as_str())
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .redirect(Policy::limited(self.config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))
    }
}

#[async_trait]
impl DocumentFetcher for HttpClient {
    async fn fetch_document(&self, url: &str, identity: &ClientIdentity) -> Result<FetchedPage, FetchError> {
        let client = self.build_client(identity)?;

        debug!("HTTP GET {} (UA: {})", url, identity.user_agent);
        let response = client.get(url).send().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        debug!("HTTP {} from {} ({} bytes)", status, final_url, body.len());
        Ok(FetchedPage { status, body, final_url })
    }
}
