//! Link shortening through a YOURLS installation
//!
//! Shortening is best effort: every failure collapses into
//! `ShortenOutcome::Unchanged`, carrying the input URL and the reason.

#![allow(clippy::uninlined_format_args)]

use async_trait::async_trait;
use reqwest::ClientBuilder;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::infrastructure::config::ShortenerConfig;

const API_PATH: &str = "yourls-api.php";
const ALREADY_EXISTS_MARKER: &str = "already exists";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortenError {
    #[error("Shortening service unreachable: {0}")]
    Transport(String),

    #[error("Malformed shortening response: {0}")]
    MalformedResponse(String),

    #[error("Shortening rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenOutcome {
    /// Freshly created short link
    Created(String),
    /// Short link that already existed for this URL
    Existing(String),
    /// Shortening failed; `url` is the input, ready to use as-is
    Unchanged { url: String, reason: ShortenError },
}

impl ShortenOutcome {
    /// URL to hand back to the caller
    pub fn url(&self) -> &str {
        match self {
            Self::Created(url) | Self::Existing(url) | Self::Unchanged { url, .. } => url,
        }
    }

    pub fn into_url(self) -> String {
        match self {
            Self::Created(url) | Self::Existing(url) | Self::Unchanged { url, .. } => url,
        }
    }

    pub fn is_shortened(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}

#[async_trait]
pub trait LinkShortener: Send + Sync {
    async fn shorten(&self, url: &str) -> ShortenOutcome;
}

#[derive(Debug, Deserialize)]
struct YourlsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    shorturl: Option<String>,
    #[serde(default)]
    message: Option<String>,
    /// Object with `keyword` when the URL already exists; other shapes are ignored
    #[serde(default)]
    url: Option<Value>,
}

impl YourlsResponse {
    fn existing_keyword(&self) -> Option<&str> {
        self.url
            .as_ref()
            .and_then(|url| url.get("keyword"))
            .and_then(Value::as_str)
            .filter(|kw| !kw.is_empty())
    }
}

/// YOURLS client using the passwordless signature token
#[derive(Debug, Clone)]
pub struct YourlsShortener {
    base_url: String,
    signature: String,
    timeout: Duration,
}

impl YourlsShortener {
    pub fn new(config: &ShortenerConfig) -> Self {
        Self {
            base_url: config.base().to_string(),
            signature: config.signature.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/{}", self.base_url, API_PATH)
    }

    async fn request(&self, url: &str) -> Result<ShortenOutcome, ShortenError> {
        let client = ClientBuilder::new()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ShortenError::Transport(e.to_string()))?;

        let form = [
            ("signature", self.signature.as_str()),
            ("action", "shorturl"),
            ("format", "json"),
            ("url", url),
        ];

        // YOURLS answers duplicates with a 4xx and a JSON body, so the status code is not checked
        let response = client
            .post(self.api_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| ShortenError::Transport(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| ShortenError::Transport(e.to_string()))?;

        let parsed: YourlsResponse =
            serde_json::from_str(&body).map_err(|e| ShortenError::MalformedResponse(e.to_string()))?;

        if parsed.status.as_deref() == Some("success") {
            return parsed
                .shorturl
                .filter(|short| !short.is_empty())
                .map(ShortenOutcome::Created)
                .ok_or_else(|| ShortenError::MalformedResponse("success without shorturl".to_string()));
        }

        let message = parsed.message.clone().unwrap_or_default();
        if message.contains(ALREADY_EXISTS_MARKER) {
            if let Some(keyword) = parsed.existing_keyword() {
                return Ok(ShortenOutcome::Existing(format!("{}/{}", self.base_url, keyword)));
            }
        }

        Err(ShortenError::Rejected(message))
    }
}

#[async_trait]
impl LinkShortener for YourlsShortener {
    async fn shorten(&self, url: &str) -> ShortenOutcome {
        let url = url.replace("?&", "?");
        info!("Shortening: {}", url);

        match self.request(&url).await {
            Ok(outcome) => {
                info!("Shortened: {}", outcome.url());
                outcome
            }
            Err(reason) => {
                match &reason {
                    ShortenError::Transport(_) | ShortenError::MalformedResponse(_) => {
                        error!("Error shortening {}: {}", url, reason)
                    }
                    ShortenError::Rejected(_) => warn!("YOURLS error for {}: {}", url, reason),
                }
                ShortenOutcome::Unchanged { url, reason }
            }
        }
    }
}
