//! Conversion result and request-level errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::product::ProductInfo;

/// Outcome of a successful link conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub success: bool,
    pub original_url: String,
    pub affiliate_url: String,
    /// Shortened link, or the affiliate URL itself when shortening was
    /// skipped or degraded
    pub short_url: String,
    pub product: ProductInfo,
}

/// Errors that fail a conversion request as a whole
///
/// Scraping and shortening problems never show up here; those degrade to
/// placeholder values inside [`ConversionResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("URL non fornito")]
    InvalidInput,

    #[error("URL non è un link Amazon valido")]
    NotAmazonUrl,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConversionError {
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::NotAmazonUrl => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Message safe to hand back to callers
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Errore interno durante la conversione del link".to_string(),
            other => other.to_string(),
        }
    }
}
