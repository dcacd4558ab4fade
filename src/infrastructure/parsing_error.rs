//! Parsing error types for product page extraction
//!
//! Field lookups on product pages are optional by nature, so most of these
//! errors are logged and then swallowed by the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ParsingError {
    #[error("Required field '{field}' not found in HTML")]
    RequiredFieldMissing {
        field: String,
        context: Option<String>,
    },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector {
        selector: String,
        reason: String,
    },

    #[error("No usable selectors configured for '{field}'")]
    NoSelectors { field: String },
}

impl ParsingError {
    /// Create a required field missing error with context
    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(ToString::to_string),
        }
    }

    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
