//! HTML parsing infrastructure for Amazon product pages
//!
//! Trait-based parsing with tolerant, per-field extraction: a missing
//! element never aborts the other lookups.

pub mod condition_detector;
pub mod config;
pub mod context;
pub mod error;
pub mod product_detail_parser;

// Re-export public types
pub use condition_detector::ConditionDetector;
pub use config::ProductPageSelectors;
pub use context::DetailParseContext;
pub use error::{ParsingError, ParsingResult};
pub use product_detail_parser::{ProductDetailParser, ProductPageData};

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Enhanced parser trait with context support
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output>;
}

/// Compile selector strings, skipping (and logging) invalid ones
///
/// Fails only when none of a non-empty list compiles.
pub fn compile_selectors(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    let mut selectors = Vec::with_capacity(selector_strings.len());
    let mut last_error = None;

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile {} selector '{}': {}", field, selector_str, e);
                last_error = Some(ParsingError::invalid_selector(selector_str, &e.to_string()));
            }
        }
    }

    if selectors.is_empty() {
        return Err(last_error.unwrap_or_else(|| ParsingError::NoSelectors { field: field.to_string() }));
    }
    Ok(selectors)
}

/// Text content with every text node trimmed and concatenated
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_invalid_selectors() {
        let selectors = compile_selectors("title", &["span#productTitle".to_string(), "[[[".to_string()]).unwrap();
        assert_eq!(selectors.len(), 1);
    }

    #[test]
    fn fails_when_nothing_compiles() {
        assert!(matches!(
            compile_selectors("title", &["[[[".to_string()]),
            Err(ParsingError::InvalidSelector { .. })
        ));
        assert!(matches!(compile_selectors("title", &[]), Err(ParsingError::NoSelectors { .. })));
    }

    #[test]
    fn strips_text_nodes() {
        let html = Html::parse_fragment("<span id=\"t\">\n   Cuffie   <b> Sony </b>\n</span>");
        let selector = Selector::parse("span#t").unwrap();
        let element = html.select(&selector).next().unwrap();
        assert_eq!(stripped_text(element), "CuffieSony");
    }
}
