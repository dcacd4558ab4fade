//! Product detail parser for Amazon product pages
//!
//! Each field is looked up independently through its own fallback selector
//! list, then narrowed with a regex where the raw text carries noise
//! (currency formatting, "su 5 stelle" suffixes).

#![allow(clippy::uninlined_format_args)]

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::condition_detector::ConditionDetector;
use super::config::ProductPageSelectors;
use super::context::DetailParseContext;
use super::{compile_selectors, stripped_text, ContextualParser, ParsingError, ParsingResult};
use crate::domain::product::ProductCondition;

static PRICE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d.,€$]+").expect("valid price pattern"));
static RATING_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\d,]+").expect("valid rating pattern"));

/// Fields pulled from one product page; only the title is required
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPageData {
    pub title: String,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub image: Option<String>,
    pub condition: ProductCondition,
}

/// Parser for extracting product metadata from product detail pages
pub struct ProductDetailParser {
    title_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    rating_selectors: Vec<Selector>,
    image_selectors: Vec<Selector>,
    condition_detector: ConditionDetector,
}

impl ProductDetailParser {
    /// Create a new product detail parser with default configuration
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ProductPageSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &ProductPageSelectors) -> ParsingResult<Self> {
        Ok(Self {
            title_selectors: compile_selectors("title", &selectors.title)?,
            price_selectors: compile_selectors("price", &selectors.price)?,
            rating_selectors: compile_selectors("rating", &selectors.rating)?,
            image_selectors: compile_selectors("image", &selectors.image)?,
            condition_detector: ConditionDetector::with_config(selectors)?,
        })
    }

    /// First non-empty stripped text among the selectors
    fn extract_text(html: &Html, field_name: &str, selectors: &[Selector]) -> Option<String> {
        for (i, selector) in selectors.iter().enumerate() {
            if let Some(element) = html.select(selector).next() {
                let text = stripped_text(element);
                if !text.is_empty() {
                    debug!("Extracted {} using selector {}: {}", field_name, i, text);
                    return Some(text);
                }
            }
        }
        None
    }

    fn extract_title(&self, html: &Html) -> Option<String> {
        Self::extract_text(html, "title", &self.title_selectors)
    }

    fn extract_price(&self, html: &Html) -> Option<String> {
        let text = Self::extract_text(html, "price", &self.price_selectors)?;
        PRICE_TOKEN.find(&text).map(|m| m.as_str().to_string())
    }

    fn extract_rating(&self, html: &Html) -> Option<String> {
        let text = Self::extract_text(html, "rating", &self.rating_selectors)?;
        RATING_TOKEN.find(&text).map(|m| m.as_str().to_string())
    }

    fn extract_image(&self, html: &Html) -> Option<String> {
        self.image_selectors
            .iter()
            .find_map(|selector| html.select(selector).next())
            .and_then(|img| {
                let attrs = img.value();
                attrs
                    .attr("src")
                    .or_else(|| attrs.attr("data-old-hires"))
                    .map(str::trim)
                    .filter(|src| !src.is_empty())
                    .map(ToString::to_string)
            })
    }
}

impl ContextualParser for ProductDetailParser {
    type Output = ProductPageData;
    type Context = DetailParseContext;

    /// Extract every field; fails only when the page has no product title
    ///
    /// Bot walls and captcha pages come back with a 200 but no title, so a
    /// missing title means "not a product page". The other fields are optional.
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> ParsingResult<Self::Output> {
        debug!("Parsing product page from: {}", context.url);

        let title = self
            .extract_title(html)
            .ok_or_else(|| ParsingError::required_field_missing("title", Some(&context.url)))?;

        let data = ProductPageData {
            title,
            price: self.extract_price(html),
            rating: self.extract_rating(html),
            image: self.extract_image(html),
            condition: self.condition_detector.detect(context, html),
        };

        debug!(
            "Parsed product page {} (identity: {}): title={:?} price={:?} rating={:?}",
            context.url,
            context.identity.as_deref().unwrap_or("-"),
            data.title,
            data.price,
            data.rating
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <span id="productTitle" class="a-size-large">
      Sony WH-1000XM5 Cuffie Wireless con Noise Cancelling
  </span>
  <div id="corePrice_feature_div">
    <span class="a-price"><span class="a-offscreen">329,99€</span></span>
  </div>
  <i class="a-icon a-icon-star-small a-star-small-4-5"></i>
  <span class="a-icon-star-small"><span class="a-icon-alt">4,5 su 5 stelle</span></span>
  <div id="imgTagWrapperId"><img id="landingImage" src="https://m.media-amazon.com/images/I/51aXvjzcukL._AC_SX425_.jpg"></div>
  <div id="merchant-info">Venduto e spedito da Amazon.</div>
</body></html>"#;

    fn try_parse(url: &str, html: &str) -> ParsingResult<ProductPageData> {
        let parser = ProductDetailParser::new().unwrap();
        parser.parse_with_context(&Html::parse_document(html), &DetailParseContext::new(url))
    }

    fn parse(url: &str, html: &str) -> ProductPageData {
        try_parse(url, html).unwrap()
    }

    #[test]
    fn extracts_all_fields() {
        let data = parse("https://www.amazon.it/dp/B09XS7JWHH", PRODUCT_PAGE);
        assert_eq!(data.title, "Sony WH-1000XM5 Cuffie Wireless con Noise Cancelling");
        assert_eq!(data.price.as_deref(), Some("329,99€"));
        assert_eq!(data.rating.as_deref(), Some("4,5"));
        assert_eq!(
            data.image.as_deref(),
            Some("https://m.media-amazon.com/images/I/51aXvjzcukL._AC_SX425_.jpg")
        );
        assert_eq!(data.condition, ProductCondition::NewFromAmazon);
    }

    #[test]
    fn price_takes_first_currency_token() {
        let html = r#"<span id="productTitle">Borraccia</span><span class="a-price">Prezzo: 19,90 € (IVA inclusa)</span>"#;
        assert_eq!(parse("https://www.amazon.it/dp/B0ABCDEFG1", html).price.as_deref(), Some("19,90"));
    }

    #[test]
    fn missing_fields_do_not_abort_others() {
        let html = r#"<html><body><span id="productTitle">Zaino</span><img id="landingImage" data-old-hires="https://img.example/big.jpg"></body></html>"#;
        let data = parse("https://www.amazon.it/dp/B0ABCDEFG1?aod=1", html);
        assert_eq!(data.title, "Zaino");
        assert!(data.price.is_none());
        assert!(data.rating.is_none());
        assert_eq!(data.image.as_deref(), Some("https://img.example/big.jpg"));
        assert_eq!(data.condition, ProductCondition::UsedThirdParty);
    }

    #[test]
    fn falls_back_to_secondary_title_selector() {
        let html = r#"<h1 id="title"><span>  Kindle Oasis  </span></h1>"#;
        assert_eq!(parse("https://www.amazon.it/dp/B0ABCDEFG1", html).title, "Kindle Oasis");
    }

    #[test]
    fn blank_title_counts_as_missing() {
        let html = r#"<span id="productTitle">   </span><span class="a-price">9,99€</span>"#;
        assert!(matches!(
            try_parse("https://www.amazon.it/dp/B0ABCDEFG1", html),
            Err(ParsingError::RequiredFieldMissing { ref field, .. }) if field == "title"
        ));
    }

    #[test]
    fn captcha_page_is_not_a_product_page() {
        let html = r#"<html><body><form action="/errors/validateCaptcha"><input name="amzn"></form></body></html>"#;
        let err = try_parse("https://www.amazon.it/dp/B0ABCDEFG1", html).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn prefers_offscreen_price_over_visible_parts() {
        let html = r#"<span id="productTitle">Echo Dot</span>
            <div id="corePrice_feature_div">
              <span class="a-price aok-align-center" data-a-size="xl">
                <span class="a-offscreen">64,99€</span>
                <span aria-hidden="true"><span class="a-price-whole">64<span class="a-price-decimal">,</span></span><span class="a-price-fraction">99</span><span class="a-price-symbol">€</span></span>
              </span>
            </div>"#;
        assert_eq!(parse("https://www.amazon.it/dp/B0ABCDEFG1", html).price.as_deref(), Some("64,99€"));
    }
}
