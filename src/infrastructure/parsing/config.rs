//! Parsing configuration for HTML extraction
//!
//! Centralized configuration for CSS selectors used on Amazon product pages.

use serde::{Deserialize, Serialize};

/// CSS selectors for product detail pages, tried in order per field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPageSelectors {
    /// Product title element
    pub title: Vec<String>,

    /// Price element; the first currency-shaped token inside wins.
    /// The screen-reader copy comes first, the bare container is a fallback.
    pub price: Vec<String>,

    /// Element whose text holds the star rating ("4,5 su 5 stelle")
    pub rating: Vec<String>,

    /// Main product image
    pub image: Vec<String>,

    /// Seller / merchant information block used for condition detection
    pub merchant_info: Vec<String>,
}

impl Default for ProductPageSelectors {
    fn default() -> Self {
        Self {
            title: vec![
                "span#productTitle".to_string(),
                "h1#title span".to_string(),
                "#productTitle".to_string(),
            ],
            price: vec![
                "span.a-price .a-offscreen".to_string(),
                "#corePrice_feature_div .a-offscreen".to_string(),
                "span.a-price".to_string(),
                "#priceblock_ourprice".to_string(),
            ],
            rating: vec![
                "span.a-icon-star-small span".to_string(),
                "i.a-icon-star span.a-icon-alt".to_string(),
            ],
            image: vec![
                "img#landingImage".to_string(),
                "#imgTagWrapperId img".to_string(),
            ],
            merchant_info: vec![
                "div#merchant-info".to_string(),
                "#merchantInfoFeature_feature_div".to_string(),
            ],
        }
    }
}
