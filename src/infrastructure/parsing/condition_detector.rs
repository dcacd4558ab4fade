//! Listing condition heuristic (new vs. used)
//!
//! Decision order, first match wins:
//! 1. `aod=1` on the URL: offer picked from the all-offers display, third-party used
//! 2. `s` containing `warehouse-deals`: Amazon Warehouse used stock
//! 3. Merchant block mentioning "Amazon Seconda mano"
//! 4. Otherwise new, sold by Amazon

use scraper::{Html, Selector};
use tracing::debug;

use super::config::ProductPageSelectors;
use super::context::DetailParseContext;
use super::{compile_selectors, stripped_text, ParsingResult};
use crate::domain::product::ProductCondition;

/// Marker Amazon.it prints in the merchant block for second-hand stock
pub const SECOND_HAND_MARKER: &str = "Amazon Seconda mano";

const WAREHOUSE_DEALS_MARKER: &str = "warehouse-deals";

#[derive(Debug, Clone)]
pub struct ConditionDetector {
    merchant_info_selectors: Vec<Selector>,
}

impl ConditionDetector {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&ProductPageSelectors::default())
    }

    pub fn with_config(selectors: &ProductPageSelectors) -> ParsingResult<Self> {
        Ok(Self {
            merchant_info_selectors: compile_selectors("merchant_info", &selectors.merchant_info)?,
        })
    }

    /// Classify the listing; never fails, unknown cases fall back to new
    pub fn detect(&self, context: &DetailParseContext, html: &Html) -> ProductCondition {
        if context.query_param("aod").as_deref() == Some("1") {
            return ProductCondition::UsedThirdParty;
        }

        let is_warehouse = context
            .query_param("s")
            .is_some_and(|s| s.to_lowercase().contains(WAREHOUSE_DEALS_MARKER));
        if is_warehouse {
            return ProductCondition::UsedWarehouseDeals;
        }

        if self.merchant_mentions_second_hand(html) {
            return ProductCondition::UsedAmazonSecondHand;
        }

        debug!("No used-condition markers for {}", context.url);
        ProductCondition::NewFromAmazon
    }

    fn merchant_mentions_second_hand(&self, html: &Html) -> bool {
        self.merchant_info_selectors
            .iter()
            .find_map(|selector| html.select(selector).next())
            .is_some_and(|section| stripped_text(section).contains(SECOND_HAND_MARKER))
    }
}
