use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when no product title could be scraped
pub const PLACEHOLDER_TITLE: &str = "Prodotto Amazon";

/// Listing condition as shown to publishers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCondition {
    /// Offer opened from the all-offers display (`aod=1`)
    #[serde(rename = "Usato - Venduto da terzo")]
    UsedThirdParty,
    #[serde(rename = "Usato - Warehouse Deals Amazon")]
    UsedWarehouseDeals,
    #[serde(rename = "Usato - Venduto da Amazon Seconda mano")]
    UsedAmazonSecondHand,
    #[serde(rename = "Nuovo - Venduto da Amazon")]
    NewFromAmazon,
}

impl ProductCondition {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UsedThirdParty => "Usato - Venduto da terzo",
            Self::UsedWarehouseDeals => "Usato - Warehouse Deals Amazon",
            Self::UsedAmazonSecondHand => "Usato - Venduto da Amazon Seconda mano",
            Self::NewFromAmazon => "Nuovo - Venduto da Amazon",
        }
    }
}

impl Default for ProductCondition {
    fn default() -> Self {
        Self::NewFromAmazon
    }
}

impl fmt::Display for ProductCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Best-effort product metadata scraped from a product page
///
/// Built fresh for every scrape. `success` and `source_url` are internal
/// bookkeeping and stay out of the public JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(skip)]
    pub success: bool,
    pub title: String,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub image: Option<String>,
    pub condition: Option<ProductCondition>,
    #[serde(skip)]
    pub source_url: String,
}

impl ProductInfo {
    /// Result returned when every client identity failed to produce a title
    pub fn degraded(source_url: impl Into<String>) -> Self {
        Self {
            success: false,
            title: PLACEHOLDER_TITLE.to_string(),
            price: None,
            rating: None,
            image: None,
            condition: None,
            source_url: source_url.into(),
        }
    }

    pub fn has_real_title(&self) -> bool {
        !self.title.is_empty() && self.title != PLACEHOLDER_TITLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_serializes_to_display_label() {
        let json = serde_json::to_string(&ProductCondition::UsedWarehouseDeals).unwrap();
        assert_eq!(json, "\"Usato - Warehouse Deals Amazon\"");
        assert_eq!(ProductCondition::NewFromAmazon.to_string(), "Nuovo - Venduto da Amazon");
        assert_eq!(ProductCondition::default(), ProductCondition::NewFromAmazon);
    }

    #[test]
    fn degraded_info_hides_internal_fields() {
        let info = ProductInfo::degraded("https://www.amazon.it/dp/B0ABCDEFG1");
        assert!(!info.success);
        assert!(!info.has_real_title());

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["title"], "Prodotto Amazon");
        assert!(value["price"].is_null());
        assert!(value["condition"].is_null());
        assert!(value.get("success").is_none());
        assert!(value.get("source_url").is_none());
    }
}
