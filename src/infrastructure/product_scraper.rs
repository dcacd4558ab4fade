//! Best-effort product metadata scraping with identity rotation
//!
//! Amazon serves bot walls and stripped pages to some User-Agents. Each
//! configured identity is tried in order until one returns a page with a
//! real product title; if none does, a degraded placeholder is returned.

#![allow(clippy::uninlined_format_args)]

use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::product::ProductInfo;
use crate::infrastructure::config::ScraperConfig;
use crate::infrastructure::parsing::{
    ContextualParser, DetailParseContext, ParsingResult, ProductDetailParser, ProductPageData,
};
use crate::infrastructure::simple_http_client::{ClientIdentity, DocumentFetcher};

pub struct ProductScraper {
    fetcher: Arc<dyn DocumentFetcher>,
    identities: Vec<ClientIdentity>,
    parser: ProductDetailParser,
}

impl ProductScraper {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, config: &ScraperConfig) -> ParsingResult<Self> {
        Ok(Self {
            fetcher,
            identities: ClientIdentity::from_config(config),
            parser: ProductDetailParser::with_config(&config.selectors)?,
        })
    }

    /// Scrape metadata for a normalized product URL; never fails
    pub async fn scrape(&self, url: &str) -> ProductInfo {
        for (attempt, identity) in self.identities.iter().enumerate() {
            debug!("Scrape attempt {}/{} for {}", attempt + 1, self.identities.len(), url);

            let page = match self.fetcher.fetch_document(url, identity).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Fetch failed for {} (attempt {}): {}", url, attempt + 1, e);
                    continue;
                }
            };

            if !page.is_success() {
                warn!("HTTP {} for {} (attempt {})", page.status, url, attempt + 1);
                continue;
            }

            let context = DetailParseContext::new(url).with_identity(&identity.user_agent);
            let info = match self.parse_page(&page.body, &context) {
                Ok(data) => Self::into_product_info(data, url),
                Err(e) => {
                    warn!("No product data for {} (attempt {}): {}", url, attempt + 1, e);
                    continue;
                }
            };

            if info.has_real_title() {
                info!("Scraped '{}' from {} on attempt {}", info.title, url, attempt + 1);
                return info;
            }
            debug!("Page title is the placeholder for {} (attempt {})", url, attempt + 1);
        }

        warn!("All {} identities exhausted for {}, returning placeholder", self.identities.len(), url);
        ProductInfo::degraded(url)
    }

    // `Html` is not Send, so it must not live across an await point
    fn parse_page(&self, body: &str, context: &DetailParseContext) -> ParsingResult<ProductPageData> {
        let document = Html::parse_document(body);
        self.parser.parse_with_context(&document, context)
    }

    fn into_product_info(data: ProductPageData, url: &str) -> ProductInfo {
        ProductInfo {
            success: true,
            title: data.title,
            price: data.price,
            rating: data.rating,
            image: data.image,
            condition: Some(data.condition),
            source_url: url.to_string(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{Scripted, ScriptedFetcher};
    use super::*;
    use crate::domain::product::{ProductCondition, PLACEHOLDER_TITLE};

    const URL: &str = "https://www.amazon.it/dp/B0ABCDEFG1?psc=1";

    const GOOD_PAGE: &str = r#"<html><body>
        <span id="productTitle"> Echo Dot (5ª generazione) </span>
        <span class="a-price"><span class="a-offscreen">64,99€</span></span>
        <span class="a-icon-star-small"><span>4,7 su 5 stelle</span></span>
        <img id="landingImage" src="https://m.media-amazon.com/images/I/echo.jpg">
        <div id="merchant-info">Venduto e spedito da Amazon.</div>
        </body></html>"#;

    const CAPTCHA_PAGE: &str = "<html><body><form action=\"/errors/validateCaptcha\"></form></body></html>";

    fn scraper(fetcher: Arc<ScriptedFetcher>) -> ProductScraper {
        let config = ScraperConfig {
            user_agents: vec!["UA-1".into(), "UA-2".into(), "UA-3".into()],
            ..ScraperConfig::default()
        };
        ProductScraper::new(fetcher, &config).unwrap()
    }

    #[tokio::test]
    async fn first_identity_success_stops_rotation() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Scripted::Page(200, GOOD_PAGE.to_string())]));
        let info = scraper(fetcher.clone()).scrape(URL).await;

        assert!(info.success);
        assert_eq!(info.title, "Echo Dot (5ª generazione)");
        assert_eq!(info.price.as_deref(), Some("64,99€"));
        assert_eq!(info.rating.as_deref(), Some("4,7"));
        assert_eq!(info.image.as_deref(), Some("https://m.media-amazon.com/images/I/echo.jpg"));
        assert_eq!(info.condition, Some(ProductCondition::NewFromAmazon));
        assert_eq!(info.source_url, URL);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn rotates_past_errors_and_bad_statuses() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Scripted::Fail,
            Scripted::Page(503, GOOD_PAGE.to_string()),
            Scripted::Page(200, GOOD_PAGE.to_string()),
        ]));
        let info = scraper(fetcher.clone()).scrape(URL).await;

        assert!(info.success);
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(*fetcher.seen_agents.lock().unwrap(), vec!["UA-1", "UA-2", "UA-3"]);
    }

    #[tokio::test]
    async fn page_without_title_tries_next_identity() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Scripted::Page(200, CAPTCHA_PAGE.to_string()),
            Scripted::Page(200, GOOD_PAGE.to_string()),
        ]));
        let info = scraper(fetcher.clone()).scrape(URL).await;

        assert!(info.success);
        assert_eq!(info.title, "Echo Dot (5ª generazione)");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn placeholder_titled_page_does_not_stop_rotation() {
        let placeholder_page = format!(
            r#"<span id="productTitle">{}</span><span class="a-price"><span class="a-offscreen">1,00€</span></span>"#,
            PLACEHOLDER_TITLE
        );
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Scripted::Page(200, placeholder_page),
            Scripted::Page(200, GOOD_PAGE.to_string()),
        ]));
        let info = scraper(fetcher.clone()).scrape(URL).await;

        assert_eq!(info.price.as_deref(), Some("64,99€"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn exhausted_identities_degrade_to_placeholder() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![
            Scripted::Page(200, CAPTCHA_PAGE.to_string()),
            Scripted::Page(404, String::new()),
            Scripted::Fail,
        ]));
        let info = scraper(fetcher.clone()).scrape(URL).await;

        assert!(!info.success);
        assert_eq!(info.title, PLACEHOLDER_TITLE);
        assert!(info.price.is_none());
        assert!(info.rating.is_none());
        assert!(info.image.is_none());
        assert!(info.condition.is_none());
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn condition_comes_from_url_parameters() {
        let fetcher = Arc::new(ScriptedFetcher::new(vec![Scripted::Page(200, GOOD_PAGE.to_string())]));
        let info = scraper(fetcher)
            .scrape("https://www.amazon.it/dp/B0ABCDEFG1?s=warehouse-deals")
            .await;
        assert_eq!(info.condition, Some(ProductCondition::UsedWarehouseDeals));
    }
}
