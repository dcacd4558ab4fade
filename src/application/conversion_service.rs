//! Link conversion use case
//!
//! classify → normalize → tag, then scrape the untagged URL and shorten the
//! tagged one. Scraping and shortening degrade to placeholder values; only
//! bad input fails a conversion.

#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::affiliate::add_affiliate_tag;
use crate::domain::amazon_url::{normalize_amazon_url, AmazonUrlPolicy};
use crate::domain::conversion::{ConversionError, ConversionResult};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::link_shortener::{LinkShortener, YourlsShortener};
use crate::infrastructure::product_scraper::ProductScraper;
use crate::infrastructure::simple_http_client::{DocumentFetcher, HttpClient, HttpClientConfig};

/// Shared, immutable conversion pipeline; clone the `Arc` per request
pub struct ConversionService {
    affiliate_tag: String,
    url_policy: AmazonUrlPolicy,
    scraper: ProductScraper,
    shortener: Arc<dyn LinkShortener>,
}

impl ConversionService {
    /// Build the service with explicit collaborators
    pub fn new(
        config: &AppConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        shortener: Arc<dyn LinkShortener>,
    ) -> Result<Self> {
        let scraper =
            ProductScraper::new(fetcher, &config.scraper).context("Failed to create product scraper")?;

        Ok(Self {
            affiliate_tag: config.affiliate.tag.clone(),
            url_policy: if config.affiliate.strict_domain_matching {
                AmazonUrlPolicy::strict()
            } else {
                AmazonUrlPolicy::permissive()
            },
            scraper,
            shortener,
        })
    }

    /// Build the service with the reqwest fetcher and the YOURLS shortener
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpClient::with_config(HttpClientConfig::from_scraper_config(
            &config.scraper,
        )));
        let shortener = Arc::new(YourlsShortener::new(&config.shortener));
        Self::new(config, fetcher, shortener)
    }

    pub fn affiliate_tag(&self) -> &str {
        &self.affiliate_tag
    }

    /// Convert a raw Amazon link into a tagged, optionally shortened link
    pub async fn convert(&self, raw: &str, shorten: bool) -> Result<ConversionResult, ConversionError> {
        let original_url = raw.trim();
        if original_url.is_empty() {
            return Err(ConversionError::InvalidInput);
        }
        if !self.url_policy.accepts(original_url) {
            info!("Rejected non-Amazon URL: {}", original_url);
            return Err(ConversionError::NotAmazonUrl);
        }

        info!("Original URL: {}", original_url);
        let normalized = normalize_amazon_url(original_url);
        info!("Normalized URL: {}", normalized);

        let affiliate_url = add_affiliate_tag(&normalized, &self.affiliate_tag);
        info!("Affiliate URL: {}", affiliate_url);

        let product = self.scraper.scrape(&normalized).await;

        let short_url = if shorten {
            let outcome = self.shortener.shorten(&affiliate_url).await;
            if !outcome.is_shortened() {
                warn!("Shortening degraded, returning the affiliate URL");
            }
            outcome.into_url()
        } else {
            affiliate_url.clone()
        };
        info!("Final URL: {}", short_url);

        Ok(ConversionResult {
            success: true,
            original_url: original_url.to_string(),
            affiliate_url,
            short_url,
            product,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{ProductCondition, PLACEHOLDER_TITLE};
    use crate::infrastructure::link_shortener::{ShortenError, ShortenOutcome};
    use crate::infrastructure::product_scraper::test_support::{Scripted, ScriptedFetcher};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const PAGE: &str = r#"<html><body>
        <span id="productTitle">Cuffie Bluetooth</span>
        <span class="a-price"><span class="a-offscreen">49,90€</span></span>
        </body></html>"#;

    #[derive(Default)]
    struct RecordingShortener {
        calls: AtomicUsize,
        received: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl LinkShortener for RecordingShortener {
        async fn shorten(&self, url: &str) -> ShortenOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.received.lock().unwrap().push(url.to_string());
            if self.fail {
                ShortenOutcome::Unchanged {
                    url: url.to_string(),
                    reason: ShortenError::Transport("connection refused".to_string()),
                }
            } else {
                ShortenOutcome::Created("https://s.example/abc".to_string())
            }
        }
    }

    fn service(
        config: &AppConfig,
        script: Vec<Scripted>,
        shortener: RecordingShortener,
    ) -> (ConversionService, Arc<ScriptedFetcher>, Arc<RecordingShortener>) {
        let fetcher = Arc::new(ScriptedFetcher::new(script));
        let shortener = Arc::new(shortener);
        let service = ConversionService::new(config, fetcher.clone(), shortener.clone()).unwrap();
        (service, fetcher, shortener)
    }

    #[tokio::test]
    async fn converts_without_shortening() {
        let (service, fetcher, shortener) = service(
            &AppConfig::default(),
            vec![Scripted::Page(200, PAGE.to_string())],
            RecordingShortener::default(),
        );

        let result = service
            .convert("https://www.amazon.it/dp/B0ABCDEFG1/ref=xyz?psc=1", false)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.original_url, "https://www.amazon.it/dp/B0ABCDEFG1/ref=xyz?psc=1");
        assert_eq!(result.affiliate_url, "https://www.amazon.it/dp/B0ABCDEFG1?psc=1&tag=lamendino-21");
        assert_eq!(result.short_url, result.affiliate_url);
        assert_eq!(result.product.title, "Cuffie Bluetooth");
        assert_eq!(result.product.condition, Some(ProductCondition::NewFromAmazon));
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(shortener.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scrapes_untagged_url_and_shortens_tagged_one() {
        let mut config = AppConfig::default();
        config.affiliate.tag = "mytag-21".to_string();
        let (service, _fetcher, shortener) = service(
            &config,
            vec![Scripted::Page(200, PAGE.to_string())],
            RecordingShortener::default(),
        );

        let result = service
            .convert("  https://www.amazon.it/gp/product/B0ABCDEFG1?tag=other-21&smid=A1  ", true)
            .await
            .unwrap();

        assert_eq!(result.product.source_url, "https://www.amazon.it/dp/B0ABCDEFG1?smid=A1");
        assert_eq!(result.affiliate_url, "https://www.amazon.it/dp/B0ABCDEFG1?smid=A1&tag=mytag-21");
        assert_eq!(result.short_url, "https://s.example/abc");
        assert_eq!(*shortener.received.lock().unwrap(), vec![result.affiliate_url.clone()]);
    }

    #[tokio::test]
    async fn degraded_collaborators_still_succeed() {
        let (service, fetcher, _shortener) = service(
            &AppConfig::default(),
            vec![Scripted::Fail, Scripted::Fail, Scripted::Fail],
            RecordingShortener {
                fail: true,
                ..RecordingShortener::default()
            },
        );

        let result = service.convert("https://amzn.to/abc123", true).await.unwrap();

        assert!(result.success);
        assert_eq!(result.affiliate_url, "https://amzn.to/abc123?tag=lamendino-21");
        assert_eq!(result.short_url, result.affiliate_url);
        assert!(!result.product.success);
        assert_eq!(result.product.title, PLACEHOLDER_TITLE);
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn rejected_input_makes_no_network_calls() {
        let (service, fetcher, shortener) =
            service(&AppConfig::default(), Vec::new(), RecordingShortener::default());

        assert_eq!(service.convert("not-a-url", true).await.unwrap_err(), ConversionError::NotAmazonUrl);
        assert_eq!(
            service.convert("https://ebay.com/item/123", true).await.unwrap_err(),
            ConversionError::NotAmazonUrl
        );
        assert_eq!(service.convert("   ", true).await.unwrap_err(), ConversionError::InvalidInput);
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(shortener.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn strict_matching_rejects_lookalike_hosts() {
        let mut config = AppConfig::default();
        let url = "https://fakeamazon.it.evil.com/dp/B000123456";

        let (permissive, _, _) = service(&config, Vec::new(), RecordingShortener::default());
        assert!(permissive.convert(url, false).await.is_ok());

        config.affiliate.strict_domain_matching = true;
        let (strict, fetcher, _) = service(&config, Vec::new(), RecordingShortener::default());
        assert_eq!(strict.convert(url, false).await.unwrap_err(), ConversionError::NotAmazonUrl);
        assert_eq!(fetcher.calls(), 0);
    }
}
