//! Infrastructure layer: configuration, logging, HTML parsing and the
//! outbound HTTP integrations (product pages and the link shortener).

pub mod config;
pub mod link_shortener;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod product_scraper;
pub mod simple_http_client;

// Re-export commonly used items
pub use config::{AppConfig, ConfigError};
pub use link_shortener::{LinkShortener, ShortenError, ShortenOutcome, YourlsShortener};
pub use logging::{get_log_directory, init_logging, init_logging_with_config};
pub use parsing::{ParsingError, ParsingResult, ProductDetailParser, ProductPageSelectors};
pub use product_scraper::ProductScraper;
pub use simple_http_client::{ClientIdentity, DocumentFetcher, FetchError, FetchedPage, HttpClient, HttpClientConfig};
