//! Configuration infrastructure
//!
//! Contains configuration loading and validation for the converter.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults (`defaults` module)
//! 2. Optional TOML/JSON/YAML file (`affilink.toml` unless overridden)
//! 3. `AFFILINK_*` environment variables, `__` between sections
//!    (e.g. `AFFILINK_SHORTENER__BASE_URL`)
//! 4. Legacy deployment variables `YOURLS_URL`, `YOURLS_SIGNATURE`, `AFFILIATE_TAG`

#![allow(clippy::uninlined_format_args)]

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::infrastructure::parsing::ProductPageSelectors;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub affiliate: AffiliateConfig,
    pub shortener: ShortenerConfig,
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

/// Inbound HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API binds to
    pub listen_addr: String,

    /// Allow cross-origin requests from browser front-ends
    pub cors_enabled: bool,
}

/// Affiliate tagging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliateConfig {
    /// Associate tag appended as `tag=<value>`
    pub tag: String,

    /// Only accept hosts that are, or are subdomains of, a known Amazon domain
    pub strict_domain_matching: bool,
}

/// YOURLS shortening service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortenerConfig {
    /// Base address of the YOURLS installation (no trailing slash needed)
    pub base_url: String,

    /// Passwordless API signature token
    pub signature: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Product page scraping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Browser User-Agents tried in order until one yields a product title
    pub user_agents: Vec<String>,

    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,

    pub accept: String,
    pub accept_language: String,

    /// Maximum redirects followed per attempt
    pub max_redirects: usize,

    /// CSS selectors for product page fields
    pub selectors: ProductPageSelectors,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; relative paths resolve against the executable
    pub log_dir: String,

    /// Log file name inside `log_dir`
    pub file_name: String,

    /// Module-specific log level filters (e.g., "reqwest": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: defaults::LISTEN_ADDR.to_string(),
            cors_enabled: true,
        }
    }
}

impl Default for AffiliateConfig {
    fn default() -> Self {
        Self {
            tag: defaults::AFFILIATE_TAG.to_string(),
            strict_domain_matching: false,
        }
    }
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::YOURLS_URL.to_string(),
            signature: defaults::YOURLS_SIGNATURE.to_string(),
            timeout_secs: defaults::SHORTEN_TIMEOUT_SECONDS,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agents: defaults::USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            timeout_secs: defaults::FETCH_TIMEOUT_SECONDS,
            accept: defaults::ACCEPT.to_string(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            max_redirects: defaults::MAX_REDIRECTS,
            selectors: ProductPageSelectors::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: defaults::LOG_DIR.to_string(),
            file_name: defaults::LOG_FILE_NAME.to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "warn".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters.insert("tower_http".to_string(), "info".to_string());
                filters
            },
        }
    }
}

impl ScraperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ShortenerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base address without trailing slashes, used to rebuild short links
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl AppConfig {
    /// Load from the process environment and an optional config file
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_from(path, std::env::vars().collect())
    }

    /// Load using an explicit variable map in place of the process environment
    pub fn load_from(path: Option<&str>, vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let file = path.unwrap_or(defaults::CONFIG_FILE);
        let required = path.is_some();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(file).required(required))
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(vars.clone())),
            )
            .set_override_option("shortener.base_url", vars.get("YOURLS_URL").cloned())?
            .set_override_option("shortener.signature", vars.get("YOURLS_SIGNATURE").cloned())?
            .set_override_option("affiliate.tag", vars.get("AFFILIATE_TAG").cloned())?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        info!("Loaded configuration (affiliate tag: {}, shortener: {})", config.affiliate.tag, config.shortener.base());
        Ok(config)
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Validation { message });

        if self.affiliate.tag.trim().is_empty() {
            return invalid("affiliate.tag must not be empty".to_string());
        }
        if self.affiliate.tag.contains(['&', '?', '#', ' ']) {
            return invalid(format!("affiliate.tag contains URL metacharacters: {:?}", self.affiliate.tag));
        }
        if self.shortener.signature.trim().is_empty() {
            return invalid("shortener.signature must not be empty".to_string());
        }
        if let Err(e) = url::Url::parse(&self.shortener.base_url) {
            return invalid(format!("shortener.base_url is not a valid URL: {}", e));
        }
        if self.shortener.timeout_secs == 0 || self.scraper.timeout_secs == 0 {
            return invalid("timeouts must be greater than 0".to_string());
        }
        if self.scraper.user_agents.iter().all(|ua| ua.trim().is_empty()) {
            return invalid("scraper.user_agents needs at least one entry".to_string());
        }
        if self.server.listen_addr.parse::<SocketAddr>().is_err() {
            return invalid(format!("server.listen_addr is not a socket address: {}", self.server.listen_addr));
        }
        Ok(())
    }
}

/// Default configuration values
pub mod defaults {
    /// Config file looked up when no explicit path is given (extension optional)
    pub const CONFIG_FILE: &str = "affilink";

    /// Prefix for structured environment overrides
    pub const ENV_PREFIX: &str = "AFFILINK";

    pub const LISTEN_ADDR: &str = "0.0.0.0:5000";

    pub const AFFILIATE_TAG: &str = "lamendino-21";

    pub const YOURLS_URL: &str = "https://url.nelloonrender.duckdns.org";

    pub const YOURLS_SIGNATURE: &str = "def05e4247";

    /// Shortening is a small JSON exchange
    pub const SHORTEN_TIMEOUT_SECONDS: u64 = 10;

    /// Product pages can be slow to render upstream
    pub const FETCH_TIMEOUT_SECONDS: u64 = 15;

    pub const MAX_REDIRECTS: usize = 10;

    pub const USER_AGENTS: &[&str] = &[
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    ];

    pub const ACCEPT: &str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

    pub const ACCEPT_LANGUAGE: &str = "it-IT,it;q=0.9,en;q=0.8";

    // Log configuration defaults
    pub const LOG_LEVEL: &str = "info";

    pub const LOG_JSON_FORMAT: bool = false;

    pub const LOG_CONSOLE_OUTPUT: bool = true;

    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_DIR: &str = "logs";

    pub const LOG_FILE_NAME: &str = "affilink.log";
}
