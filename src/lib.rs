//! Affilink - Amazon affiliate link converter
//!
//! Turns raw Amazon product links into normalized, affiliate-tagged and
//! shortened links, with best-effort product metadata scraped alongside.

// Module declarations
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod commands;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::application::ConversionService;
use crate::commands::AppState;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::logging::{init_logging, init_logging_with_config, log_system_info};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "AFFILINK_CONFIG";

/// `--config <path>` (or `--config=<path>`) from the arguments, else `AFFILINK_CONFIG`
pub fn config_path_from<I>(args: I, env_value: Option<String>) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return Some(path);
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    env_value.filter(|path| !path.trim().is_empty())
}

/// Load configuration, start logging and serve the API until Ctrl-C
pub async fn run() -> Result<()> {
    let config_path = config_path_from(std::env::args().skip(1), std::env::var(CONFIG_PATH_ENV).ok());

    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let _ = init_logging();
            error!("Configuration error: {}", e);
            return Err(e).context("Failed to load configuration");
        }
    };

    init_logging_with_config(&config.logging).context("Failed to initialize logging")?;
    log_system_info();
    info!(
        "Affiliate tag: {}, shortener: {}",
        config.affiliate.tag,
        config.shortener.base()
    );

    let service = ConversionService::from_config(&config)?;
    commands::serve(&config.server, AppState::new(service)).await
}
