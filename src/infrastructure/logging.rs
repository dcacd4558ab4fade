//! Logging system configuration and initialization
//!
//! This module provides the logging setup with:
//! - Console output (plain or JSON)
//! - Optional non-blocking file output
//! - Configuration based log level control with `RUST_LOG` override
//! - Local-time timestamps

#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the file writer alive for the lifetime of the process
static LOG_GUARDS: Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(Vec::new());

/// Timestamp formatter using the host's local time zone
struct LocalTimeFormatter;

impl FormatTime for LocalTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f %:z"))
    }
}

/// Resolve the log directory; relative paths are anchored at the executable
pub fn get_log_directory(config: &LoggingConfig) -> PathBuf {
    let configured = Path::new(&config.log_dir);
    if configured.is_absolute() {
        return configured.to_path_buf();
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join(configured)
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level plus module filters
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = vec![config.level.clone()];
        if !config.level.to_lowercase().contains("trace") {
            let mut modules: Vec<_> = config.module_filters.iter().collect();
            modules.sort();
            directives.extend(modules.into_iter().map(|(module, level)| format!("{}={}", module, level)));
        }
        directives.push(format!("affilink_lib={}", config.level));

        EnvFilter::try_new(directives.join(",")).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Initialize logging with the default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize logging with custom configuration
///
/// # Environment Variable Override
/// ```bash
/// RUST_LOG="debug,reqwest=debug,hyper=debug" affilink
/// ```
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.file_output && !config.console_output {
        return Err(anyhow!("No logging output configured"));
    }

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let console = fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_timer(LocalTimeFormatter)
            .with_target(false);
        layers.push(if config.json_format { console.json().boxed() } else { console.boxed() });
    }

    let log_dir = get_log_directory(config);
    if config.file_output {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", log_dir, e))?;

        let (file_writer, file_guard) = non_blocking(rolling::never(&log_dir, &config.file_name));
        LOG_GUARDS
            .lock()
            .map_err(|_| anyhow!("Log guard registry poisoned"))?
            .push(file_guard);

        let file = fmt::Layer::new()
            .with_writer(file_writer)
            .with_timer(LocalTimeFormatter)
            .with_ansi(false);
        layers.push(if config.json_format {
            file.json().with_thread_ids(true).with_file(true).with_line_number(true).boxed()
        } else {
            file.with_target(false).boxed()
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(build_env_filter(config))
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    info!("Logging system initialized");
    info!("Log level: {}", config.level);
    info!("JSON format: {}", config.json_format);
    if config.file_output {
        info!("Log file: {:?}", log_dir.join(&config.file_name));
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Affilink System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);
    info!("===================================");
}
