//! CLI parser and settings loading.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use webhook_core::{resolve_default, BaseHost, ConfigSource, ResolvedConfig};
use webhook_registrar::{DEFAULT_TIMEOUT, TELEGRAM_API_BASE};

/// Optional key overriding the Bot API origin.
pub const API_URL_KEY: &str = "TELEGRAM_API_URL";
/// Optional key overriding the request timeout, in seconds.
pub const TIMEOUT_KEY: &str = "WEBHOOK_TIMEOUT_SECS";
/// Log level directives, read by [`log_filter`].
pub const LOG_FILTER_KEY: &str = "RUST_LOG";

#[derive(Parser, Debug)]
#[command(name = "set-webhook")]
#[command(about = "Register the Telegram bot webhook (setWebhook) from a KEY=VALUE config file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file holding TELEGRAM_BOT_TOKEN and optional WEBHOOK_BASE_HOST.
    #[arg(short, long, default_value = ".env")]
    pub config: PathBuf,

    /// HTTPS origin receiving updates; overrides WEBHOOK_BASE_HOST.
    #[arg(short, long)]
    pub base_host: Option<String>,

    /// Bot API origin; overrides TELEGRAM_API_URL.
    #[arg(long)]
    pub api_url: Option<String>,

    /// Request timeout in seconds; overrides WEBHOOK_TIMEOUT_SECS.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Also append logs to this file.
    #[arg(long)]
    pub log_file: Option<String>,

    /// Resolve and validate, print the (redacted) request, send nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log filter: `RUST_LOG` from the environment, else `RUST_LOG` from the config file.
///
/// Only this one key is read from the file here, and nothing is written to the process
/// environment, so the token never leaves the value passed through [`load_settings`].
pub fn log_filter(config: &Path) -> Option<String> {
    if let Ok(filter) = std::env::var(LOG_FILTER_KEY) {
        return Some(filter);
    }
    dotenvy::from_path_iter(config)
        .ok()?
        .filter_map(|item| item.ok())
        .find(|(key, _)| key == LOG_FILTER_KEY)
        .map(|(_, value)| value)
}

/// Everything needed for one registration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub resolved: ResolvedConfig,
    pub api_url: String,
    pub timeout: Duration,
}

/// Resolves settings from the config source; CLI flags take precedence over file values.
pub fn load_settings(cli: &Cli, source: &ConfigSource) -> Result<Settings> {
    let mut resolved = resolve_default(source)?;
    if let Some(ref base_host) = cli.base_host {
        resolved.base_host = BaseHost::new(base_host.clone());
    }

    let api_url = cli
        .api_url
        .clone()
        .or_else(|| source.get(API_URL_KEY).filter(|s| !s.is_empty()).map(str::to_string))
        .unwrap_or_else(|| TELEGRAM_API_BASE.to_string());

    let timeout = match cli.timeout_secs {
        Some(secs) => Duration::from_secs(secs),
        None => match source.get(TIMEOUT_KEY).filter(|s| !s.is_empty()) {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("{} must be a whole number of seconds: {}", TIMEOUT_KEY, raw))?,
            ),
            None => DEFAULT_TIMEOUT,
        },
    };

    if timeout.is_zero() {
        anyhow::bail!("Timeout must be at least 1 second (--timeout-secs / {})", TIMEOUT_KEY);
    }

    Ok(Settings {
        resolved,
        api_url,
        timeout,
    })
}
