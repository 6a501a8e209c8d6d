//! # webhook-core
//!
//! Config resolution for the webhook registrar: [`ConfigSource`] parsing, [`resolve`] of the
//! bot token and base host, token redaction for diagnostics, and tracing initialization.

pub mod config;
pub mod error;
pub mod logger;
pub mod redact;

pub use config::{
    load_file, resolve, resolve_default, BaseHost, BotCredential, ConfigSource, ResolvedConfig,
    BASE_HOST_KEY, BOT_TOKEN_KEY, DEFAULT_BASE_HOST,
};
pub use error::{ConfigError, Result};
pub use logger::init_tracing;
pub use redact::redact_token;
