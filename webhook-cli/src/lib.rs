//! # webhook-cli
//!
//! `set-webhook` binary support: argument parsing, settings loading, and running one
//! registration with exit-code mapping.

pub mod cli;
pub mod runner;

pub use cli::{load_settings, log_filter, Cli, Settings, API_URL_KEY, LOG_FILTER_KEY, TIMEOUT_KEY};
pub use runner::{execute, run, run_and_report, Outcome, EXIT_ERROR};
