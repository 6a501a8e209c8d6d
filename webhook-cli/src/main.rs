//! set-webhook: register the Telegram bot webhook from a KEY=VALUE config file.

use std::process::ExitCode;

use clap::Parser;
use webhook_cli::{log_filter, run_and_report, Cli, EXIT_ERROR};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = log_filter(&cli.config);
    if let Err(e) = webhook_core::init_tracing(filter.as_deref(), cli.log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    run_and_report(&cli).await
}
