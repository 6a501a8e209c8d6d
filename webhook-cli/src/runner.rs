//! Runs one registration and maps the outcome to output and an exit code.

use std::process::ExitCode;

use anyhow::{Context, Result};
use webhook_core::load_file;
use webhook_registrar::{
    HttpPoster, RegistrationRequest, RegistrationResult, ReqwestPoster, WebhookRegistrar,
};

use crate::cli::{load_settings, Cli, Settings};

/// Exit code for errors before or during the request (config, base host, transport).
pub const EXIT_ERROR: u8 = 2;

/// What a run produced.
#[derive(Debug)]
pub enum Outcome {
    /// `--dry-run`: the request that would have been sent.
    DryRun(RegistrationRequest),
    Registered(RegistrationResult),
}

impl Outcome {
    /// 0 on success or dry run, 1 when the platform rejected the registration.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::DryRun(_) => 0,
            Outcome::Registered(result) if result.is_success() => 0,
            Outcome::Registered(_) => 1,
        }
    }

    /// Prints the outcome: success to stdout, platform rejection to stderr. The token is never printed.
    pub fn report(&self) {
        match self {
            Outcome::DryRun(request) => {
                println!("Dry run, nothing sent.");
                println!("POST {}", request.redacted_url());
                println!("url={}", request.redacted_callback_url());
            }
            Outcome::Registered(RegistrationResult::Success { body }) => {
                println!("Webhook registered: {}", body);
            }
            Outcome::Registered(RegistrationResult::Failure { reason, body }) => {
                eprintln!("Webhook registration failed ({}): {}", reason, body);
            }
        }
    }
}

/// Registers (or, for `dry_run`, prepares) the webhook with the given poster.
pub async fn execute<P: HttpPoster>(settings: &Settings, poster: P, dry_run: bool) -> Result<Outcome> {
    let registrar = WebhookRegistrar::new(poster).with_api_base(settings.api_url.clone());
    let credential = &settings.resolved.credential;
    let base_host = &settings.resolved.base_host;

    if dry_run {
        let request = registrar.prepare(credential, base_host)?;
        return Ok(Outcome::DryRun(request));
    }

    let result = registrar.register(credential, base_host).await?;
    Ok(Outcome::Registered(result))
}

/// Loads the config file, builds a reqwest poster with the configured timeout, and executes.
pub async fn run(cli: &Cli) -> Result<Outcome> {
    let source = load_file(&cli.config)
        .with_context(|| format!("Load config file {}", cli.config.display()))?;
    let settings = load_settings(cli, &source)?;

    tracing::info!(
        config = %cli.config.display(),
        token = %settings.resolved.credential,
        base_host = %settings.resolved.base_host,
        api_url = %settings.api_url,
        timeout_secs = settings.timeout.as_secs(),
        dry_run = cli.dry_run,
        "Webhook settings loaded"
    );

    let poster = ReqwestPoster::with_timeout(settings.timeout)?;
    execute(&settings, poster, cli.dry_run).await
}

/// Runs and reports; errors go to stderr with [`EXIT_ERROR`].
pub async fn run_and_report(cli: &Cli) -> ExitCode {
    match run(cli).await {
        Ok(outcome) => {
            outcome.report();
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Webhook registration aborted");
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
