mod cli;
mod config;
mod error;
mod models;
mod output;
mod registry;
mod resolver;
mod selector;
mod version;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{normalize_single_dash_options, Cli};
use error::{exit_code, AppError};
use models::RequestParams;
use output::{print_failure, print_result, print_usage, request_summary};
use registry::RegistryClient;

#[tokio::main]
async fn main() {
    // Loaded before parsing so `.env` values can feed clap's env fallbacks.
    let dotenv = config::load_dotenv();
    config::apply_legacy_env();
    let cli = Cli::parse_from(normalize_single_dash_options(std::env::args()));
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli, dotenv).await {
        let app_error = e.downcast_ref::<AppError>();
        if let Some(AppError::Usage) = app_error {
            print_usage();
        } else {
            print_failure(&e);
        }
        process::exit(app_error.map_or(exit_code::FAILURE, AppError::exit_code));
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "ldi=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// A missing repository is reported before a broken `.env` file.
fn request_params(
    cli: &Cli,
    dotenv: Result<Option<PathBuf>, AppError>,
) -> Result<RequestParams, AppError> {
    let params = cli.request_params()?;
    if let Some(path) = dotenv? {
        debug!("Loaded environment from {}", path.display());
    }
    Ok(params)
}

async fn run(cli: &Cli, dotenv: Result<Option<PathBuf>, AppError>) -> Result<()> {
    let params = request_params(cli, dotenv)?;
    debug!("Request: {:?}", params);

    let client = RegistryClient::new(&cli.registry, cli.page_size);
    let result = resolver::resolve(&client, &params)
        .await
        .with_context(|| request_summary(&params))?;

    print_result(&params, &result).context("Failed to write result")?;
    Ok(())
}
