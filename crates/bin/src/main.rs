//! ITR CLI binary.
//!
//! Provides a command-line interface for portfolio temperature scores.

mod integration;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use integration::config_loader::{config_source, load_config, read_request};
use integration::logging;
use integration::render::{OutputFormat, RenderError, render};
use itr::output::ExportError;
use itr::scoring::available_methods;
use itr::{ErrorKind, ErrorResponse, ItrError, ProviderCatalog, calculate};
use serde_json::json;
use thiserror::Error;
use tracing::info;

#[derive(Parser)]
#[command(name = "itr")]
#[command(about = "ITR: portfolio temperature scores", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/itr/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `itr_scoring=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a portfolio request
    Score {
        /// Request file; reads stdin when omitted or `-`
        request: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,

        /// Write the output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List the configured data providers
    Providers,

    /// List the portfolio aggregation methods
    Methods,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Itr(#[from] ItrError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Cannot write output: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    fn response(&self) -> ErrorResponse {
        match self {
            Self::Itr(err) => ErrorResponse::from(err),
            other => ErrorResponse {
                status: ErrorKind::Internal.status(),
                kind: ErrorKind::Internal,
                detail: other.to_string(),
            },
        }
    }
}

fn main() {
    if let Err(e) = run() {
        let response = e.response();
        match serde_json::to_string(&response) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("Error: {e}"),
        }
        process::exit(if response.kind.is_client_error() { 2 } else { 1 });
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).map_err(ItrError::from)?;
    logging::init(cli.log_level.as_deref().unwrap_or(&config.log_level));
    match config_source(cli.config.as_deref()) {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => info!("using default configuration"),
    }

    match cli.command {
        Commands::Score {
            request,
            format,
            output,
        } => {
            let catalog = ProviderCatalog::from_config(&config).map_err(ItrError::from)?;
            let request = read_request(request.as_deref())?;
            let report = calculate(&request, &config, &catalog)?;
            let rendered = render(&report, format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    info!(path = %path.display(), "wrote report");
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Providers => {
            let catalog = ProviderCatalog::from_config(&config).map_err(ItrError::from)?;
            let listing = json!(catalog.describe());
            println!("{}", serde_json::to_string_pretty(&listing).map_err(ExportError::from)?);
        }
        Commands::Methods => {
            println!("{:<8} {:<60} Requires", "Method", "Weight");
            println!("{}", "-".repeat(100));
            for method in available_methods() {
                println!(
                    "{:<8} {:<60} {}",
                    method.name,
                    method.description,
                    method.required_attributes.join(", ")
                );
            }
        }
    }

    Ok(())
}
