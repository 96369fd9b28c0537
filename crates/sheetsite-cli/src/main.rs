//! Serve a website built from a Google Sheets spreadsheet.
//!
//! Usage:
//! ```bash
//! sheetsite serve                    # Serve the site from sheetsite.toml
//! sheetsite serve --port 8080        # Serve on another port (or set PORT)
//! sheetsite worksheets               # List the spreadsheet's worksheets
//! sheetsite worksheets --format json # Same, as JSON
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;


#[derive(Debug, Parser)]
#[command(name = "sheetsite")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the site
    Serve(commands::serve::ServeArgs),

    /// List the worksheets of the configured spreadsheet
    Worksheets(commands::worksheets::WorksheetsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().context("failed to parse log directive")?),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Serve(args) => commands::serve::run(args).await,
        Command::Worksheets(args) => commands::worksheets::run(args).await,
    }
}
