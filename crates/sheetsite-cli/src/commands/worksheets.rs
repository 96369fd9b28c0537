//! List the worksheets of the configured spreadsheet.
//!
//! Useful for checking that the spreadsheet is reachable and for finding the
//! exact titles and indexes to use as `default_tab`.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use sheetsite::{SheetsClient, SpreadsheetInfo};

use super::ConfigArgs;

/// Command-line arguments for the worksheets command.
#[derive(Debug, Args)]
pub struct WorksheetsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format: "table" for a human-readable table or "json"
    #[arg(short, long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,
}

pub async fn run(args: &WorksheetsArgs) -> Result<()> {
    let config = args.config.load()?;
    let info = SheetsClient::new(&config)
        .fetch_metadata()
        .await
        .context("failed to fetch spreadsheet metadata")?;

    println!("{}", format_worksheets(&info, &args.format)?);
    Ok(())
}

fn format_worksheets(info: &SpreadsheetInfo, format: &str) -> Result<String> {
    if format == "json" {
        return serde_json::to_string_pretty(&info.worksheets)
            .context("failed to serialize worksheets");
    }

    if info.worksheets.is_empty() {
        return Ok(format!("{} has no worksheets", info.title));
    }

    let mut out = format!(
        "{:<6} {:<30} {}\n",
        style("INDEX").bold(),
        style("TITLE").bold(),
        style("API URL").bold()
    );
    out.push_str(&"-".repeat(80));
    out.push('\n');
    for worksheet in &info.worksheets {
        out.push_str(&format!(
            "{:<6} {:<30} {}\n",
            worksheet.index, worksheet.title, worksheet.api_url
        ));
    }
    out.push_str(&format!(
        "\n{} {} worksheet(s) in {}",
        style("✓").green(),
        info.worksheets.len(),
        info.title
    ));
    Ok(out)
}
