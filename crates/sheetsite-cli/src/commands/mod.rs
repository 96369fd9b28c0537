pub mod serve;
pub mod worksheets;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sheetsite::{DEFAULT_CONFIG_FILE, SiteConfig};

/// Location of the site config file.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Path to the site config file.
    #[arg(short, long, env = "SHEETSITE_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<SiteConfig> {
        SiteConfig::load(&self.config)
            .with_context(|| format!("failed to load config from {}", self.config.display()))
    }
}
