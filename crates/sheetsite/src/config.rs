//! Site configuration loaded from `sheetsite.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::resolver::TabRef;

/// Google Sheets API v4 base URL.
pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sheetsite.toml";

/// Errors that can occur when loading the site configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the config file.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field holds a value the site cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Static site settings. Loaded once and shared read-only by every request.
///
/// # Example
///
/// ```toml
/// spreadsheet_id = "1C7Ojs1i8duxWBmBYPtMTDVLRF7mu-WMTEjKi1-xCuE8"
/// site_title = "Google Sheet Website: Plants"
/// default_tab = 0          # or "Trees"; omit for a plain list of tabs
/// api_url = "https://example.com/api/"
/// favicon_url = "https://example.com/favicon.ico"
/// api_key = "AIza..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// The long id in the spreadsheet URL, after `/d/`.
    pub spreadsheet_id: String,

    #[serde(default = "default_site_title")]
    pub site_title: String,

    /// Worksheet shown at `/`. `None` renders the list of worksheets only.
    #[serde(default)]
    pub default_tab: Option<TabRef>,

    /// Prefix joined with each worksheet title to form its `api_url`.
    #[serde(default)]
    pub api_url: String,

    #[serde(default)]
    pub favicon_url: String,

    #[serde(default = "default_sheets_endpoint")]
    pub sheets_endpoint: String,

    /// API key for spreadsheets shared publicly.
    #[serde(default)]
    pub api_key: Option<String>,

    /// OAuth bearer token for private spreadsheets.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Static assets served under `/public`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Directory with `layout.mustache`, `index.mustache` and
    /// `error.mustache` replacing the built-in views.
    #[serde(default)]
    pub views_dir: Option<PathBuf>,
}

fn default_site_title() -> String {
    "Google Sheet Website".to_string()
}

fn default_sheets_endpoint() -> String {
    DEFAULT_SHEETS_ENDPOINT.to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl SiteConfig {
    /// Creates a config for `spreadsheet_id` with every other field at its
    /// default.
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            site_title: default_site_title(),
            default_tab: None,
            api_url: String::new(),
            favicon_url: String::new(),
            sheets_endpoint: default_sheets_endpoint(),
            api_key: None,
            access_token: None,
            public_dir: default_public_dir(),
            views_dir: None,
        }
    }

    /// Loads the config from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or a required field is
    /// blank.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validated()
    }

    /// Checks required fields and normalizes the Sheets endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `spreadsheet_id` or
    /// `sheets_endpoint` is blank.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "spreadsheet_id must not be empty".to_string(),
            ));
        }

        let endpoint = self.sheets_endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(ConfigError::Invalid(
                "sheets_endpoint must not be empty".to_string(),
            ));
        }
        self.sheets_endpoint = endpoint.to_string();

        self.api_key = self.api_key.filter(|key| !key.trim().is_empty());
        self.access_token = self.access_token.filter(|token| !token.trim().is_empty());

        Ok(self)
    }
}
