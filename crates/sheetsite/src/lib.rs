//! A small website rendered live from a Google Sheets spreadsheet.
//!
//! Each worksheet tab becomes a page and its rows become an HTML table,
//! wrapped in a single layout template. Nothing is cached: every request
//! fetches the spreadsheet metadata, then the rows of the requested tab.
//!
//! # Key Components
//!
//! - **Configuration**: [`SiteConfig`] loaded from `sheetsite.toml`
//! - **Spreadsheet Client**: [`SheetsClient`] for the Google Sheets API v4
//! - **Tab Resolver**: [`resolve`] maps a requested tab onto a worksheet
//! - **Views**: [`Views`] renders mustache templates from a [`ViewModel`]
//! - **Page Handler**: [`router`] serves `/`, `/{tab}` and `/public`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sheetsite::{SiteConfig, SiteState, router};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SiteConfig::load("sheetsite.toml")?;
//! let app = router(Arc::new(SiteState::new(config)?));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handler;
mod model;
mod resolver;
mod sheets;
mod view;

pub use config::{ConfigError, DEFAULT_CONFIG_FILE, DEFAULT_SHEETS_ENDPOINT, SiteConfig};
pub use error::{REMOTE_FETCH_FAILED, SiteError, WORKSHEET_NOT_FOUND};
pub use handler::{SiteState, load_page, respond, router};
pub use model::{Cell, Row, SpreadsheetInfo, WorksheetInfo, page_href};
pub use resolver::{RequestedTab, TabRef, resolve};
pub use sheets::SheetsClient;
pub use view::{Column, PageData, ViewModel, Views, ViewsError};
