//! Maps a requested tab onto a worksheet index.

use serde::{Deserialize, Serialize};

use crate::{error::SiteError, model::SpreadsheetInfo};

/// A worksheet named by position or by title.
///
/// Deserializes from a TOML integer or string, so `default_tab = 0` and
/// `default_tab = "Trees"` both work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TabRef {
    Index(usize),
    Title(String),
}

/// What the route asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedTab {
    /// The bare root path; the configured default applies.
    Default,
    ByIndex(usize),
    ByTitle(String),
}

impl RequestedTab {
    /// Replaces [`RequestedTab::Default`] with the configured default tab.
    ///
    /// Returns `None` when the root path was requested and no default is
    /// configured, which renders the worksheet list without rows.
    pub fn into_tab_ref(self, default_tab: Option<&TabRef>) -> Option<TabRef> {
        match self {
            Self::Default => default_tab.cloned(),
            Self::ByIndex(index) => Some(TabRef::Index(index)),
            Self::ByTitle(title) => Some(TabRef::Title(title)),
        }
    }
}

/// Returns the index of the worksheet `tab` refers to.
///
/// Titles match exactly and case-sensitively against the first worksheet
/// with that title. An empty title never matches. Indexes outside the
/// worksheet list are reported as not found.
///
/// # Errors
///
/// Returns [`SiteError::WorksheetNotFound`] when nothing matches.
pub fn resolve(tab: &TabRef, info: &SpreadsheetInfo) -> Result<usize, SiteError> {
    match tab {
        TabRef::Index(index) if *index < info.worksheets.len() => Ok(*index),
        TabRef::Index(_) => Err(SiteError::WorksheetNotFound),
        TabRef::Title(title) if title.is_empty() => Err(SiteError::WorksheetNotFound),
        TabRef::Title(title) => info
            .worksheets
            .iter()
            .position(|worksheet| worksheet.title == *title)
            .ok_or(SiteError::WorksheetNotFound),
    }
}
