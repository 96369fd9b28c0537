//! Errors raised while serving a page.

use axum::http::StatusCode;

/// Message shown when the requested worksheet does not exist.
pub const WORKSHEET_NOT_FOUND: &str = "Worksheet not found.";

/// Message shown when the spreadsheet provider could not be reached.
pub const REMOTE_FETCH_FAILED: &str = "Unable to load the spreadsheet.";

/// Errors that end a page request and send it to the error view.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SiteError {
    /// A call to the spreadsheet provider failed.
    #[error("{operation} failed: {message}")]
    RemoteFetch {
        /// Which provider call failed (`metadata` or `rows`).
        operation: &'static str,
        /// Provider error payload, status, or transport failure.
        message: String,
    },

    /// No worksheet matched the requested tab.
    #[error("worksheet not found")]
    WorksheetNotFound,

    /// A template failed to render.
    #[error("failed to render template: {0}")]
    Render(#[from] mustache::Error),
}

impl SiteError {
    pub(crate) fn remote(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::RemoteFetch {
            operation,
            message: err.to_string(),
        }
    }

    /// HTTP status used when answering with the error view.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RemoteFetch { .. } => StatusCode::BAD_GATEWAY,
            Self::WorksheetNotFound => StatusCode::NOT_FOUND,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to visitors. Provider details stay in the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RemoteFetch { .. } => REMOTE_FETCH_FAILED,
            Self::WorksheetNotFound => WORKSHEET_NOT_FOUND,
            Self::Render(_) => "Unable to render this page.",
        }
    }
}
