//! Google Sheets client: document metadata and worksheet rows.

use serde::Deserialize;
use tracing::debug;

mod types;
use types::{Spreadsheet, ValueRange};

use crate::{
    config::SiteConfig,
    error::SiteError,
    model::{Cell, Row, SpreadsheetInfo, WorksheetInfo},
};

const METADATA_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties";

/// Read-only client for one spreadsheet.
///
/// Every call is a single attempt; failures are returned to the caller
/// without retrying.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    api_base: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl SheetsClient {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.sheets_endpoint.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            api_base: config.api_url.clone(),
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Fetches the document title and its worksheets, with each worksheet's
    /// `api_url` set to the configured API base plus its title.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::RemoteFetch`] if the request fails, the API
    /// answers with a non-success status, or the body cannot be decoded.
    pub async fn fetch_metadata(&self) -> Result<SpreadsheetInfo, SiteError> {
        const OPERATION: &str = "metadata";

        debug!(spreadsheet_id = %self.spreadsheet_id, "fetching spreadsheet metadata");

        let url = self.url_with_segments(OPERATION, &["spreadsheets", &self.spreadsheet_id])?;
        let spreadsheet: Spreadsheet = self
            .get_json(OPERATION, url, &[("fields", METADATA_FIELDS.to_string())])
            .await?;

        let worksheets = spreadsheet
            .sheets
            .into_iter()
            .enumerate()
            .map(|(index, sheet)| {
                let properties = sheet.properties;
                let mut worksheet = WorksheetInfo::new(
                    properties.sheet_id,
                    index,
                    properties.title,
                    &self.api_base,
                );
                if let Some(grid) = properties.grid_properties {
                    worksheet.row_count = grid.row_count;
                    worksheet.column_count = grid.column_count;
                }
                worksheet
            })
            .collect();

        Ok(SpreadsheetInfo {
            id: spreadsheet.spreadsheet_id,
            title: spreadsheet.properties.title,
            worksheets,
        })
    }

    /// Fetches every row of `worksheet`. The first sheet row supplies the
    /// column headers.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::RemoteFetch`] if the request fails, the API
    /// answers with a non-success status, or the body cannot be decoded.
    pub async fn fetch_rows(&self, worksheet: &WorksheetInfo) -> Result<Vec<Row>, SiteError> {
        const OPERATION: &str = "rows";

        debug!(
            spreadsheet_id = %self.spreadsheet_id,
            worksheet = %worksheet.title,
            "fetching worksheet rows"
        );

        let range = sheet_range(&worksheet.title);
        let url = self.url_with_segments(
            OPERATION,
            &["spreadsheets", &self.spreadsheet_id, "values", &range],
        )?;
        let response: ValueRange = self.get_json(OPERATION, url, &[]).await?;

        Ok(rows_from_values(response.values))
    }

    fn url_with_segments(
        &self,
        operation: &'static str,
        segments: &[&str],
    ) -> Result<reqwest::Url, SiteError> {
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|err| SiteError::remote(operation, err))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| SiteError::remote(operation, "sheets_endpoint must be an absolute URL"))?;
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        operation: &'static str,
        url: reqwest::Url,
        query: &[(&str, String)],
    ) -> Result<T, SiteError> {
        let mut request = self
            .http
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SiteError::remote(operation, err))?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|err| SiteError::remote(operation, err))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SiteError::remote(
                operation,
                format!("Google Sheets API request failed ({status}): {body}"),
            ))
        }
    }
}

/// A1 range covering a whole sheet. Quoting keeps titles with spaces or
/// punctuation from being read as cell references.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn rows_from_values(values: Vec<Vec<serde_json::Value>>) -> Vec<Row> {
    let mut values = values.into_iter();
    let Some(header) = values.next() else {
        return Vec::new();
    };

    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .map(|(position, value)| (position, cell_text(value)))
        .filter(|(_, name)| !name.trim().is_empty())
        .collect();

    values
        .map(|row| Row {
            cells: columns
                .iter()
                .map(|(position, name)| Cell {
                    column: name.clone(),
                    value: row.get(*position).map(cell_text).unwrap_or_default(),
                })
                .collect(),
        })
        .collect()
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
