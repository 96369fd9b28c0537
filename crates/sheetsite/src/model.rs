//! Spreadsheet data as the site sees it. Every value here lives for a
//! single request.

use reqwest::Url;
use serde::Serialize;

/// Document metadata: its worksheets in tab order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetInfo {
    pub id: String,
    pub title: String,
    pub worksheets: Vec<WorksheetInfo>,
}

/// One tab of the spreadsheet, which becomes one page of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksheetInfo {
    /// Provider id of the sheet (`gid` in spreadsheet URLs).
    pub sheet_id: u64,
    pub index: usize,
    pub title: String,
    pub row_count: u64,
    pub column_count: u64,
    /// Configured API base followed by the title, unencoded.
    pub api_url: String,
    /// Link to this worksheet's page on the site. Empty when `linked` is
    /// false.
    pub href: String,
    /// False for titles no request path can reach.
    pub linked: bool,
    /// Set only on the worksheet being displayed.
    pub current: bool,
}

impl WorksheetInfo {
    pub fn new(sheet_id: u64, index: usize, title: String, api_base: &str) -> Self {
        let href = page_href(&title);
        Self {
            sheet_id,
            index,
            api_url: format!("{api_base}{title}"),
            linked: href.is_some(),
            href: href.unwrap_or_default(),
            title,
            row_count: 0,
            column_count: 0,
            current: false,
        }
    }
}

/// One spreadsheet row: cell values keyed by column header, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub column: String,
    pub value: String,
}

impl Row {
    /// Returns the value under `column`, if the row has that column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|cell| cell.column == column)
            .map(|cell| cell.value.as_str())
    }
}

/// Site path for a worksheet title, percent-encoded as one path segment.
///
/// Returns `None` for `.` and `..`: clients collapse those segments, encoded
/// or not, so a link would land on another page.
pub fn page_href(title: &str) -> Option<String> {
    if title == "." || title == ".." {
        return None;
    }
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return Some(format!("/{title}"));
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(title);
    }
    Some(url.path().to_string())
}
