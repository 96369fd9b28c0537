//! View data and mustache rendering.
//!
//! Each response renders one body template (`index` or `error`) and wraps
//! the result in the shared `layout` template through its `{{{body}}}` tag.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    error::SiteError,
    model::{Row, SpreadsheetInfo, WorksheetInfo},
};

const LAYOUT_TEMPLATE: &str = include_str!("../views/layout.mustache");
const INDEX_TEMPLATE: &str = include_str!("../views/index.mustache");
const ERROR_TEMPLATE: &str = include_str!("../views/error.mustache");

/// Errors raised while loading view templates.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ViewsError {
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to compile template {name}: {source}")]
    Compile {
        name: &'static str,
        source: mustache::Error,
    },
}

/// Data handed to the templates for one response.
#[derive(Debug, Serialize)]
pub struct ViewModel<'a> {
    pub title: &'a str,
    pub favicon: &'a str,
    pub data: Option<PageData>,
    pub error: Option<String>,
}

impl<'a> ViewModel<'a> {
    pub fn page(title: &'a str, favicon: &'a str, data: PageData) -> Self {
        Self {
            title,
            favicon,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(title: &'a str, favicon: &'a str, message: impl Into<String>) -> Self {
        Self {
            title,
            favicon,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Spreadsheet data for a page.
///
/// `current_worksheet`, `columns` and `rows` are present only when a
/// worksheet was resolved and its rows fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub id: String,
    pub title: String,
    pub worksheets: Vec<WorksheetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_worksheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    /// Lets templates wrap the row table in a section.
    pub has_rows: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
}

impl PageData {
    /// The worksheet list alone, with nothing marked current.
    pub fn directory(info: SpreadsheetInfo) -> Self {
        Self {
            id: info.id,
            title: info.title,
            worksheets: info.worksheets,
            current_worksheet: None,
            columns: None,
            rows: None,
            has_rows: false,
        }
    }

    /// The worksheet at `index` marked current, with its rows attached.
    ///
    /// `index` must come from [`crate::resolver::resolve`] against `info`.
    pub fn worksheet(mut info: SpreadsheetInfo, index: usize, rows: Vec<Row>) -> Self {
        let mut current_worksheet = None;
        if let Some(worksheet) = info.worksheets.get_mut(index) {
            worksheet.current = true;
            current_worksheet = Some(worksheet.title.clone());
        }

        let columns = rows
            .first()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|cell| Column {
                        name: cell.column.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: info.id,
            title: info.title,
            worksheets: info.worksheets,
            current_worksheet,
            columns: Some(columns),
            rows: Some(rows),
            has_rows: true,
        }
    }
}

#[derive(Serialize)]
struct LayoutModel<'a> {
    title: &'a str,
    favicon: &'a str,
    data: Option<&'a PageData>,
    error: Option<&'a str>,
    body: String,
}

/// The compiled `layout`, `index` and `error` templates.
pub struct Views {
    layout: mustache::Template,
    index: mustache::Template,
    error: mustache::Template,
}

impl std::fmt::Debug for Views {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Views").finish_non_exhaustive()
    }
}

impl Views {
    /// Compiles the templates bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled template fails to compile.
    pub fn builtin() -> Result<Self, ViewsError> {
        Ok(Self {
            layout: compile("layout", LAYOUT_TEMPLATE)?,
            index: compile("index", INDEX_TEMPLATE)?,
            error: compile("error", ERROR_TEMPLATE)?,
        })
    }

    /// Compiles `layout.mustache`, `index.mustache` and `error.mustache`
    /// from `dir`, or the bundled templates when `dir` is `None`. A file
    /// missing from `dir` falls back to its bundled version.
    ///
    /// # Errors
    ///
    /// Returns an error if a template file exists but cannot be read or
    /// compiled.
    pub fn load(dir: Option<&Path>) -> Result<Self, ViewsError> {
        let Some(dir) = dir else {
            return Self::builtin();
        };

        Ok(Self {
            layout: load_template(dir, "layout", LAYOUT_TEMPLATE)?,
            index: load_template(dir, "index", INDEX_TEMPLATE)?,
            error: load_template(dir, "error", ERROR_TEMPLATE)?,
        })
    }

    /// Renders the main page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Render`] if a template fails to render.
    pub fn render_page(&self, model: &ViewModel<'_>) -> Result<String, SiteError> {
        self.render_with_layout(&self.index, model)
    }

    /// Renders the error page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Render`] if a template fails to render.
    pub fn render_error(&self, model: &ViewModel<'_>) -> Result<String, SiteError> {
        self.render_with_layout(&self.error, model)
    }

    fn render_with_layout(
        &self,
        body: &mustache::Template,
        model: &ViewModel<'_>,
    ) -> Result<String, SiteError> {
        let body = body.render_to_string(model)?;
        let layout = LayoutModel {
            title: model.title,
            favicon: model.favicon,
            data: model.data.as_ref(),
            error: model.error.as_deref(),
            body,
        };
        Ok(self.layout.render_to_string(&layout)?)
    }
}

fn compile(name: &'static str, source: &str) -> Result<mustache::Template, ViewsError> {
    mustache::compile_str(source).map_err(|source| ViewsError::Compile { name, source })
}

fn load_template(
    dir: &Path,
    name: &'static str,
    bundled: &str,
) -> Result<mustache::Template, ViewsError> {
    let path = dir.join(format!("{name}.mustache"));
    if !path.is_file() {
        return compile(name, bundled);
    }
    let source = std::fs::read_to_string(&path).map_err(|source| ViewsError::Io {
        path: path.clone(),
        source,
    })?;
    compile(name, &source)
}
