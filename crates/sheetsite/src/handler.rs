//! HTTP surface: page routes, static assets and the per-request flow.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, warn};

use crate::{
    config::SiteConfig,
    error::SiteError,
    resolver::{RequestedTab, resolve},
    sheets::SheetsClient,
    view::{PageData, ViewModel, Views, ViewsError},
};

/// Read-only state shared by every request.
#[derive(Debug)]
pub struct SiteState {
    pub config: SiteConfig,
    pub client: SheetsClient,
    pub views: Views,
}

impl SiteState {
    /// Builds the client and compiles the views for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a template in `views_dir` cannot be read or
    /// compiled.
    pub fn new(config: SiteConfig) -> Result<Self, ViewsError> {
        let views = Views::load(config.views_dir.as_deref())?;
        let client = SheetsClient::new(&config);
        Ok(Self {
            config,
            client,
            views,
        })
    }
}

/// Builds the site router: `/`, `/{tab}` and static files under `/public`.
/// Any other path renders the error page.
pub fn router(state: Arc<SiteState>) -> Router {
    let assets = ServeDir::new(&state.config.public_dir);
    Router::new()
        .route("/", get(root_page))
        .route("/{tab}", get(tab_page))
        .nest_service("/public", assets)
        .fallback(unmatched_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_page(State(state): State<Arc<SiteState>>) -> Response {
    respond(&state, RequestedTab::Default).await
}

async fn tab_page(
    State(state): State<Arc<SiteState>>,
    tab: Result<Path<String>, PathRejection>,
) -> Response {
    match tab {
        Ok(Path(tab)) => respond(&state, RequestedTab::ByTitle(tab)).await,
        Err(rejection) => {
            warn!(error = %rejection, "undecodable worksheet segment");
            error_page(&state, &SiteError::WorksheetNotFound)
        }
    }
}

async fn unmatched_page(State(state): State<Arc<SiteState>>) -> Response {
    error_page(&state, &SiteError::WorksheetNotFound)
}

/// Runs one request to completion: the main page, or the error page on the
/// first failure.
pub async fn respond(state: &SiteState, tab: RequestedTab) -> Response {
    let title = state.config.site_title.as_str();
    let favicon = state.config.favicon_url.as_str();

    let result = load_page(state, tab)
        .await
        .and_then(|data| state.views.render_page(&ViewModel::page(title, favicon, data)));

    match result {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            if matches!(err, SiteError::WorksheetNotFound) {
                warn!(error = %err, "page request failed");
            } else {
                error!(error = %err, "page request failed");
            }
            error_page(state, &err)
        }
    }
}

/// Fetches metadata, resolves the tab and, when one resolves, its rows.
///
/// # Errors
///
/// Returns the first failure: a remote fetch error, or
/// [`SiteError::WorksheetNotFound`] when the tab matches nothing.
pub async fn load_page(state: &SiteState, tab: RequestedTab) -> Result<PageData, SiteError> {
    let info = state.client.fetch_metadata().await?;

    let Some(tab) = tab.into_tab_ref(state.config.default_tab.as_ref()) else {
        return Ok(PageData::directory(info));
    };

    let index = resolve(&tab, &info)?;
    let rows = state.client.fetch_rows(&info.worksheets[index]).await?;

    Ok(PageData::worksheet(info, index, rows))
}

fn error_page(state: &SiteState, err: &SiteError) -> Response {
    let model = ViewModel::error(
        &state.config.site_title,
        &state.config.favicon_url,
        err.user_message(),
    );

    match state.views.render_error(&model) {
        Ok(html) => (err.status(), Html(html)).into_response(),
        Err(render_err) => {
            error!(error = %render_err, "failed to render error page");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::oneshot;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;
    use crate::resolver::TabRef;

    struct TestSite {
        addr: std::net::SocketAddr,
        shutdown: Option<oneshot::Sender<()>>,
        server: tokio::task::JoinHandle<()>,
    }

    impl TestSite {
        async fn start(config: SiteConfig) -> Self {
            let state = Arc::new(SiteState::new(config).expect("views should compile"));
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind test listener");
            let addr = listener.local_addr().expect("listener address");
            let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
            let server = tokio::spawn(async move {
                let _ = axum::serve(listener, router(state))
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
            Self {
                addr,
                shutdown: Some(shutdown_tx),
                server,
            }
        }

        async fn get(&self, path: &str) -> (StatusCode, String) {
            let response = reqwest::get(format!("http://{}{path}", self.addr))
                .await
                .expect("request should reach test site");
            let status = StatusCode::from_u16(response.status().as_u16()).expect("valid status");
            let body = response.text().await.expect("response body");
            (status, body)
        }

        async fn stop(mut self) {
            if let Some(shutdown) = self.shutdown.take() {
                let _ = shutdown.send(());
            }
            let _ = self.server.await;
        }
    }

    fn test_config(endpoint: &str) -> SiteConfig {
        let mut config = SiteConfig::new("doc123");
        config.sheets_endpoint = endpoint.to_string();
        config.site_title = "Plant Site".to_string();
        config.api_url = "https://api.example/".to_string();
        config
    }

    fn test_state(endpoint: &str, default_tab: Option<TabRef>) -> SiteState {
        let mut config = test_config(endpoint);
        config.default_tab = default_tab;
        SiteState::new(config).expect("views should compile")
    }

    async fn mount_metadata(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/spreadsheets/doc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "doc123",
                "properties": { "title": "Plants" },
                "sheets": [
                    { "properties": { "sheetId": 0, "title": "Trees", "index": 0 } },
                    { "properties": { "sheetId": 1, "title": "Shrubs", "index": 1 } }
                ]
            })))
            .mount(server)
            .await;
    }

    async fn mount_rows(server: &MockServer, range: &str, values: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/spreadsheets/doc123/values/{range}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": values
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_load_page_by_title_marks_worksheet_current() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        mount_rows(
            &server,
            "'Shrubs'",
            json!([["Name", "Height"], ["Boxwood", "1m"], ["Holly", "3m"]]),
        )
        .await;
        let state = test_state(&server.uri(), Some(TabRef::Index(0)));

        let data = load_page(&state, RequestedTab::ByTitle("Shrubs".to_string()))
            .await
            .unwrap();

        assert_eq!(data.current_worksheet.as_deref(), Some("Shrubs"));
        assert!(data.worksheets[1].current);
        assert!(!data.worksheets[0].current);
        let rows = data.rows.expect("rows should be attached");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some("Boxwood"));
        assert_eq!(rows[1].get("Height"), Some("3m"));
    }

    #[tokio::test]
    async fn test_load_page_default_index_fetches_that_worksheet() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        mount_rows(&server, "'Trees'", json!([["Name"], ["Oak"]])).await;
        let state = test_state(&server.uri(), Some(TabRef::Index(0)));

        let data = load_page(&state, RequestedTab::Default).await.unwrap();

        assert_eq!(data.current_worksheet.as_deref(), Some("Trees"));
        assert!(data.worksheets[0].current);
    }

    #[tokio::test]
    async fn test_load_page_default_title_fetches_that_worksheet() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        mount_rows(&server, "'Shrubs'", json!([["Name"], ["Holly"]])).await;
        let state = test_state(&server.uri(), Some(TabRef::Title("Shrubs".to_string())));

        let data = load_page(&state, RequestedTab::Default).await.unwrap();

        assert_eq!(data.current_worksheet.as_deref(), Some("Shrubs"));
    }

    #[tokio::test]
    async fn test_load_page_without_default_skips_rows() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/doc123/values/'Trees'"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let state = test_state(&server.uri(), None);

        let data = load_page(&state, RequestedTab::Default).await.unwrap();

        assert!(data.rows.is_none());
        assert!(data.current_worksheet.is_none());
        assert!(data.worksheets.iter().all(|w| !w.current));
    }

    #[tokio::test]
    async fn test_load_page_unknown_title_is_not_found() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        let state = test_state(&server.uri(), Some(TabRef::Index(0)));

        let err = load_page(&state, RequestedTab::ByTitle("Unknown".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, SiteError::WorksheetNotFound));
    }

    #[tokio::test]
    async fn test_load_page_default_index_out_of_range_is_not_found() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        let state = test_state(&server.uri(), Some(TabRef::Index(5)));

        let err = load_page(&state, RequestedTab::Default).await.unwrap_err();

        assert!(matches!(err, SiteError::WorksheetNotFound));
    }

    #[tokio::test]
    async fn test_load_page_metadata_failure_skips_row_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/doc123"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/doc123/values/'Trees'"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let state = test_state(&server.uri(), Some(TabRef::Index(0)));

        let err = load_page(&state, RequestedTab::Default).await.unwrap_err();

        assert!(matches!(err, SiteError::RemoteFetch { operation: "metadata", .. }));
    }

    #[tokio::test]
    async fn test_site_serves_worksheet_page() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        mount_rows(
            &server,
            "'Shrubs'",
            json!([["Name", "Height"], ["Boxwood", "1m"]]),
        )
        .await;
        let site = TestSite::start(test_config(&server.uri())).await;

        let (status, body) = site.get("/Shrubs").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Plant Site</title>"));
        assert!(body.contains("<h2>Shrubs</h2>"));
        assert!(body.contains("<td>Boxwood</td>"));
        assert!(body.contains(r#"<li class="current">"#));
        site.stop().await;
    }

    #[tokio::test]
    async fn test_site_root_without_default_lists_worksheets() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        let site = TestSite::start(test_config(&server.uri())).await;

        let (status, body) = site.get("/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"href="/Trees""#));
        assert!(body.contains(r#"href="/Shrubs""#));
        assert!(body.contains("https://api.example/Shrubs"));
        assert!(!body.contains("<table"));
        site.stop().await;
    }

    #[tokio::test]
    async fn test_site_unknown_worksheet_renders_error_page() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        let site = TestSite::start(test_config(&server.uri())).await;

        let (status, body) = site.get("/Unknown").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Worksheet not found."));
        assert!(body.contains("<title>Plant Site</title>"));
        site.stop().await;
    }

    #[tokio::test]
    async fn test_site_remote_failure_hides_provider_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("secret quota detail"))
            .mount(&server)
            .await;
        let site = TestSite::start(test_config(&server.uri())).await;

        let (status, body) = site.get("/Trees").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("Unable to load the spreadsheet."));
        assert!(!body.contains("secret quota detail"));
        site.stop().await;
    }

    #[tokio::test]
    async fn test_site_requests_do_not_share_error_state() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/doc123/values/'Trees'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "values": [["Name"], ["Oak"]]
            })))
            .mount(&server)
            .await;
        let site = TestSite::start(test_config(&server.uri())).await;

        let (not_found, _) = site.get("/Unknown").await;
        let (status, body) = site.get("/Trees").await;

        assert_eq!(not_found, StatusCode::NOT_FOUND);
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("Worksheet not found."));
        assert!(body.contains("<td>Oak</td>"));
        site.stop().await;
    }

    #[tokio::test]
    async fn test_site_invalid_utf8_segment_renders_error_page() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        let site = TestSite::start(test_config(&server.uri())).await;

        let (status, body) = site.get("/%FF").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("<title>Plant Site</title>"));
        assert!(body.contains("Worksheet not found."));
        site.stop().await;
    }

    #[tokio::test]
    async fn test_site_unmatched_paths_render_error_page() {
        let server = MockServer::start().await;
        mount_metadata(&server).await;
        let site = TestSite::start(test_config(&server.uri())).await;

        for unmatched in ["/a/b", "/Trees/"] {
            let (status, body) = site.get(unmatched).await;

            assert_eq!(status, StatusCode::NOT_FOUND, "for path: {unmatched}");
            assert!(body.contains("<title>Plant Site</title>"), "for path: {unmatched}");
            assert!(body.contains("Worksheet not found."), "for path: {unmatched}");
        }
        site.stop().await;
    }

    #[tokio::test]
    async fn test_site_encoded_titles_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/doc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "doc123",
                "properties": { "title": "Plants" },
                "sheets": [
                    { "properties": { "sheetId": 0, "title": "Fruit Trees", "index": 0 } },
                    { "properties": { "sheetId": 1, "title": "a/b", "index": 1 } }
                ]
            })))
            .mount(&server)
            .await;
        mount_rows(&server, "'Fruit%20Trees'", json!([["Name"], ["Apple"]])).await;
        mount_rows(&server, "'a%2Fb'", json!([["Name"], ["Slash"]])).await;
        let site = TestSite::start(test_config(&server.uri())).await;

        let (status, body) = site.get("/Fruit%20Trees").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h2>Fruit Trees</h2>"));
        assert!(body.contains("<td>Apple</td>"));
        assert!(body.contains(r#"href="/Fruit%20Trees""#));
        assert!(body.contains(r#"href="/a%2Fb""#));

        let (status, body) = site.get("/a%2Fb").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h2>a/b</h2>"));
        assert!(body.contains("<td>Slash</td>"));
        site.stop().await;
    }
}
