//! HTTP server for the list and detail pages

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::PostCatalogLoader;
use crate::filter::{collect_tags, FilterState};
use crate::theme::{Theme, ThemeStore};
use crate::Blog;

/// Client hint carrying the viewer's OS color scheme preference
const COLOR_SCHEME_HINT: &str = "sec-ch-prefers-color-scheme";

/// Server state
pub struct ServerState {
    config: SiteConfig,
    loader: PostCatalogLoader,
    themes: Mutex<ThemeStore>,
    static_dir: Option<PathBuf>,
}

impl ServerState {
    pub fn new(blog: &Blog) -> Result<Self> {
        let loader = blog.loader()?;
        let static_dir = loader.source().local_root().map(PathBuf::from);
        Ok(Self {
            config: blog.config.clone(),
            themes: Mutex::new(blog.theme_store(None)?),
            loader,
            static_dir,
        })
    }

    fn themes(&self) -> MutexGuard<'_, ThemeStore> {
        self.themes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Theme for this request: the persisted choice, else this viewer's
    /// system preference. Shared state is left untouched.
    fn theme_for(&self, headers: &HeaderMap) -> Theme {
        self.themes().resolve(system_preference(headers))
    }
}

/// Query parameters of the list page and the posts API
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub q: Option<String>,
}

impl ListQuery {
    fn filter_state(&self) -> FilterState {
        FilterState::new(self.tag.as_deref(), self.q.as_deref())
    }
}

/// Query parameters of the detail page
#[derive(Debug, Default, Deserialize)]
pub struct PostQuery {
    pub file: Option<String>,
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .route("/index.html", get(list_handler))
        .route("/post.html", get(post_handler))
        .route("/api/posts", get(api_posts_handler))
        .route("/api/tags", get(api_tags_handler))
        .route("/theme/toggle", post(toggle_theme_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::new(blog)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn system_preference(headers: &HeaderMap) -> Option<Theme> {
    headers
        .get(COLOR_SCHEME_HINT)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// HTML response that asks the browser for the color scheme hint
fn page(html: String) -> Response {
    let mut response = Html(html).into_response();
    let headers = response.headers_mut();
    headers.insert("accept-ch", HeaderValue::from_static("Sec-CH-Prefers-Color-Scheme"));
    headers.insert(header::VARY, HeaderValue::from_static("Sec-CH-Prefers-Color-Scheme"));
    response
}

async fn list_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Response {
    let theme = state.theme_for(&headers);
    let list = state.loader.list_page(&query.filter_state()).await;
    page(list.to_html(&state.config, theme))
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PostQuery>,
    headers: HeaderMap,
) -> Response {
    let theme = state.theme_for(&headers);
    // Dropping this future (client gone) drops the view scope and cancels its tasks
    let post = state.loader.post_page(query.file.as_deref(), theme).await;
    page(post.to_html(&state.config, theme))
}

async fn api_posts_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    match state.loader.fetch_manifest().await {
        Ok(posts) => Json(query.filter_state().visible(&posts)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load post manifest: {}", e);
            (StatusCode::BAD_GATEWAY, "Could not load posts.").into_response()
        }
    }
}

async fn api_tags_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.loader.fetch_manifest().await {
        Ok(posts) => Json(collect_tags(&posts)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load post manifest: {}", e);
            (StatusCode::BAD_GATEWAY, "Could not load posts.").into_response()
        }
    }
}

async fn toggle_theme_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Response {
    // Flip the theme this viewer was shown, not the last one resolved
    let mut themes = state.themes();
    let shown = themes.resolve(system_preference(&headers));
    if let Err(e) = themes.set(shown.toggled()) {
        tracing::error!("Failed to persist theme: {}", e);
    }
    drop(themes);

    Redirect::to(&referer_path(&headers)).into_response()
}

/// Path and query of a same-origin Referer, else `/`
fn referer_path(headers: &HeaderMap) -> String {
    let Some(referer) = headers.get(header::REFERER).and_then(|v| v.to_str().ok()) else {
        return "/".to_string();
    };
    if referer.starts_with('/') && !referer.starts_with("//") {
        return referer.to_string();
    }

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    let Ok(url) = reqwest::Url::parse(referer) else {
        return "/".to_string();
    };
    let authority = match (url.host_str(), url.port()) {
        (Some(h), Some(port)) => format!("{}:{}", h, port),
        (Some(h), None) => h.to_string(),
        (None, _) => return "/".to_string(),
    };
    if host != Some(authority.as_str()) {
        tracing::debug!("Ignoring cross-origin referer {}", referer);
        return "/".to_string();
    }

    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

/// Serve static assets from a local source directory
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let Some(dir) = &state.static_dir else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    let mut service = ServeDir::new(dir);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"[
        {"title": "A", "date": "2024-01-01", "excerpt": "e", "category": "c", "tags": ["x", "y"], "file": "a.md"},
        {"title": "B", "date": "2024-01-02", "excerpt": "other", "category": "", "tags": ["z"], "file": "b.md"}
    ]"#;

    async fn spawn_server() -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("posts.json"), MANIFEST).unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages/a.md"), "---\ntitle: Hello\n---\nbody").unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "title: Test\nhighlight:\n  delay_ms: 1\ncomments:\n  delay_ms: 1\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        let app = router(Arc::new(ServerState::new(&blog).unwrap()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (dir, format!("http://{}", addr))
    }

    #[tokio::test]
    async fn test_list_and_api() {
        let (_dir, base) = spawn_server().await;
        let client = reqwest::Client::new();

        let html = client.get(format!("{}/?tag=x", base)).send().await.unwrap().text().await.unwrap();
        assert_eq!(html.matches("post-card").count(), 1);
        assert!(html.contains(r#"class="filter-btn active" data-tag="x""#));

        let json = client
            .get(format!("{}/api/posts?q=OTHER", base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let posts: Vec<crate::content::PostSummary> = serde_json::from_str(&json).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "B");

        let json = client.get(format!("{}/api/tags", base)).send().await.unwrap().text().await.unwrap();
        assert_eq!(json, r#"["x","y","z"]"#);

        let raw = client.get(format!("{}/posts.json", base)).send().await.unwrap();
        assert_eq!(raw.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_post_page_and_theme() {
        let (dir, base) = spawn_server().await;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        let html = client
            .get(format!("{}/post.html?file=a.md", base))
            .header(COLOR_SCHEME_HINT, "dark")
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains("<title>Hello - Test</title>"));
        assert!(html.contains(r#"data-theme="dark""#));
        assert!(html.contains("giscus.app/client.js"));

        let html = client.get(format!("{}/post.html", base)).send().await.unwrap().text().await.unwrap();
        assert!(html.contains("Could not find the post file."));

        let response = client
            .post(format!("{}/theme/toggle", base))
            .header(COLOR_SCHEME_HINT, "dark")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert!(dir.path().join(".blogdeck/storage.json").exists());

        // An explicit choice wins over the system preference
        let html = client
            .get(format!("{}/", base))
            .header(COLOR_SCHEME_HINT, "dark")
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains(r#"data-theme="light""#));
    }

    #[tokio::test]
    async fn test_system_preference_is_per_viewer() {
        let (dir, base) = spawn_server().await;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        let hinted = client
            .get(format!("{}/", base))
            .header(COLOR_SCHEME_HINT, "\"dark\"")
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(hinted.contains(r#"data-theme="dark""#));

        let unhinted = client.get(format!("{}/", base)).send().await.unwrap().text().await.unwrap();
        assert!(unhinted.contains(r#"data-theme="light""#));
        assert!(!dir.path().join(".blogdeck/storage.json").exists());

        // The hinted viewer was shown dark, so toggling persists light
        let response = client
            .post(format!("{}/theme/toggle", base))
            .header(COLOR_SCHEME_HINT, "dark")
            .send()
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        let raw = fs::read_to_string(dir.path().join(".blogdeck/storage.json")).unwrap();
        assert!(raw.contains("\"light\""));
    }

    #[tokio::test]
    async fn test_toggle_redirects_only_same_origin() {
        let (_dir, base) = spawn_server().await;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        let location = |response: reqwest::Response| {
            response.headers()[header::LOCATION].to_str().unwrap().to_string()
        };

        let response = client
            .post(format!("{}/theme/toggle", base))
            .header(header::REFERER, format!("{}/post.html?file=a.md", base))
            .send()
            .await
            .unwrap();
        assert_eq!(location(response), "/post.html?file=a.md");

        for referer in ["https://elsewhere.example/phish", "//elsewhere.example/x", "not a url"] {
            let response = client
                .post(format!("{}/theme/toggle", base))
                .header(header::REFERER, referer)
                .send()
                .await
                .unwrap();
            assert_eq!(location(response), "/", "referer {:?}", referer);
        }
    }
}
