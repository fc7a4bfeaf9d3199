//! Catalog loader - fetches the manifest and post documents and turns them
//! into list and detail pages
//!
//! Failures never escape this module as errors on the page-producing paths:
//! they are logged and replaced by a placeholder fragment. Nothing is
//! retried.

use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

use super::{parse_manifest, ParsedDocument, PostSummary};
use crate::comments::CommentWidget;
use crate::config::SiteConfig;
use crate::content::MarkdownRenderer;
use crate::filter::{collect_tags, FilterState};
use crate::highlight::Highlighter;
use crate::render::layout::{ListPage, PostPage};
use crate::render::{
    fallback_title, PostRenderer, CATALOG_UNAVAILABLE, POST_NOT_SPECIFIED, POST_UNAVAILABLE,
};
use crate::schedule::ViewScope;
use crate::theme::Theme;

/// Why a manifest or document could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("invalid document identifier: {0}")]
    InvalidIdentifier(String),
}

/// Where the manifest and post documents live
#[derive(Debug, Clone)]
pub enum Source {
    /// A directory on disk
    Local(PathBuf),
    /// An http(s) base URL
    Remote { client: reqwest::Client, base: String },
}

impl Source {
    pub fn local<P: AsRef<Path>>(dir: P) -> Self {
        Source::Local(dir.as_ref().to_path_buf())
    }

    pub fn remote(base: &str) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("blogdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Source::Remote {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the configured source against the site's base directory
    pub fn from_config(base_dir: &Path, config: &SiteConfig) -> Result<Self, LoadError> {
        if config.is_remote_source() {
            Self::remote(&config.source)
        } else {
            Ok(Self::local(base_dir.join(&config.source)))
        }
    }

    /// The directory behind a local source
    pub fn local_root(&self) -> Option<&Path> {
        match self {
            Source::Local(dir) => Some(dir),
            Source::Remote { .. } => None,
        }
    }

    /// Fetch a resource as text; `relative` is used as-is below the root
    async fn read(&self, relative: &str) -> Result<String, LoadError> {
        match self {
            Source::Local(dir) => {
                if !is_contained(relative) {
                    return Err(LoadError::InvalidIdentifier(relative.to_string()));
                }
                let path = dir.join(relative);
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
            Source::Remote { client, base } => {
                let url = format!("{}/{}", base, relative);
                let response = client.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
        }
    }
}

/// Whether a relative path stays inside the directory it is joined to
fn is_contained(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Loads posts and builds the pages that show them
pub struct PostCatalogLoader {
    source: Source,
    manifest: String,
    pages_dir: String,
    renderer: PostRenderer,
    highlighter: Option<Arc<Highlighter>>,
    comments: Option<CommentWidget>,
    highlight_delay: Duration,
    comments_delay: Duration,
}

impl PostCatalogLoader {
    /// Create a loader with the collaborators enabled in `config`
    pub fn new(source: Source, config: &SiteConfig) -> Self {
        Self {
            source,
            manifest: config.manifest.clone(),
            pages_dir: config.pages_dir.trim_matches('/').to_string(),
            renderer: PostRenderer::new(MarkdownRenderer::from_config(&config.markdown)),
            highlighter: Highlighter::from_config(&config.highlight).map(Arc::new),
            comments: CommentWidget::from_config(&config.comments),
            highlight_delay: Duration::from_millis(config.highlight.delay_ms),
            comments_delay: Duration::from_millis(config.comments.delay_ms),
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn renderer(&self) -> &PostRenderer {
        &self.renderer
    }

    /// Fetch and parse the post manifest
    pub async fn fetch_manifest(&self) -> Result<Vec<PostSummary>, LoadError> {
        let json = self.source.read(&self.manifest).await?;
        Ok(parse_manifest(&json)?)
    }

    /// Fetch the raw text of one post document
    pub async fn fetch_document(&self, file: &str) -> Result<String, LoadError> {
        let relative = if self.pages_dir.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", self.pages_dir, file)
        };
        self.source.read(&relative).await
    }

    /// Build the list page for already loaded posts
    pub fn list_page_for(&self, posts: &[PostSummary], state: &FilterState) -> ListPage {
        let tags = collect_tags(posts);
        ListPage {
            state: state.clone(),
            filters: self.renderer.render_tag_filters(&tags, state),
            posts: self.renderer.render_summaries(&state.visible(posts)),
        }
    }

    /// Load the manifest and build the list page, or a placeholder page
    pub async fn list_page(&self, state: &FilterState) -> ListPage {
        match self.fetch_manifest().await {
            Ok(posts) => self.list_page_for(&posts, state),
            Err(e) => {
                tracing::error!("Failed to load post manifest: {}", e);
                ListPage {
                    state: state.clone(),
                    filters: self.renderer.render_tag_filters(&[], state),
                    posts: CATALOG_UNAVAILABLE.to_string(),
                }
            }
        }
    }

    /// Load and render a post, scheduling the highlight pass and the comment
    /// widget on the returned scope. Dropping the scope cancels whatever has
    /// not run yet.
    pub async fn open_post(
        &self,
        file: Option<&str>,
        theme: Theme,
    ) -> (Arc<Mutex<PostPage>>, ViewScope) {
        let mut scope = ViewScope::new();

        let Some(file) = file.filter(|f| !f.is_empty()) else {
            tracing::warn!("No post file requested");
            return (shared(PostPage::placeholder(POST_NOT_SPECIFIED)), scope);
        };

        let raw = match self.fetch_document(file).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Failed to load post {}: {}", file, e);
                return (shared(PostPage::placeholder(POST_UNAVAILABLE)), scope);
            }
        };

        let parsed = ParsedDocument::parse(&raw);
        let detail = self.renderer.render_detail(&parsed, &fallback_title(file));
        let wants_comments = parsed.text("comments") != Some("false");

        let page = shared(PostPage {
            content: detail.body.clone(),
            detail: Some(detail),
            comments: wants_comments.then(String::new),
        });

        if let Some(highlighter) = &self.highlighter {
            let highlighter = Arc::clone(highlighter);
            let page = Arc::clone(&page);
            scope.schedule("highlight", self.highlight_delay, move || async move {
                let content = lock(&page).content.clone();
                let highlighted =
                    tokio::task::spawn_blocking(move || highlighter.highlight_all(&content, theme))
                        .await;
                match highlighted {
                    Ok(highlighted) => lock(&page).content = highlighted,
                    Err(e) => tracing::error!("Highlight pass failed: {}", e),
                }
            });
        }

        if let Some(widget) = &self.comments {
            let widget = widget.clone();
            let page = Arc::clone(&page);
            scope.schedule("comments", self.comments_delay, move || async move {
                let mut page = lock(&page);
                match page.comments.as_mut() {
                    Some(container) => *container = widget.mount(container),
                    None => tracing::debug!("No comment container, skipping widget"),
                }
            });
        }

        (page, scope)
    }

    /// Load and render a post and wait for its scheduled tasks to settle
    pub async fn post_page(&self, file: Option<&str>, theme: Theme) -> PostPage {
        let (page, scope) = self.open_post(file, theme).await;
        scope.settle().await;
        let page = lock(&page).clone();
        page
    }
}

fn shared(page: PostPage) -> Arc<Mutex<PostPage>> {
    Arc::new(Mutex::new(page))
}

fn lock(page: &Mutex<PostPage>) -> std::sync::MutexGuard<'_, PostPage> {
    page.lock().unwrap_or_else(PoisonError::into_inner)
}
