//! Markup for post cards, post details and the pages around them
//!
//! Every content-sourced string goes through [`html_escape`] before it is
//! placed in markup.

mod html;
pub mod layout;

pub use html::{encode_uri_component, html_escape, html_unescape};

use crate::content::{MarkdownRenderer, ParsedDocument, PostSummary};
use crate::filter::{FilterState, ALL_TAG};

/// Shown when no post survives filtering
pub const NO_RESULTS: &str = r#"<p class="no-results">No posts found.</p>"#;
/// Shown when the manifest cannot be loaded
pub const CATALOG_UNAVAILABLE: &str = r#"<p class="no-results">Could not load posts.</p>"#;
/// Shown when the detail page has no `file` parameter
pub const POST_NOT_SPECIFIED: &str = r#"<p class="no-results">Could not find the post file.</p>"#;
/// Shown when a post document cannot be loaded
pub const POST_UNAVAILABLE: &str = r#"<p class="no-results">Could not load the post.</p>"#;
/// Body used when no markdown converter is configured
pub const MARKDOWN_UNAVAILABLE: &str = "<p>Markdown renderer is unavailable.</p>";

/// Detail page link for a document identifier
pub fn post_href(file: &str) -> String {
    format!("post.html?file={}", encode_uri_component(file))
}

/// Title derived from a document identifier: `notes/a.md` -> `notes/a`
pub fn fallback_title(file: &str) -> String {
    let name_start = file.rfind('/').map_or(0, |i| i + 1);
    match file[name_start..].rfind('.') {
        Some(dot) if dot > 0 => file[..name_start + dot].to_string(),
        _ => file.to_string(),
    }
}

fn category_label(category: &str) -> String {
    format!("<span>Category: {}</span>", html_escape(category))
}

fn tag_badges<'a>(tags: impl IntoIterator<Item = &'a String>) -> String {
    tags.into_iter()
        .map(|tag| format!(r#"<span class="tag">{}</span>"#, html_escape(tag)))
        .collect()
}

/// A parsed post resolved for display
#[derive(Debug, Clone)]
pub struct DetailView {
    pub title: String,
    pub date: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Rendered body markup
    pub body: String,
}

impl DetailView {
    /// `Category: ...` label markup, when the post has a category
    pub fn category_markup(&self) -> Option<String> {
        self.category.as_deref().map(category_label)
    }

    pub fn tags_markup(&self) -> String {
        tag_badges(&self.tags)
    }
}

/// Renders post summaries and post details
#[derive(Debug, Clone, Default)]
pub struct PostRenderer {
    markdown: Option<MarkdownRenderer>,
}

impl PostRenderer {
    /// Create a renderer; without a converter post bodies become a placeholder
    pub fn new(markdown: Option<MarkdownRenderer>) -> Self {
        Self { markdown }
    }

    /// One card per post, or the no-results placeholder
    pub fn render_summaries(&self, posts: &[PostSummary]) -> String {
        if posts.is_empty() {
            return NO_RESULTS.to_string();
        }

        posts.iter().map(render_card).collect::<Vec<_>>().join("\n")
    }

    /// Resolve metadata and render the body of a parsed post
    pub fn render_detail(&self, parsed: &ParsedDocument, fallback_title: &str) -> DetailView {
        let title = parsed
            .text("title")
            .filter(|t| !t.is_empty())
            .map_or_else(|| fallback_title.to_string(), str::to_string);
        let date = parsed
            .text("date")
            .filter(|d| !d.is_empty())
            .map_or_else(today, str::to_string);
        let category = parsed
            .text("category")
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let tags = parsed.tags().map(<[String]>::to_vec).unwrap_or_default();

        let body = match &self.markdown {
            Some(markdown) => markdown.render(&parsed.body),
            None => MARKDOWN_UNAVAILABLE.to_string(),
        };

        DetailView {
            title,
            date,
            category,
            tags,
            body,
        }
    }

    /// Filter buttons: the implicit "all" first, then the collected tags
    pub fn render_tag_filters(&self, tags: &[String], state: &FilterState) -> String {
        let search = if state.search_term.is_empty() {
            String::new()
        } else {
            format!("&amp;q={}", encode_uri_component(&state.search_term))
        };

        std::iter::once(ALL_TAG)
            .chain(tags.iter().map(String::as_str))
            .map(|tag| {
                let class = if tag == state.active_tag {
                    "filter-btn active"
                } else {
                    "filter-btn"
                };
                let label = if tag == ALL_TAG { "All" } else { tag };
                format!(
                    r#"<a class="{}" data-tag="{}" href="?tag={}{}">{}</a>"#,
                    class,
                    html_escape(tag),
                    encode_uri_component(tag),
                    search,
                    html_escape(label)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn render_card(post: &PostSummary) -> String {
    let category = if post.category.is_empty() {
        String::new()
    } else {
        category_label(&post.category)
    };

    format!(
        r#"<article class="post-card">
  <h2><a href="{href}">{title}</a></h2>
  <div class="post-meta">
    <span>{date}</span>
    {category}
    <div class="post-tags">{tags}</div>
  </div>
  <p class="post-excerpt">{excerpt}</p>
</article>"#,
        href = post_href(&post.file),
        title = html_escape(&post.title),
        date = html_escape(&post.date),
        category = category,
        tags = tag_badges(&post.tags),
        excerpt = html_escape(&post.excerpt),
    )
}

/// Today's date as `YYYY-MM-DD`
fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
