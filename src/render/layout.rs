//! Full-page markup for the list and detail views

use super::{html_escape, DetailView};
use crate::config::SiteConfig;
use crate::filter::FilterState;
use crate::theme::Theme;

/// The post list with its filter bar
#[derive(Debug, Clone)]
pub struct ListPage {
    pub state: FilterState,
    /// Filter button markup
    pub filters: String,
    /// Cards or a placeholder
    pub posts: String,
}

impl ListPage {
    pub fn to_html(&self, site: &SiteConfig, theme: Theme) -> String {
        let main = format!(
            r#"<form class="search" method="get">
  <input id="search-input" type="search" name="q" value="{search}" placeholder="Search posts...">
  <input type="hidden" name="tag" value="{tag}">
</form>
<nav class="filters">
{filters}
</nav>
<section id="posts-container">
{posts}
</section>"#,
            search = html_escape(&self.state.search_term),
            tag = html_escape(&self.state.active_tag),
            filters = self.filters,
            posts = self.posts,
        );
        document(site, theme, &site.title, &main)
    }
}

/// A single post, or a placeholder when it could not be shown
#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub detail: Option<DetailView>,
    /// Body markup, or the placeholder on failure
    pub content: String,
    /// Comment container contents; `None` when the page has no container
    pub comments: Option<String>,
}

impl PostPage {
    /// A page showing only a placeholder message
    pub fn placeholder(message: &str) -> Self {
        Self {
            detail: None,
            content: message.to_string(),
            comments: None,
        }
    }

    pub fn document_title(&self, site: &SiteConfig) -> String {
        match &self.detail {
            Some(detail) => format!("{} - {}", detail.title, site.title),
            None => site.title.clone(),
        }
    }

    pub fn to_html(&self, site: &SiteConfig, theme: Theme) -> String {
        let mut main = String::from(r#"<article class="post">"#);
        main.push('\n');

        if let Some(detail) = &self.detail {
            main.push_str(&format!(
                r#"<h1 id="post-heading">{title}</h1>
<div class="post-meta">
  <span id="post-date">{date}</span>
  <span id="post-category">{category}</span>
  <div id="post-tags" class="post-tags">{tags}</div>
</div>
"#,
                title = html_escape(&detail.title),
                date = html_escape(&detail.date),
                category = detail.category_markup().unwrap_or_default(),
                tags = detail.tags_markup(),
            ));
        }

        main.push_str(&format!(
            "<div id=\"post-content\" class=\"post-content\">\n{}\n</div>\n</article>",
            self.content
        ));

        if let Some(comments) = &self.comments {
            main.push_str(&format!(
                "\n<div id=\"giscus-container\">{}</div>",
                comments
            ));
        }

        document(site, theme, &self.document_title(site), &main)
    }
}

fn document(site: &SiteConfig, theme: Theme, title: &str, main: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" data-theme="{theme}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <link rel="stylesheet" href="/css/style.css">
</head>
<body>
<header class="site-header">
  <a class="site-title" href="/">{site_title}</a>
  <form method="post" action="/theme/toggle">
    <button id="theme-toggle" type="submit" aria-label="Toggle theme"><span id="theme-icon">{icon}</span></button>
  </form>
</header>
<main>
{main}
</main>
</body>
</html>
"#,
        lang = html_escape(&site.language),
        theme = theme.as_str(),
        title = html_escape(title),
        site_title = html_escape(&site.title),
        icon = theme.toggle_icon(),
        main = main,
    )
}
