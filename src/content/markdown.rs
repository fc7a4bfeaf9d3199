//! Markdown rendering
//!
//! Code blocks are emitted as plain `<pre><code class="language-*">` so the
//! highlight pass can find them later in the rendered markup.

use pulldown_cmark::{html, Event, Options, Parser};

use crate::config::MarkdownConfig;

/// Markdown to HTML converter
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    breaks: bool,
    gfm: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with line-break preservation and GFM syntax
    pub fn new() -> Self {
        Self {
            breaks: true,
            gfm: true,
        }
    }

    /// Create with custom settings
    pub fn with_options(breaks: bool, gfm: bool) -> Self {
        Self { breaks, gfm }
    }

    /// Build from configuration; `None` when the converter is disabled
    pub fn from_config(config: &MarkdownConfig) -> Option<Self> {
        config
            .enable
            .then(|| Self::with_options(config.breaks, config.gfm))
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        // Front matter is stripped before this point, so no metadata blocks
        let options = if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        };
        let breaks = self.breaks;
        let parser = Parser::new_ext(markdown, options).map(|event| match event {
            Event::SoftBreak if breaks => Event::HardBreak,
            other => other,
        });

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, parser);
        html_output
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.");
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_single_newline_becomes_break() {
        let html = MarkdownRenderer::new().render("first\nsecond");
        assert!(html.contains("first<br />"));

        let html = MarkdownRenderer::with_options(false, true).render("first\nsecond");
        assert!(!html.contains("<br"));
    }

    #[test]
    fn test_gfm_extensions() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));

        let plain = MarkdownRenderer::with_options(true, false).render("~~gone~~");
        assert!(!plain.contains("<del>"));
    }

    #[test]
    fn test_code_block_keeps_language_class() {
        let html = MarkdownRenderer::new().render("```rust\nfn main() {}\n```");
        assert!(html.contains(r#"<pre><code class="language-rust">"#));
    }

    #[test]
    fn test_disabled_by_config() {
        let config = MarkdownConfig {
            enable: false,
            ..Default::default()
        };
        assert!(MarkdownRenderer::from_config(&config).is_none());
        assert!(MarkdownRenderer::from_config(&MarkdownConfig::default()).is_some());
    }
}
