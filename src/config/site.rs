//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,

    // Sources
    /// Directory or http(s) base URL holding the manifest and posts
    pub source: String,
    pub manifest: String,
    pub pages_dir: String,

    // Local state
    pub storage: String,
    pub theme_key: String,

    // Collaborators
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            language: "en".to_string(),

            source: ".".to_string(),
            manifest: "posts.json".to_string(),
            pages_dir: "pages".to_string(),

            storage: ".blogdeck/storage.json".to_string(),
            theme_key: "theme".to_string(),

            markdown: MarkdownConfig::default(),
            highlight: HighlightConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Whether posts are fetched over HTTP rather than read from disk
    pub fn is_remote_source(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}

/// Markdown converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    pub enable: bool,
    /// Turn single newlines into `<br>`
    pub breaks: bool,
    pub gfm: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            enable: true,
            breaks: true,
            gfm: true,
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    pub light_theme: String,
    pub dark_theme: String,
    /// Delay between rendering a post and highlighting it
    pub delay_ms: u64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: false,
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
            delay_ms: 100,
        }
    }
}

/// giscus comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub enable: bool,
    /// Delay between rendering a post and mounting the widget
    pub delay_ms: u64,
    pub src: String,
    pub repo: String,
    pub repo_id: String,
    pub category: String,
    pub category_id: String,
    pub mapping: String,
    pub strict: bool,
    pub reactions_enabled: bool,
    pub emit_metadata: bool,
    pub input_position: String,
    pub theme: String,
    pub lang: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            delay_ms: 500,
            src: "https://giscus.app/client.js".to_string(),
            repo: String::new(),
            repo_id: String::new(),
            category: "General".to_string(),
            category_id: String::new(),
            mapping: "pathname".to_string(),
            strict: false,
            reactions_enabled: true,
            emit_metadata: true,
            input_position: "bottom".to_string(),
            theme: "preferred_color_scheme".to_string(),
            lang: "en".to_string(),
        }
    }
}
