//! blogdeck: renders a markdown blog from a post manifest
//!
//! Posts are listed from a JSON manifest, filtered by tag and free-text
//! search, and shown one at a time from markdown documents carrying a small
//! front-matter header. Pages are served over HTTP or printed by the CLI.

pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod filter;
pub mod highlight;
pub mod render;
pub mod schedule;
pub mod server;
pub mod theme;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{PostCatalogLoader, Source};
use theme::{LocalStorage, Theme, ThemeStore};

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Local key/value storage file
    pub storage_path: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let storage_path = base_dir.join(&config.storage);

        Ok(Self {
            config,
            base_dir,
            storage_path,
        })
    }

    /// Build the catalog loader for the configured source
    pub fn loader(&self) -> Result<PostCatalogLoader> {
        let source = Source::from_config(&self.base_dir, &self.config)?;
        Ok(PostCatalogLoader::new(source, &self.config))
    }

    /// Open the persisted theme flag
    pub fn theme_store(&self, system: Option<Theme>) -> Result<ThemeStore> {
        let storage = LocalStorage::open(&self.storage_path)?;
        Ok(ThemeStore::load(storage, &self.config.theme_key, system))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_blog_defaults_without_config() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.manifest, "posts.json");
        assert_eq!(blog.storage_path, dir.path().join(".blogdeck/storage.json"));
        let loader = blog.loader().unwrap();
        assert_eq!(loader.source().local_root(), Some(dir.path().join(".").as_path()));
    }

    #[test]
    fn test_blog_reads_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Notes\nsource: site\nstorage: state.json\n",
        )
        .unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Notes");
        assert_eq!(blog.storage_path, dir.path().join("state.json"));
        let loader = blog.loader().unwrap();
        assert_eq!(loader.source().local_root(), Some(dir.path().join("site").as_path()));

        let mut themes = blog.theme_store(None).unwrap();
        themes.toggle().unwrap();
        assert!(dir.path().join("state.json").exists());
    }
}
