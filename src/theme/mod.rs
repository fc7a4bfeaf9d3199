//! Light/dark theme flag persisted in a local key/value store

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon for the toggle button, showing the theme it switches to
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_matches('"') {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => anyhow::bail!("Unknown theme: {}. Available: light, dark", other),
        }
    }
}

/// String key/value pairs saved as a JSON object on disk
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    /// Open the store, starting empty when the file does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set a key and write the store back to disk
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

/// The process-wide theme flag
#[derive(Debug)]
pub struct ThemeStore {
    storage: LocalStorage,
    key: String,
    current: Theme,
}

impl ThemeStore {
    /// Pick the initial theme: persisted value, else the system preference,
    /// else light. Nothing is written until the theme is changed explicitly.
    pub fn load(storage: LocalStorage, key: &str, system: Option<Theme>) -> Self {
        let mut store = Self {
            storage,
            key: key.to_string(),
            current: Theme::Light,
        };
        store.current = store.resolve(system);
        store
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// The explicitly chosen theme, if any
    pub fn persisted(&self) -> Option<Theme> {
        let value = self.storage.get(&self.key)?;
        match value.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!("Ignoring stored {:?} value: {}", self.key, e);
                None
            }
        }
    }

    /// Theme for a viewer reporting the given system preference
    pub fn resolve(&self, system: Option<Theme>) -> Theme {
        self.persisted().or(system).unwrap_or_default()
    }

    /// Flip the theme and persist the choice
    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }

    /// Persist an explicit choice
    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.storage.set(&self.key, theme.as_str())?;
        self.current = theme;
        tracing::info!("Theme set to {}", theme);
        Ok(())
    }

    /// Follow a system preference change unless a choice was persisted.
    /// Returns whether the current theme was updated.
    pub fn on_system_change(&mut self, system: Theme) -> bool {
        if self.persisted().is_some() {
            return false;
        }
        if self.current == system {
            return false;
        }
        tracing::debug!("Following system theme: {}", system);
        self.current = system;
        true
    }
}
