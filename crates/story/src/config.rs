use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use gpui_shelf_core::{MemoryShelf, ViewMode};
use serde::Deserialize;

const CONFIG_FILE: &str = "shelf.json";

fn default_indent_width() -> f32 {
    16.
}

fn default_card_width() -> f32 {
    180.
}

fn default_show_counts() -> bool {
    true
}

/// Settings read from `shelf.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfConfig {
    #[serde(default = "default_indent_width")]
    pub indent_width: f32,
    #[serde(default = "default_card_width")]
    pub card_width: f32,
    #[serde(default = "default_show_counts")]
    pub show_counts: bool,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub dark: bool,
    /// Snapshot JSON to start from, relative to the config file.
    #[serde(default)]
    pub seed: Option<PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            indent_width: default_indent_width(),
            card_width: default_card_width(),
            show_counts: default_show_counts(),
            view_mode: ViewMode::default(),
            dark: false,
            seed: None,
            base_dir: PathBuf::from("."),
        }
    }
}

impl ShelfConfig {
    /// Look for `./shelf.json`, then `../shelf.json`. Defaults apply when
    /// neither exists.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from(".").join(CONFIG_FILE);
        let parent = PathBuf::from("..").join(CONFIG_FILE);
        match [local, parent].into_iter().find(|path| path.is_file()) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.base_dir = PathBuf::from(".");
        Ok(config)
    }

    pub fn seed_path(&self) -> Option<PathBuf> {
        self.seed.as_ref().map(|seed| self.base_dir.join(seed))
    }

    /// The configured seed snapshot, or `None` when no seed is set.
    pub fn load_seed(&self) -> Result<Option<MemoryShelf>> {
        let Some(path) = self.seed_path() else {
            return Ok(None);
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read seed snapshot: {}", path.display()))?;
        let shelf = MemoryShelf::from_json(&content)
            .with_context(|| format!("Failed to parse seed snapshot: {}", path.display()))?;
        Ok(Some(shelf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = ShelfConfig::from_json("{}").unwrap();
        assert_eq!(config, ShelfConfig::default());
    }

    #[test]
    fn parses_camel_case_fields() {
        let config = ShelfConfig::from_json(
            r#"{"indentWidth": 20, "showCounts": false, "viewMode": "grid", "seed": "seed.json"}"#,
        )
        .unwrap();
        assert_eq!(config.indent_width, 20.);
        assert!(!config.show_counts);
        assert_eq!(config.view_mode, ViewMode::Grid);
        assert_eq!(config.seed_path(), Some(PathBuf::from("./seed.json")));
    }

    #[test]
    fn rejects_unknown_view_mode() {
        assert!(ShelfConfig::from_json(r#"{"viewMode": "tiles"}"#).is_err());
    }

    #[test]
    fn no_seed_means_no_shelf() {
        assert!(ShelfConfig::default().load_seed().unwrap().is_none());
    }
}
