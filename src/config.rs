use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Project-local directory holding settings and the symbol cache
pub const PROJECT_DIR: &str = ".asmdex";

pub const CACHE_FILE_NAME: &str = "symbols.json";

/// Per-project indexer settings stored in .asmdex/config/settings.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Delay between the last index mutation and the cache write
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
    /// Cache directory, relative to the workspace root
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Globs (relative to the workspace root) scanned on initialization
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    /// Host language ids accepted for indexing
    #[serde(default = "default_language_ids")]
    pub language_ids: Vec<String>,
    /// File extensions accepted for indexing, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: default_save_debounce_ms(),
            cache_dir: default_cache_dir(),
            include: default_include(),
            language_ids: default_language_ids(),
            extensions: default_extensions(),
        }
    }
}

impl IndexerConfig {
    pub fn cache_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.cache_dir).join(CACHE_FILE_NAME)
    }
}

fn default_save_debounce_ms() -> u64 {
    // Check environment variable first, then fall back to one second
    std::env::var("ASMDEX_SAVE_DEBOUNCE_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1000)
}

fn default_cache_dir() -> String {
    format!("{}/cache", PROJECT_DIR)
}

fn default_include() -> Vec<String> {
    vec!["**/*.asm".to_string(), "**/*.inc".to_string()]
}

fn default_language_ids() -> Vec<String> {
    vec!["fasm".to_string(), "fasmg".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec!["asm".to_string(), "inc".to_string()]
}

pub fn get_settings_path(workspace_root: &Path) -> PathBuf {
    workspace_root
        .join(PROJECT_DIR)
        .join("config")
        .join("settings.json")
}

/// Load settings for a workspace. A missing or unreadable file yields the
/// defaults.
pub fn load_config(workspace_root: &Path) -> IndexerConfig {
    let path = get_settings_path(workspace_root);
    let Ok(bytes) = fs::read(&path) else {
        tracing::debug!("No settings at {}, using defaults", path.display());
        return IndexerConfig::default();
    };
    match serde_json::from_slice::<IndexerConfig>(&bytes) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring malformed settings {}: {}", path.display(), e);
            IndexerConfig::default()
        }
    }
}

pub fn save_config(workspace_root: &Path, cfg: &IndexerConfig) -> Result<(), String> {
    let path = get_settings_path(workspace_root);
    let json = serde_json::to_vec_pretty(cfg).map_err(|e| e.to_string())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::write(path, json).map_err(|e| e.to_string())
}
