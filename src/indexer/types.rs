use std::path::Path;
use std::time::Instant;

use crate::config::IndexerConfig;

/// An in-memory text document handed over by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub uri: String,
    /// Host language id, if the host knows one
    pub language_id: Option<String>,
    pub text: String,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            language_id: None,
            text: text.into(),
        }
    }

    pub fn with_language_id(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into());
        self
    }
}

/// Decides which documents take part in indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    language_ids: Vec<String>,
    extensions: Vec<String>,
}

impl DocumentFilter {
    pub fn new(language_ids: Vec<String>, extensions: Vec<String>) -> Self {
        Self {
            language_ids,
            extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &IndexerConfig) -> Self {
        Self::new(config.language_ids.clone(), config.extensions.clone())
    }

    pub fn accepts(&self, document: &TextDocument) -> bool {
        if let Some(language_id) = &document.language_id {
            if self.language_ids.iter().any(|id| id == language_id) {
                return true;
            }
        }
        self.accepts_path(Path::new(&document.uri))
    }

    pub fn accepts_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self::from_config(&IndexerConfig::default())
    }
}

/// Statistics from a workspace scan
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    pub started_at: Option<Instant>,
    pub files_discovered: usize,
    pub files_indexed: usize,
    pub files_failed: usize,
    /// Files left alone because the host already indexed them
    pub files_skipped: usize,
    pub definitions_total: usize,
    /// Cached documents dropped because their file is gone
    pub documents_pruned: usize,
    pub cancelled: bool,
}

impl ScanStats {
    pub fn new(files_discovered: usize) -> Self {
        Self {
            started_at: Some(Instant::now()),
            files_discovered,
            ..Default::default()
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}
