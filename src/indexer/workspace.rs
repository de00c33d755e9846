//! Workspace access used by the indexer
//!
//! The host owns file discovery and document loading. `Workspace` is the
//! seam; `FsWorkspace` is the plain filesystem implementation used by the
//! command-line host and the tests.

use std::future::Future;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;

use super::types::TextDocument;

/// Directories never descended into during discovery
pub static SKIP_DIRS: &[&str] = &[
    "node_modules", "vendor", "dist", "build",
    ".git", ".svn", ".asmdex", "target",
];

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Discovery task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Host collaborator providing files to index
pub trait Workspace: Send + Sync + 'static {
    /// Workspace root; the cache directory is resolved against it
    fn root(&self) -> &Path;

    /// All files matching any of `patterns` (relative to the root)
    fn find_files(
        &self,
        patterns: &[String],
    ) -> impl Future<Output = Result<Vec<PathBuf>, WorkspaceError>> + Send;

    /// Load a file into a text document
    fn open_document(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<TextDocument, WorkspaceError>> + Send;

    /// URI that `open_document` gives the document at `path`
    fn document_uri(&self, path: &Path) -> String {
        path_to_uri(path)
    }
}

/// Document URI for a file on disk
pub fn path_to_uri(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Filesystem-backed workspace
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
}

impl FsWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get relative path from absolute path
    pub fn to_relative(&self, abs_path: &Path) -> Option<String> {
        relative_to(&self.root, abs_path)
    }
}

impl Workspace for FsWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn find_files(&self, patterns: &[String]) -> Result<Vec<PathBuf>, WorkspaceError> {
        let patterns = patterns
            .iter()
            .map(|p| glob::Pattern::new(p.trim_start_matches('/')))
            .collect::<Result<Vec<_>, _>>()?;
        let root = self.root.clone();

        let files = tokio::task::spawn_blocking(move || discover_files(&root, &patterns)).await?;
        Ok(files)
    }

    async fn open_document(&self, path: &Path) -> Result<TextDocument, WorkspaceError> {
        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        Ok(TextDocument::new(self.document_uri(path), text))
    }
}

fn discover_files(root: &Path, patterns: &[glob::Pattern]) -> Vec<PathBuf> {
    let options = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            let name = entry.file_name().to_str().unwrap_or("");
            !(is_dir && SKIP_DIRS.contains(&name))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let Some(rel_path) = relative_to(root, entry.path()) else {
            continue;
        };
        if patterns.iter().any(|p| p.matches_with(&rel_path, options)) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    files
}

fn relative_to(root: &Path, abs_path: &Path) -> Option<String> {
    abs_path
        .strip_prefix(root)
        .ok()
        .and_then(|p| p.to_str())
        .map(|s| s.replace('\\', "/"))
}
