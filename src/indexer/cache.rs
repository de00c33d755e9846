use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::symbol_index::PersistedIndex;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CacheError {
    /// The cache file simply isn't there yet
    pub fn is_missing(&self) -> bool {
        matches!(self, CacheError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Overwrite the cache file at `cache_path`, creating its directory.
/// The file is written beside the target and renamed into place.
pub async fn save_cache(cache_path: &Path, index: &PersistedIndex) -> Result<(), CacheError> {
    if let Some(cache_dir) = cache_path.parent() {
        tokio::fs::create_dir_all(cache_dir).await?;
    }

    let json = serde_json::to_vec(index)?;
    let tmp_path = temp_path(cache_path);
    tokio::fs::write(&tmp_path, json).await?;
    tokio::fs::rename(&tmp_path, cache_path).await?;

    Ok(())
}

pub async fn load_cache(cache_path: &Path) -> Result<PersistedIndex, CacheError> {
    let json = tokio::fs::read(cache_path).await?;
    let index: PersistedIndex = serde_json::from_slice(&json)?;
    Ok(index)
}

fn temp_path(cache_path: &Path) -> PathBuf {
    let mut name = cache_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    cache_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_index::SymbolIndex;
    use std::fs;
    use tempfile::TempDir;

    fn sample_index() -> PersistedIndex {
        let mut index = SymbolIndex::new();
        index.index_text("/w/a.asm", "start:\nsize? = 4\n");
        index.snapshot()
    }

    #[tokio::test]
    async fn test_save_and_load_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join(".asmdex/cache/symbols.json");

        let index = sample_index();
        save_cache(&cache_path, &index).await.unwrap();

        assert!(cache_path.exists());
        assert!(!temp_path(&cache_path).exists());

        let loaded = load_cache(&cache_path).await.unwrap();
        assert_eq!(loaded, index);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("symbols.json");

        save_cache(&cache_path, &sample_index()).await.unwrap();
        save_cache(&cache_path, &PersistedIndex::default()).await.unwrap();

        let loaded = load_cache(&cache_path).await.unwrap();
        assert!(loaded.documents.is_empty());
    }

    #[tokio::test]
    async fn test_missing_cache() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_cache(&temp_dir.path().join("symbols.json"))
            .await
            .unwrap_err();
        assert!(err.is_missing());
    }

    #[tokio::test]
    async fn test_malformed_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache_path = temp_dir.path().join("symbols.json");

        fs::write(&cache_path, "{\"documents\": [ {\"uri\": 1} ]}").unwrap();
        let err = load_cache(&cache_path).await.unwrap_err();
        assert!(matches!(err, CacheError::Json(_)));
        assert!(!err.is_missing());

        fs::write(&cache_path, "not json at all").unwrap();
        assert!(load_cache(&cache_path).await.is_err());
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/c/symbols.json")),
            PathBuf::from("/c/symbols.json.tmp")
        );
    }
}
