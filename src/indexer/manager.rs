use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{OnceCell, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::{load_config, IndexerConfig};
use crate::indexer::cache::{load_cache, CacheError};
use crate::indexer::saver::SaveScheduler;
use crate::indexer::types::{DocumentFilter, ScanStats, TextDocument};
use crate::indexer::workspace::{FsWorkspace, Workspace};
use crate::navigation::{identifier_at, line_text};
use crate::symbol_index::{
    build_symbol_table, build_symbol_table_cancellable, DefinitionKind, DefinitionLocation,
    Position, SymbolIndex,
};

struct ManagerInner<W> {
    workspace: W,
    config: IndexerConfig,
    filter: DocumentFilter,
    index: Arc<RwLock<SymbolIndex>>,
    saver: SaveScheduler,
    initialized: OnceCell<ScanStats>,
    /// URIs the host has indexed itself; their text is newer than the disk
    host_documents: Mutex<HashSet<String>>,
    shutdown: CancellationToken,
}

/// Owns the symbol index for one workspace session
///
/// Constructed once when the host starts, shared by cloning, and torn down
/// with [`IndexerManager::shutdown`].
pub struct IndexerManager<W: Workspace> {
    inner: Arc<ManagerInner<W>>,
}

impl<W: Workspace> Clone for IndexerManager<W> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl IndexerManager<FsWorkspace> {
    /// Manager over a directory on disk, with that directory's settings.
    pub fn for_root(root: &Path) -> Self {
        let config = load_config(root);
        Self::new(FsWorkspace::new(root), config)
    }
}

impl<W: Workspace> IndexerManager<W> {
    pub fn new(workspace: W, config: IndexerConfig) -> Self {
        let index = Arc::new(RwLock::new(SymbolIndex::new()));
        let saver = SaveScheduler::new(
            index.clone(),
            config.cache_path(workspace.root()),
            Duration::from_millis(config.save_debounce_ms),
        );

        Self {
            inner: Arc::new(ManagerInner {
                filter: DocumentFilter::from_config(&config),
                workspace,
                config,
                index,
                saver,
                initialized: OnceCell::new(),
                host_documents: Mutex::new(HashSet::new()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.inner.config
    }

    pub fn workspace(&self) -> &W {
        &self.inner.workspace
    }

    pub fn filter(&self) -> &DocumentFilter {
        &self.inner.filter
    }

    pub fn cache_path(&self) -> &Path {
        self.inner.saver.cache_path()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.initialized()
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Load the cache and scan the workspace, once. Concurrent and later
    /// callers wait for and share the first run.
    pub async fn ensure_initialized(&self) -> ScanStats {
        self.inner
            .initialized
            .get_or_init(|| self.initialize())
            .await
            .clone()
    }

    async fn initialize(&self) -> ScanStats {
        self.warm_start().await;
        let stats = self.scan_workspace().await;

        tracing::info!(
            "Indexed {} of {} files ({} definitions, {} failed, {} skipped, {} pruned) in {}ms",
            stats.files_indexed,
            stats.files_discovered,
            stats.definitions_total,
            stats.files_failed,
            stats.files_skipped,
            stats.documents_pruned,
            stats.elapsed_ms()
        );

        if stats.files_indexed > 0 || stats.documents_pruned > 0 {
            self.schedule_save();
        }
        stats
    }

    /// Seed the index from the cache file. Any failure means "no cache".
    async fn warm_start(&self) -> usize {
        let cache_path = self.cache_path();
        match load_cache(cache_path).await {
            Ok(persisted) => {
                let restored = self.inner.index.write().await.restore(persisted);
                tracing::info!("Loaded cached symbols for {} documents", restored);
                restored
            }
            Err(e) if e.is_missing() => {
                tracing::debug!("No symbol cache at {}", cache_path.display());
                0
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable symbol cache {}: {}", cache_path.display(), e);
                0
            }
        }
    }

    /// Re-derive every table from source text. Observes shutdown between
    /// documents.
    async fn scan_workspace(&self) -> ScanStats {
        let cancel = &self.inner.shutdown;

        let (files, discovered) = match self.inner.workspace.find_files(&self.inner.config.include).await {
            Ok(files) => (files, true),
            Err(e) => {
                tracing::warn!("Workspace discovery failed: {}", e);
                (Vec::new(), false)
            }
        };

        let mut stats = ScanStats::new(files.len());
        let mut seen: HashSet<String> = HashSet::new();

        for path in files {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            let document = match self.inner.workspace.open_document(&path).await {
                Ok(document) => document,
                Err(e) => {
                    tracing::debug!("Skipping {}: {}", path.display(), e);
                    stats.files_failed += 1;
                    continue;
                }
            };
            if cancel.is_cancelled() {
                stats.cancelled = true;
                break;
            }

            seen.insert(document.uri.clone());
            if !self.inner.filter.accepts(&document) {
                stats.files_skipped += 1;
                continue;
            }

            let Some(table) = build_symbol_table_cancellable(&document.text, cancel) else {
                stats.cancelled = true;
                break;
            };

            {
                let mut index = self.inner.index.write().await;
                if self.is_host_document(&document.uri) {
                    stats.files_skipped += 1;
                } else {
                    stats.definitions_total += table.definition_count();
                    index.replace_document(&document.uri, table);
                    stats.files_indexed += 1;
                }
            }

            tokio::task::yield_now().await;
        }

        if discovered && !stats.cancelled {
            stats.documents_pruned = self.prune_missing(&seen).await;
        }
        stats
    }

    /// Drop cached documents that the scan did not find again.
    async fn prune_missing(&self, seen: &HashSet<String>) -> usize {
        let mut index = self.inner.index.write().await;
        let stale: Vec<String> = index
            .document_uris()
            .filter(|uri| !seen.contains(*uri) && !self.is_host_document(uri))
            .map(str::to_string)
            .collect();

        for uri in &stale {
            tracing::debug!("Pruning vanished document {}", uri);
            index.remove_document(uri);
        }
        stale.len()
    }

    // =========================================================================
    // Document updates
    // =========================================================================

    /// Replace a document's contribution with a fresh scan of its text.
    /// Returns false for documents outside the filter.
    pub async fn index_document(&self, document: &TextDocument) -> bool {
        self.index_document_with_cancel(document, &CancellationToken::new())
            .await
    }

    /// Like [`Self::index_document`]. A cancelled scan leaves the previous
    /// contribution in place and returns false.
    pub async fn index_document_with_cancel(
        &self,
        document: &TextDocument,
        cancel: &CancellationToken,
    ) -> bool {
        if !self.inner.filter.accepts(document) {
            tracing::trace!("Not indexing {}", document.uri);
            return false;
        }

        let Some(table) = build_symbol_table_cancellable(&document.text, cancel) else {
            tracing::debug!("Indexing of {} cancelled", document.uri);
            return false;
        };

        self.host_documents().insert(document.uri.clone());
        let definitions = table.definition_count();
        self.inner
            .index
            .write()
            .await
            .replace_document(&document.uri, table);
        tracing::trace!("Indexed {} ({} definitions)", document.uri, definitions);

        self.schedule_save();
        true
    }

    /// Forget a closed or deleted document. Returns whether it was indexed.
    pub async fn remove_document(&self, uri: &str) -> bool {
        self.host_documents().remove(uri);
        let removed = self.inner.index.write().await.remove_document(uri);
        if removed {
            tracing::trace!("Removed {}", uri);
            self.schedule_save();
        }
        removed
    }

    /// Bring the index in line with a file that changed on disk. Documents
    /// the host has indexed itself are left alone. Returns whether the index
    /// changed.
    pub async fn refresh_path(&self, path: &Path) -> bool {
        let uri = self.inner.workspace.document_uri(path);
        if self.is_host_document(&uri) || !self.inner.filter.accepts_path(path) {
            return false;
        }

        let changed = match self.inner.workspace.open_document(path).await {
            Ok(document) => {
                let table = build_symbol_table(&document.text);
                let mut index = self.inner.index.write().await;
                if self.is_host_document(&document.uri) {
                    false
                } else {
                    index.replace_document(&document.uri, table);
                    true
                }
            }
            Err(e) => {
                tracing::trace!("{} is gone ({}), dropping it", path.display(), e);
                let mut index = self.inner.index.write().await;
                !self.is_host_document(&uri) && index.remove_document(&uri)
            }
        };

        if changed {
            self.schedule_save();
        }
        changed
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub async fn lookup_symbol_kind(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Option<DefinitionKind> {
        self.ensure_initialized().await;
        if cancel.is_cancelled() {
            return None;
        }
        self.inner.index.read().await.lookup_symbol_kind(name)
    }

    pub async fn find_definitions(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Vec<DefinitionLocation> {
        self.ensure_initialized().await;
        if cancel.is_cancelled() {
            return Vec::new();
        }
        self.inner.index.read().await.find_definitions(name)
    }

    /// Definitions of the identifier at `position` in `document`.
    pub async fn definition_at(
        &self,
        document: &TextDocument,
        position: Position,
        cancel: &CancellationToken,
    ) -> Vec<DefinitionLocation> {
        let identifier = line_text(&document.text, position.line)
            .and_then(|line| identifier_at(line, position.character));
        match identifier {
            Some(identifier) => self.find_definitions(&identifier.name, cancel).await,
            None => Vec::new(),
        }
    }

    pub async fn document_count(&self) -> usize {
        self.inner.index.read().await.document_count()
    }

    pub async fn definition_count(&self) -> usize {
        self.inner.index.read().await.definition_count()
    }

    // =========================================================================
    // Persistence and teardown
    // =========================================================================

    /// Write the cache immediately.
    pub async fn save_now(&self) -> Result<(), CacheError> {
        self.inner.saver.save_now().await
    }

    pub fn has_pending_save(&self) -> bool {
        self.inner.saver.is_pending()
    }

    /// Stop an in-flight scan and complete any pending save. Later
    /// mutations are applied in memory but no longer persisted.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        if self.inner.saver.flush().await {
            tracing::info!("Flushed pending symbol cache to {}", self.cache_path().display());
        }
    }

    fn schedule_save(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.saver.schedule();
    }

    fn host_documents(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner
            .host_documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_host_document(&self, uri: &str) -> bool {
        self.host_documents().contains(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::cache::save_cache;
    use crate::indexer::workspace::{path_to_uri, WorkspaceError};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn test_config() -> IndexerConfig {
        IndexerConfig {
            save_debounce_ms: 20,
            ..IndexerConfig::default()
        }
    }

    fn manager_for(dir: &TempDir) -> IndexerManager<FsWorkspace> {
        IndexerManager::new(FsWorkspace::new(dir.path()), test_config())
    }

    fn uri(dir: &TempDir, relative: &str) -> String {
        path_to_uri(&dir.path().join(relative))
    }

    fn no_cancel() -> CancellationToken {
        CancellationToken::new()
    }

    /// Workspace whose discovery always fails
    struct BrokenWorkspace {
        root: PathBuf,
    }

    impl Workspace for BrokenWorkspace {
        fn root(&self) -> &Path {
            &self.root
        }

        async fn find_files(&self, _patterns: &[String]) -> Result<Vec<PathBuf>, WorkspaceError> {
            Err(WorkspaceError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }

        async fn open_document(&self, _path: &Path) -> Result<TextDocument, WorkspaceError> {
            Err(WorkspaceError::Io(std::io::ErrorKind::NotFound.into()))
        }
    }

    #[tokio::test]
    async fn test_concrete_scenario() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);
        let doc = TextDocument::new(
            uri(&dir, "main.asm"),
            "counter equ 5\nresult: mov eax, counter\n",
        );

        assert!(manager.index_document(&doc).await);

        let cancel = no_cancel();
        assert_eq!(
            manager.lookup_symbol_kind("counter", &cancel).await,
            Some(DefinitionKind::Value)
        );
        assert_eq!(
            manager.lookup_symbol_kind("result", &cancel).await,
            Some(DefinitionKind::Label)
        );

        let counter = manager.find_definitions("counter", &cancel).await;
        assert_eq!(counter.len(), 1);
        assert_eq!(counter[0].uri, doc.uri);
        assert_eq!(counter[0].range.start, Position::new(0, 0));

        let result = manager.find_definitions("result", &cancel).await;
        assert_eq!(result[0].range.start, Position::new(1, 0));
    }

    #[tokio::test]
    async fn test_initialization_scans_workspace() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.asm"), "start:\nfoo? equ 1\n").unwrap();
        fs::create_dir(dir.path().join("inc")).unwrap();
        fs::write(dir.path().join("inc/defs.inc"), "foo equ 2\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "hidden:\n").unwrap();

        let manager = manager_for(&dir);
        let stats = manager.ensure_initialized().await;
        assert_eq!(stats.files_discovered, 2);
        assert_eq!(stats.files_indexed, 2);
        assert!(!stats.cancelled);

        let cancel = no_cancel();
        let start = manager.find_definitions("start", &cancel).await;
        assert_eq!(start[0].uri, uri(&dir, "a.asm"));

        // sensitive definition in defs.inc wins over the insensitive one
        let foo = manager.find_definitions("foo", &cancel).await;
        assert_eq!(foo.len(), 1);
        assert_eq!(foo[0].uri, uri(&dir, "inc/defs.inc"));

        let upper = manager.find_definitions("FOO", &cancel).await;
        assert_eq!(upper[0].uri, uri(&dir, "a.asm"));

        assert!(manager.find_definitions("hidden", &cancel).await.is_empty());
    }

    #[tokio::test]
    async fn test_initialization_runs_once() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.asm"), "first:\n").unwrap();
        let manager = manager_for(&dir);

        let (one, two) = tokio::join!(manager.ensure_initialized(), manager.ensure_initialized());
        assert_eq!(one.files_indexed, 1);
        assert_eq!(two.files_indexed, 1);
        assert!(manager.is_initialized());

        fs::write(dir.path().join("b.asm"), "second:\n").unwrap();
        manager.ensure_initialized().await;
        assert!(manager
            .find_definitions("second", &no_cancel())
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_ineligible_document() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);

        let doc = TextDocument::new(uri(&dir, "readme.md"), "title:\n");
        assert!(!manager.index_document(&doc).await);
        assert_eq!(manager.document_count().await, 0);
        assert!(!manager.has_pending_save());

        let doc = TextDocument::new("untitled:1", "title:\n").with_language_id("fasm");
        assert!(manager.index_document(&doc).await);
        assert_eq!(manager.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_edit_and_remove() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);
        let cancel = no_cancel();

        let a = TextDocument::new(uri(&dir, "a.asm"), "shared = 1\nonly_a:\n");
        let b = TextDocument::new(uri(&dir, "b.asm"), "shared = 2\n");
        manager.index_document(&a).await;
        manager.index_document(&b).await;
        assert_eq!(manager.find_definitions("shared", &cancel).await.len(), 2);

        let edited = TextDocument::new(a.uri.clone(), "renamed:\n");
        manager.index_document(&edited).await;
        assert!(manager.find_definitions("only_a", &cancel).await.is_empty());
        assert_eq!(manager.find_definitions("shared", &cancel).await.len(), 1);

        assert!(manager.remove_document(&b.uri).await);
        assert!(manager.find_definitions("shared", &cancel).await.is_empty());
        assert_eq!(manager.find_definitions("renamed", &cancel).await.len(), 1);
        assert!(!manager.remove_document(&b.uri).await);
    }

    #[tokio::test]
    async fn test_cancelled_lookups() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);
        let doc = TextDocument::new(uri(&dir, "a.asm"), "start:\n");
        manager.index_document(&doc).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(manager.lookup_symbol_kind("start", &cancel).await, None);
        assert!(manager.find_definitions("start", &cancel).await.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_indexing_keeps_previous_contribution() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);
        let doc = TextDocument::new(uri(&dir, "a.asm"), "start:\n");
        manager.index_document(&doc).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let edited = TextDocument::new(doc.uri.clone(), "other:\n");
        assert!(!manager.index_document_with_cancel(&edited, &cancel).await);

        let found = manager.find_definitions("start", &no_cancel()).await;
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_host_text_beats_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.asm"), "on_disk:\n").unwrap();
        let manager = manager_for(&dir);

        let doc = TextDocument::new(uri(&dir, "a.asm"), "in_editor:\n");
        manager.index_document(&doc).await;

        let stats = manager.ensure_initialized().await;
        assert_eq!(stats.files_skipped, 1);

        let cancel = no_cancel();
        assert_eq!(manager.find_definitions("in_editor", &cancel).await.len(), 1);
        assert!(manager.find_definitions("on_disk", &cancel).await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_is_written_after_debounce() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.asm"), "start:\n").unwrap();
        let manager = manager_for(&dir);
        manager.ensure_initialized().await;

        tokio::time::sleep(Duration::from_millis(300)).await;
        let persisted = load_cache(manager.cache_path()).await.unwrap();
        assert_eq!(persisted.documents.len(), 1);
        assert_eq!(persisted.documents[0].uri, uri(&dir, "a.asm"));
    }

    #[tokio::test]
    async fn test_warm_start_without_rescan() {
        let dir = TempDir::new().unwrap();
        let cache_path = test_config().cache_path(dir.path());

        let mut before = SymbolIndex::new();
        before.index_text("/w/a.asm", "start:\ncount equ 3\n");
        before.index_text("/w/b.inc", "Size? = 4\n");
        save_cache(&cache_path, &before.snapshot()).await.unwrap();

        // discovery fails, so the cache is all there is
        let manager = IndexerManager::new(
            BrokenWorkspace {
                root: dir.path().to_path_buf(),
            },
            test_config(),
        );
        let stats = manager.ensure_initialized().await;
        assert_eq!(stats.files_discovered, 0);
        assert_eq!(stats.documents_pruned, 0);

        let cancel = no_cancel();
        for name in ["start", "count", "SIZE", "size?", "missing"] {
            assert_eq!(
                manager.lookup_symbol_kind(name, &cancel).await,
                before.lookup_symbol_kind(name)
            );
            assert_eq!(
                manager.find_definitions(name, &cancel).await,
                before.find_definitions(name)
            );
        }
    }

    #[tokio::test]
    async fn test_scan_overrides_cache_and_prunes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.asm"), "fresh:\n").unwrap();

        let mut cached = SymbolIndex::new();
        cached.index_text(&uri(&dir, "a.asm"), "stale:\n");
        cached.index_text(&uri(&dir, "deleted.asm"), "gone:\n");
        let config = test_config();
        save_cache(&config.cache_path(dir.path()), &cached.snapshot())
            .await
            .unwrap();

        let manager = manager_for(&dir);
        let stats = manager.ensure_initialized().await;
        assert_eq!(stats.documents_pruned, 1);

        let cancel = no_cancel();
        assert_eq!(manager.find_definitions("fresh", &cancel).await.len(), 1);
        assert!(manager.find_definitions("stale", &cancel).await.is_empty());
        assert!(manager.find_definitions("gone", &cancel).await.is_empty());
        assert_eq!(manager.document_count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_cache_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.asm"), "start:\n").unwrap();
        let cache_path = test_config().cache_path(dir.path());
        fs::create_dir_all(cache_path.parent().unwrap()).unwrap();
        fs::write(&cache_path, "{ \"documents\": 7 }").unwrap();

        let manager = manager_for(&dir);
        let stats = manager.ensure_initialized().await;
        assert_eq!(stats.files_indexed, 1);
        assert_eq!(
            manager.lookup_symbol_kind("start", &no_cancel()).await,
            Some(DefinitionKind::Label)
        );
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_save() {
        let dir = TempDir::new().unwrap();
        let config = IndexerConfig {
            save_debounce_ms: 60_000,
            ..IndexerConfig::default()
        };
        let manager = IndexerManager::new(FsWorkspace::new(dir.path()), config);

        let doc = TextDocument::new(uri(&dir, "a.asm"), "start:\n");
        manager.index_document(&doc).await;
        assert!(manager.has_pending_save());
        assert!(!manager.cache_path().exists());

        manager.shutdown().await;
        assert!(!manager.has_pending_save());
        let persisted = load_cache(manager.cache_path()).await.unwrap();
        assert_eq!(persisted.documents.len(), 1);

        // no more saves once shut down
        manager.remove_document(&doc.uri).await;
        assert!(!manager.has_pending_save());
    }

    #[tokio::test]
    async fn test_shutdown_before_initialization() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.asm"), "start:\n").unwrap();
        let manager = manager_for(&dir);

        manager.shutdown().await;
        let stats = manager.ensure_initialized().await;
        assert!(stats.cancelled);
        assert_eq!(stats.files_indexed, 0);
    }

    #[tokio::test]
    async fn test_refresh_path() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);
        manager.ensure_initialized().await;
        let cancel = no_cancel();

        let path = dir.path().join("late.asm");
        fs::write(&path, "late:\n").unwrap();
        assert!(manager.refresh_path(&path).await);
        assert_eq!(manager.find_definitions("late", &cancel).await.len(), 1);

        fs::remove_file(&path).unwrap();
        assert!(manager.refresh_path(&path).await);
        assert!(manager.find_definitions("late", &cancel).await.is_empty());
        assert!(!manager.refresh_path(&path).await);

        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "hidden:\n").unwrap();
        assert!(!manager.refresh_path(&notes).await);
    }

    #[tokio::test]
    async fn test_refresh_path_leaves_host_documents() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);
        let path = dir.path().join("a.asm");
        fs::write(&path, "on_disk:\n").unwrap();

        let doc = TextDocument::new(uri(&dir, "a.asm"), "in_editor:\n");
        manager.index_document(&doc).await;
        assert!(!manager.refresh_path(&path).await);

        let cancel = no_cancel();
        assert_eq!(manager.find_definitions("in_editor", &cancel).await.len(), 1);
        assert!(manager.find_definitions("on_disk", &cancel).await.is_empty());
    }

    #[tokio::test]
    async fn test_definition_at() {
        let dir = TempDir::new().unwrap();
        let manager = manager_for(&dir);
        let doc = TextDocument::new(
            uri(&dir, "a.asm"),
            "counter equ 5\nresult: mov eax, counter\n",
        );
        manager.index_document(&doc).await;

        let cancel = no_cancel();
        let found = manager
            .definition_at(&doc, Position::new(1, 20), &cancel)
            .await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].range.start, Position::new(0, 0));

        let nothing = manager
            .definition_at(&doc, Position::new(1, 14), &cancel)
            .await;
        assert!(nothing.is_empty());
        assert!(manager
            .definition_at(&doc, Position::new(9, 0), &cancel)
            .await
            .is_empty());
    }
}
