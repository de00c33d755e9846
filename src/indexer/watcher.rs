use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::indexer::manager::IndexerManager;
use crate::indexer::types::DocumentFilter;
use crate::indexer::workspace::{Workspace, SKIP_DIRS};

/// Keeps the index in step with files edited outside the host
///
/// Dropping the watcher stops both the notify backend and the update task.
pub struct IndexWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl IndexWatcher {
    /// Watch the manager's workspace root. Must be called from within a
    /// Tokio runtime.
    pub fn new<W: Workspace>(
        manager: IndexerManager<W>,
        debounce: Duration,
    ) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let _ = tx.send(event);
                }
                Err(e) => tracing::warn!("File watcher error: {}", e),
            },
            Config::default(),
        )?;

        let root = manager.workspace().root().to_path_buf();
        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::info!("Watching {} for source changes", root.display());

        let task = tokio::spawn(debounced_update_loop(manager, rx, debounce));

        Ok(Self {
            _watcher: watcher,
            task,
        })
    }
}

impl Drop for IndexWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Collect changed paths until `debounce` passes without a new event, then
/// apply them in one batch.
async fn debounced_update_loop<W: Workspace>(
    manager: IndexerManager<W>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    debounce: Duration,
) {
    let root = manager.workspace().root().to_path_buf();
    let mut pending_changes: HashSet<PathBuf> = HashSet::new();

    loop {
        if pending_changes.is_empty() {
            match rx.recv().await {
                Some(event) => pending_changes.extend(extract_paths(&event, manager.filter(), &root)),
                None => break,
            }
            continue;
        }

        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => pending_changes.extend(extract_paths(&event, manager.filter(), &root)),
                None => {
                    apply_changes(&manager, pending_changes.drain()).await;
                    break;
                }
            },
            _ = tokio::time::sleep(debounce) => {
                apply_changes(&manager, pending_changes.drain()).await;
            }
        }
    }
}

fn extract_paths(event: &Event, filter: &DocumentFilter, root: &Path) -> Vec<PathBuf> {
    if matches!(event.kind, EventKind::Access(_)) {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter(|p| filter.accepts_path(p) && !in_skipped_dir(p.strip_prefix(root).unwrap_or(p)))
        .cloned()
        .collect()
}

fn in_skipped_dir(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_str().is_some_and(|n| SKIP_DIRS.contains(&n)),
        _ => false,
    })
}

async fn apply_changes<W: Workspace>(
    manager: &IndexerManager<W>,
    paths: impl Iterator<Item = PathBuf>,
) {
    let mut changed = 0;
    for path in paths {
        if manager.refresh_path(&path).await {
            changed += 1;
        }
    }
    if changed > 0 {
        tracing::debug!("Applied {} on-disk changes", changed);
    }
}
