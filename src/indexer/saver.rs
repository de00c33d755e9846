//! Debounced cache writes
//!
//! Every `schedule` cancels the previously scheduled save and starts a new
//! delay; only a save whose delay elapses uncancelled touches the disk.
//! Writes are serialized, and `flush` turns a pending save into an
//! immediate one for shutdown.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::cache::{save_cache, CacheError};
use crate::symbol_index::SymbolIndex;

struct PendingSave {
    generation: u64,
    cancel: CancellationToken,
}

struct SaverInner {
    index: Arc<RwLock<SymbolIndex>>,
    cache_path: PathBuf,
    delay: Duration,
    pending: Mutex<Option<PendingSave>>,
    generation: AtomicU64,
    /// Completed cache writes
    saves: AtomicU64,
    write_lock: tokio::sync::Mutex<()>,
}

impl SaverInner {
    fn pending(&self) -> MutexGuard<'_, Option<PendingSave>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the pending save if it is still `generation`.
    fn claim(&self, generation: u64) -> bool {
        let mut pending = self.pending();
        let current = pending
            .as_ref()
            .is_some_and(|save| save.generation == generation);
        if current {
            pending.take();
        }
        current
    }

    /// Caller must hold `write_lock`.
    async fn persist(&self) -> Result<(), CacheError> {
        let snapshot = self.index.read().await.snapshot();
        let documents = snapshot.documents.len();
        match save_cache(&self.cache_path, &snapshot).await {
            Ok(()) => {
                let saves = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(
                    "Saved symbol cache #{} ({} documents) to {}",
                    saves,
                    documents,
                    self.cache_path.display()
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to save symbol cache {}: {}", self.cache_path.display(), e);
                Err(e)
            }
        }
    }
}

/// Cancel-and-reschedule writer for the symbol cache
#[derive(Clone)]
pub struct SaveScheduler {
    inner: Arc<SaverInner>,
}

impl SaveScheduler {
    pub fn new(index: Arc<RwLock<SymbolIndex>>, cache_path: PathBuf, delay: Duration) -> Self {
        Self {
            inner: Arc::new(SaverInner {
                index,
                cache_path,
                delay,
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
                saves: AtomicU64::new(0),
                write_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.inner.cache_path
    }

    /// (Re)start the delay. Must be called from within a Tokio runtime.
    pub fn schedule(&self) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();

        let previous = self.inner.pending().replace(PendingSave {
            generation,
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => { return; }
                _ = tokio::time::sleep(inner.delay) => {}
            }

            let _guard = inner.write_lock.lock().await;
            if !inner.claim(generation) {
                return;
            }
            let _ = inner.persist().await;
        });
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending().is_some()
    }

    /// Cancel the pending save, if any, and perform it right away.
    /// Returns whether a save was pending.
    pub async fn flush(&self) -> bool {
        let _guard = self.inner.write_lock.lock().await;
        let Some(pending) = self.inner.pending().take() else {
            return false;
        };
        pending.cancel.cancel();
        let _ = self.inner.persist().await;
        true
    }

    /// Drop the pending save without writing anything.
    pub fn cancel(&self) {
        if let Some(pending) = self.inner.pending().take() {
            pending.cancel.cancel();
        }
    }

    /// Write the cache now, superseding any pending save.
    pub async fn save_now(&self) -> Result<(), CacheError> {
        let _guard = self.inner.write_lock.lock().await;
        if let Some(pending) = self.inner.pending().take() {
            pending.cancel.cancel();
        }
        self.inner.persist().await
    }
}
