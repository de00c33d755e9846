pub mod types;
pub mod workspace;
pub mod cache;
pub mod saver;
pub mod manager;
pub mod watcher;

pub use types::{DocumentFilter, ScanStats, TextDocument};
pub use workspace::{path_to_uri, FsWorkspace, Workspace, WorkspaceError};
pub use cache::{load_cache, save_cache, CacheError};
pub use saver::SaveScheduler;
pub use manager::IndexerManager;
pub use watcher::IndexWatcher;
