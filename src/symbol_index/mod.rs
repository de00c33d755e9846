//! Symbol Index for fasm-style sources
//!
//! Maps label and value names to the places that define them, across
//! every indexed document. Everything in here is synchronous and free of
//! I/O; the `indexer` module drives it from the host.
//!
//! Pipeline:
//! - classifier: one comment-stripped line -> defined names
//! - table: one document -> four-bucket `SymbolTable`
//! - store: all tables -> aggregated `SymbolIndex` with lookups
//! - snapshot: `SymbolIndex` <-> plain records for the cache file

pub mod classifier;
pub mod normalize;
pub mod snapshot;
mod store;
pub mod table;

pub use classifier::{classify_line, strip_comment, DefinitionConstruct, LineDefinition};
pub use normalize::{normalize_definition_name, normalize_usage_name, DefinitionName, UsageName};
pub use snapshot::{PersistedDocument, PersistedIndex, PersistedRange};
pub use store::{DefinitionLocation, SymbolIndex, SymbolLocation};
pub use table::{
    build_symbol_table, build_symbol_table_cancellable, DefinitionKind, Position, Range,
    SymbolTable,
};
