pub mod cli;
pub mod config;
pub mod indexer;
pub mod navigation;
pub mod symbol_index;
