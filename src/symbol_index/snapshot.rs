//! Serializable mirror of the per-document tables
//!
//! Layout on disk:
//!
//! ```json
//! { "documents": [ { "uri": "...",
//!                    "labelsSensitive": { "name": [ { "sl": 0, "sc": 0, "el": 0, "ec": 4 } ] },
//!                    "labelsInsensitive": {}, "valuesSensitive": {}, "valuesInsensitive": {} } ] }
//! ```
//!
//! Every field is required; a file missing any of them fails to parse.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::table::{Bucket, Position, Range, SymbolTable};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedIndex {
    pub documents: Vec<PersistedDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub uri: String,
    pub labels_sensitive: PersistedBucket,
    pub labels_insensitive: PersistedBucket,
    pub values_sensitive: PersistedBucket,
    pub values_insensitive: PersistedBucket,
}

pub type PersistedBucket = BTreeMap<String, Vec<PersistedRange>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRange {
    pub sl: u32,
    pub sc: u32,
    pub el: u32,
    pub ec: u32,
}

impl From<Range> for PersistedRange {
    fn from(range: Range) -> Self {
        Self {
            sl: range.start.line,
            sc: range.start.character,
            el: range.end.line,
            ec: range.end.character,
        }
    }
}

impl From<PersistedRange> for Range {
    fn from(range: PersistedRange) -> Self {
        Range::new(
            Position::new(range.sl, range.sc),
            Position::new(range.el, range.ec),
        )
    }
}

impl PersistedDocument {
    pub fn from_table(uri: &str, table: &SymbolTable) -> Self {
        Self {
            uri: uri.to_string(),
            labels_sensitive: persist_bucket(&table.labels_sensitive),
            labels_insensitive: persist_bucket(&table.labels_insensitive),
            values_sensitive: persist_bucket(&table.values_sensitive),
            values_insensitive: persist_bucket(&table.values_insensitive),
        }
    }

    /// Rebuild the in-memory table. Keys are taken as stored, without
    /// re-normalizing.
    pub fn to_table(&self) -> SymbolTable {
        SymbolTable {
            labels_sensitive: restore_bucket(&self.labels_sensitive),
            labels_insensitive: restore_bucket(&self.labels_insensitive),
            values_sensitive: restore_bucket(&self.values_sensitive),
            values_insensitive: restore_bucket(&self.values_insensitive),
        }
    }
}

fn persist_bucket(bucket: &Bucket) -> PersistedBucket {
    bucket
        .iter()
        .map(|(name, ranges)| {
            (
                name.clone(),
                ranges.iter().copied().map(PersistedRange::from).collect(),
            )
        })
        .collect()
}

fn restore_bucket(bucket: &PersistedBucket) -> Bucket {
    bucket
        .iter()
        .filter(|(_, ranges)| !ranges.is_empty())
        .map(|(name, ranges)| {
            (
                name.clone(),
                ranges.iter().copied().map(Range::from).collect(),
            )
        })
        .collect::<HashMap<_, _>>()
}
