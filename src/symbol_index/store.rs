//! Global symbol index
//!
//! Aggregates the tables of every indexed document into four name-keyed
//! maps and answers kind/definition queries across all of them.

use std::collections::HashMap;

use serde::Serialize;

use super::normalize::{insensitive_key, normalize_usage_name};
use super::snapshot::{PersistedDocument, PersistedIndex};
use super::table::{build_symbol_table, DefinitionKind, Range, SymbolTable};

/// One definition as seen by the aggregated maps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolLocation {
    pub uri: String,
    pub range: Range,
    pub kind: DefinitionKind,
    pub case_insensitive: bool,
}

/// Answer to a definition query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DefinitionLocation {
    pub uri: String,
    pub range: Range,
}

impl From<&SymbolLocation> for DefinitionLocation {
    fn from(location: &SymbolLocation) -> Self {
        Self {
            uri: location.uri.clone(),
            range: location.range,
        }
    }
}

type Aggregate = HashMap<String, Vec<SymbolLocation>>;

/// In-memory index over all documents
#[derive(Debug, Default)]
pub struct SymbolIndex {
    documents: HashMap<String, SymbolTable>,
    labels_sensitive: Aggregate,
    labels_insensitive: Aggregate,
    values_sensitive: Aggregate,
    values_insensitive: Aggregate,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `text` and make it the sole contribution of `uri`.
    pub fn index_text(&mut self, uri: &str, text: &str) {
        self.replace_document(uri, build_symbol_table(text));
    }

    /// Drop everything `uri` contributed, then insert `table` in its place.
    pub fn replace_document(&mut self, uri: &str, table: SymbolTable) {
        self.remove_document(uri);
        self.insert_entries(uri, &table);
        self.documents.insert(uri.to_string(), table);
    }

    /// Remove a document without rescanning. Returns whether it was indexed.
    pub fn remove_document(&mut self, uri: &str) -> bool {
        let Some(old) = self.documents.remove(uri) else {
            return false;
        };

        for (kind, case_insensitive, bucket) in old.buckets() {
            let aggregate = self.aggregate_mut(kind, case_insensitive);
            for key in bucket.keys() {
                let now_empty = match aggregate.get_mut(key) {
                    Some(locations) => {
                        locations.retain(|loc| loc.uri != uri);
                        locations.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    aggregate.remove(key);
                }
            }
        }
        true
    }

    fn insert_entries(&mut self, uri: &str, table: &SymbolTable) {
        for (kind, case_insensitive, bucket) in table.buckets() {
            let aggregate = self.aggregate_mut(kind, case_insensitive);
            for (key, ranges) in bucket {
                let locations = aggregate.entry(key.clone()).or_default();
                locations.extend(ranges.iter().map(|range| SymbolLocation {
                    uri: uri.to_string(),
                    range: *range,
                    kind,
                    case_insensitive,
                }));
            }
        }
    }

    /// Classify a usage. Sensitive labels, then sensitive values (skipped
    /// for `name?` usages), then insensitive labels and values by
    /// lower-cased name.
    pub fn lookup_symbol_kind(&self, raw_usage_name: &str) -> Option<DefinitionKind> {
        let usage = normalize_usage_name(raw_usage_name)?;

        if !usage.explicit_case_insensitive {
            if self.labels_sensitive.contains_key(&usage.base_name) {
                return Some(DefinitionKind::Label);
            }
            if self.values_sensitive.contains_key(&usage.base_name) {
                return Some(DefinitionKind::Value);
            }
        }

        let key = insensitive_key(&usage.base_name);
        if self.labels_insensitive.contains_key(&key) {
            return Some(DefinitionKind::Label);
        }
        if self.values_insensitive.contains_key(&key) {
            return Some(DefinitionKind::Value);
        }
        None
    }

    /// Definition sites for a usage, with the same precedence as
    /// [`Self::lookup_symbol_kind`]. Any sensitive match hides the
    /// insensitive ones.
    pub fn find_definitions(&self, raw_usage_name: &str) -> Vec<DefinitionLocation> {
        let Some(usage) = normalize_usage_name(raw_usage_name) else {
            return Vec::new();
        };

        if !usage.explicit_case_insensitive {
            let sensitive = collect(&[&self.labels_sensitive, &self.values_sensitive], &usage.base_name);
            if !sensitive.is_empty() {
                return sensitive;
            }
        }

        let key = insensitive_key(&usage.base_name);
        collect(&[&self.labels_insensitive, &self.values_insensitive], &key)
    }

    pub fn contains_document(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn document(&self, uri: &str) -> Option<&SymbolTable> {
        self.documents.get(uri)
    }

    pub fn document_uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn definition_count(&self) -> usize {
        self.documents.values().map(SymbolTable::definition_count).sum()
    }

    /// Plain-record copy of every document table, ordered by URI.
    pub fn snapshot(&self) -> PersistedIndex {
        let mut documents: Vec<PersistedDocument> = self
            .documents
            .iter()
            .map(|(uri, table)| PersistedDocument::from_table(uri, table))
            .collect();
        documents.sort_by(|a, b| a.uri.cmp(&b.uri));
        PersistedIndex { documents }
    }

    /// Load persisted documents that are not indexed yet. Documents already
    /// present are newer than anything on disk and are kept. Returns the
    /// number of documents restored.
    pub fn restore(&mut self, persisted: PersistedIndex) -> usize {
        let mut restored = 0;
        for document in persisted.documents {
            if self.documents.contains_key(&document.uri) {
                continue;
            }
            let table = document.to_table();
            self.replace_document(&document.uri, table);
            restored += 1;
        }
        restored
    }

    fn aggregate_mut(&mut self, kind: DefinitionKind, case_insensitive: bool) -> &mut Aggregate {
        match (kind, case_insensitive) {
            (DefinitionKind::Label, false) => &mut self.labels_sensitive,
            (DefinitionKind::Label, true) => &mut self.labels_insensitive,
            (DefinitionKind::Value, false) => &mut self.values_sensitive,
            (DefinitionKind::Value, true) => &mut self.values_insensitive,
        }
    }
}

fn collect(aggregates: &[&Aggregate], key: &str) -> Vec<DefinitionLocation> {
    aggregates
        .iter()
        .filter_map(|aggregate| aggregate.get(key))
        .flatten()
        .map(DefinitionLocation::from)
        .collect()
}
