//! Per-document symbol tables
//!
//! A document is scanned line by line through the classifier; every
//! recognized definition lands in one of four buckets (label/value by
//! sensitive/insensitive).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::classifier::{classify_line, strip_comment};
use super::normalize::normalize_definition_name;

/// What a defined name stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// Jump or data target
    Label,
    /// Computed or assigned quantity (constants, macros, ...)
    Value,
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DefinitionKind::Label => "label",
            DefinitionKind::Value => "value",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for DefinitionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "label" => Ok(DefinitionKind::Label),
            "value" => Ok(DefinitionKind::Value),
            _ => Err(format!("Unknown definition kind: {}", s)),
        }
    }
}

/// Position in source code (0-based line, UTF-16 column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open range in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range of the byte span `start..end` inside `line_text`, on line `line`.
    pub fn on_line(line: u32, line_text: &str, start: usize, end: usize) -> Self {
        Self {
            start: Position::new(line, utf16_column(line_text, start)),
            end: Position::new(line, utf16_column(line_text, end)),
        }
    }
}

/// UTF-16 column of a byte offset
pub fn utf16_column(text: &str, byte_offset: usize) -> u32 {
    let end = byte_offset.min(text.len());
    text.get(..end)
        .map(|prefix| prefix.encode_utf16().count() as u32)
        .unwrap_or(0)
}

pub type Bucket = HashMap<String, Vec<Range>>;

/// Definitions found in one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    pub labels_sensitive: Bucket,
    pub labels_insensitive: Bucket,
    pub values_sensitive: Bucket,
    pub values_insensitive: Bucket,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_label(&mut self, raw_name: &str, range: Range) {
        self.add(DefinitionKind::Label, raw_name, range);
    }

    pub fn add_value(&mut self, raw_name: &str, range: Range) {
        self.add(DefinitionKind::Value, raw_name, range);
    }

    /// Normalize `raw_name` and append `range` under its key. Names that
    /// normalize to nothing are ignored.
    pub fn add(&mut self, kind: DefinitionKind, raw_name: &str, range: Range) {
        let Some(name) = normalize_definition_name(raw_name) else {
            return;
        };
        self.bucket_mut(kind, name.case_insensitive)
            .entry(name.key())
            .or_default()
            .push(range);
    }

    pub fn bucket(&self, kind: DefinitionKind, case_insensitive: bool) -> &Bucket {
        match (kind, case_insensitive) {
            (DefinitionKind::Label, false) => &self.labels_sensitive,
            (DefinitionKind::Label, true) => &self.labels_insensitive,
            (DefinitionKind::Value, false) => &self.values_sensitive,
            (DefinitionKind::Value, true) => &self.values_insensitive,
        }
    }

    pub fn bucket_mut(&mut self, kind: DefinitionKind, case_insensitive: bool) -> &mut Bucket {
        match (kind, case_insensitive) {
            (DefinitionKind::Label, false) => &mut self.labels_sensitive,
            (DefinitionKind::Label, true) => &mut self.labels_insensitive,
            (DefinitionKind::Value, false) => &mut self.values_sensitive,
            (DefinitionKind::Value, true) => &mut self.values_insensitive,
        }
    }

    /// All four buckets with their kind and case policy
    pub fn buckets(&self) -> [(DefinitionKind, bool, &Bucket); 4] {
        [
            (DefinitionKind::Label, false, &self.labels_sensitive),
            (DefinitionKind::Label, true, &self.labels_insensitive),
            (DefinitionKind::Value, false, &self.values_sensitive),
            (DefinitionKind::Value, true, &self.values_insensitive),
        ]
    }

    pub fn definition_count(&self) -> usize {
        self.buckets()
            .iter()
            .map(|(_, _, bucket)| bucket.values().map(Vec::len).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets().iter().all(|(_, _, bucket)| bucket.is_empty())
    }
}

/// Scan a whole document into a fresh table.
pub fn build_symbol_table(text: &str) -> SymbolTable {
    let mut table = SymbolTable::new();
    for (line_no, line) in text.lines().enumerate() {
        scan_line(&mut table, line_no as u32, line);
    }
    table
}

/// Like [`build_symbol_table`], checking `cancel` before every line.
/// Returns `None` once cancellation is observed.
pub fn build_symbol_table_cancellable(text: &str, cancel: &CancellationToken) -> Option<SymbolTable> {
    let mut table = SymbolTable::new();
    for (line_no, line) in text.lines().enumerate() {
        if cancel.is_cancelled() {
            return None;
        }
        scan_line(&mut table, line_no as u32, line);
    }
    Some(table)
}

fn scan_line(table: &mut SymbolTable, line_no: u32, line: &str) {
    let code = strip_comment(line);
    if code.trim().is_empty() {
        return;
    }

    for definition in classify_line(code) {
        let range = Range::on_line(line_no, code, definition.start, definition.end);
        table.add(definition.kind(), &definition.name, range);
    }
}
