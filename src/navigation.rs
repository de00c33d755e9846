//! Identifier under the cursor
//!
//! Uses the same charset as definitions, so whatever the classifier can
//! define, "go to definition" can pick up from a usage.

use crate::symbol_index::Range;
use crate::symbol_index::Position;

/// An identifier occurrence within a line, in UTF-16 columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub start: u32,
    pub end: u32,
}

impl Identifier {
    pub fn range(&self, line: u32) -> Range {
        Range::new(Position::new(line, self.start), Position::new(line, self.end))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '.' | '?' | '_' | '$')
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '#'
}

/// Identifier covering `column`, or ending right at it.
pub fn identifier_at(line: &str, column: u32) -> Option<Identifier> {
    let chars: Vec<char> = line.chars().collect();
    let mut columns = Vec::with_capacity(chars.len() + 1);
    let mut col = 0u32;
    for c in &chars {
        columns.push(col);
        col += c.len_utf16() as u32;
    }
    columns.push(col);

    // index of the char starting at or containing `column`
    let at = columns
        .iter()
        .rposition(|&start| start <= column)
        .unwrap_or(0);

    let anchor = if at < chars.len() && is_ident_char(chars[at]) {
        at
    } else if at > 0 && is_ident_char(chars[at - 1]) {
        at - 1
    } else {
        return None;
    };

    let mut start = anchor;
    while start > 0 && is_ident_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }

    if !is_ident_start(chars[start]) {
        return None;
    }

    Some(Identifier {
        name: chars[start..end].iter().collect(),
        start: columns[start],
        end: columns[end],
    })
}

/// Line `line` of `text`, if the document has that many lines.
pub fn line_text(text: &str, line: u32) -> Option<&str> {
    text.lines().nth(line as usize)
}
