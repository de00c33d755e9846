//! Definition classifier for single source lines
//!
//! Recognizes the constructs that introduce a name (labels, data
//! declarations, `equ`, `define`, `macro`, assignments, ...) in one
//! comment-stripped line. Pure text in, structured matches out; nothing
//! here knows about documents or the index.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::table::DefinitionKind;

/// Identifier charset: `.`, `?`, letters, `_` and `$` may start a name,
/// digits and `#` may follow.
const IDENT: &str = r"[.?A-Za-z_$][.?A-Za-z_$0-9#]*";

const DATA_KEYWORDS: &str =
    "db|dw|dd|dq|dt|dp|ddq|dqq|ddqq|rb|rw|rd|rq|rt|rp|rdq|rqq|rdqq|emit|file";

lazy_static! {
    static ref LABEL_COLON: Regex = Regex::new(&format!(r"^\s*({IDENT})::?")).unwrap();

    /// Non-colon constructs, in precedence order. Every entry is tested
    /// independently, so one line may yield several definitions.
    static ref PATTERNS: Vec<(DefinitionConstruct, Regex)> = vec![
        (
            DefinitionConstruct::DataDeclaration,
            Regex::new(&format!(r"^\s*({IDENT})\s+(?i:{DATA_KEYWORDS})\b")).unwrap(),
        ),
        (
            DefinitionConstruct::LabelKeyword,
            Regex::new(&format!(r"^\s*(?i:label)\s+({IDENT})")).unwrap(),
        ),
        (
            DefinitionConstruct::Element,
            Regex::new(&format!(r"^\s*(?i:element)\s+({IDENT})")).unwrap(),
        ),
        (
            DefinitionConstruct::Define,
            Regex::new(&format!(r"^\s*(?i:(?:re)?define)\s+({IDENT})")).unwrap(),
        ),
        (
            DefinitionConstruct::Equ,
            Regex::new(&format!(r"^\s*({IDENT})\s+(?i:(?:re)?equ)\b")).unwrap(),
        ),
        (
            DefinitionConstruct::Macro,
            Regex::new(&format!(r"^\s*(?i:macro)\s+({IDENT})")).unwrap(),
        ),
        (
            DefinitionConstruct::Assignment,
            Regex::new(&format!(r"^\s*({IDENT})\s*(?::=|=:|=)")).unwrap(),
        ),
        (
            DefinitionConstruct::Load,
            Regex::new(&format!(r"^\s*(?i:load)\s+({IDENT})")).unwrap(),
        ),
    ];
}

/// The syntactic form a definition was recognized by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionConstruct {
    /// `name:` or `name::`
    LabelColon,
    /// `name db ...`, `name rw ...`, `name file ...`
    DataDeclaration,
    /// `label name`
    LabelKeyword,
    /// `element name`
    Element,
    /// `define name` / `redefine name`
    Define,
    /// `name equ ...` / `name reequ ...`
    Equ,
    /// `macro name`
    Macro,
    /// `name = ...`, `name =: ...`, `name := ...` (a colon glued to the name
    /// makes it a label instead)
    Assignment,
    /// `load name ...`
    Load,
}

impl DefinitionConstruct {
    pub fn kind(self) -> DefinitionKind {
        match self {
            DefinitionConstruct::LabelColon
            | DefinitionConstruct::DataDeclaration
            | DefinitionConstruct::LabelKeyword => DefinitionKind::Label,
            DefinitionConstruct::Element
            | DefinitionConstruct::Define
            | DefinitionConstruct::Equ
            | DefinitionConstruct::Macro
            | DefinitionConstruct::Assignment
            | DefinitionConstruct::Load => DefinitionKind::Value,
        }
    }
}

/// A name defined on a line, with its byte span inside that line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDefinition {
    /// Name exactly as written, including any trailing `?` marker
    pub name: String,
    pub construct: DefinitionConstruct,
    pub start: usize,
    pub end: usize,
}

impl LineDefinition {
    pub fn kind(&self) -> DefinitionKind {
        self.construct.kind()
    }
}

/// Drop everything from the first `;` onwards.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Classify one comment-stripped line.
///
/// A label-colon line yields exactly that label. Any other line is tested
/// against every remaining construct and may yield more than one definition.
pub fn classify_line(line: &str) -> Vec<LineDefinition> {
    if line.trim().is_empty() {
        return Vec::new();
    }

    if let Some(caps) = LABEL_COLON.captures(line) {
        return capture_definition(&caps, DefinitionConstruct::LabelColon)
            .into_iter()
            .collect();
    }

    PATTERNS
        .iter()
        .filter_map(|(construct, re)| {
            re.captures(line)
                .and_then(|caps| capture_definition(&caps, *construct))
        })
        .collect()
}

fn capture_definition(caps: &Captures, construct: DefinitionConstruct) -> Option<LineDefinition> {
    let name = caps.get(1)?;
    Some(LineDefinition {
        name: name.as_str().to_string(),
        construct,
        start: name.start(),
        end: name.end(),
    })
}
