//! Canonical lookup keys for defined and used names
//!
//! A trailing `?` marks a name as case-insensitive. The marker is removed
//! and insensitive names are keyed by their lower-cased spelling.

/// A defined name after marker resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionName {
    pub base_name: String,
    pub case_insensitive: bool,
}

impl DefinitionName {
    /// Storage key inside the bucket selected by `case_insensitive`
    pub fn key(&self) -> String {
        if self.case_insensitive {
            insensitive_key(&self.base_name)
        } else {
            self.base_name.clone()
        }
    }
}

/// A name as used at a lookup site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageName {
    pub base_name: String,
    /// The usage carried a `?` marker and must only search insensitive buckets
    pub explicit_case_insensitive: bool,
}

pub fn normalize_definition_name(raw: &str) -> Option<DefinitionName> {
    let (base_name, case_insensitive) = split_marker(raw)?;
    Some(DefinitionName {
        base_name: base_name.to_string(),
        case_insensitive,
    })
}

pub fn normalize_usage_name(raw: &str) -> Option<UsageName> {
    let (base_name, explicit_case_insensitive) = split_marker(raw)?;
    Some(UsageName {
        base_name: base_name.to_string(),
        explicit_case_insensitive,
    })
}

pub fn insensitive_key(name: &str) -> String {
    name.to_lowercase()
}

fn split_marker(raw: &str) -> Option<(&str, bool)> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    // a lone `?` is a name, not a marker
    match text.strip_suffix('?') {
        Some(base) if text.chars().count() > 1 => {
            if base.is_empty() {
                None
            } else {
                Some((base, true))
            }
        }
        _ => Some((text, false)),
    }
}
