//! Word list loading and candidate name generation.
//!
//! Names come from JSON word lists (`words`, `prefixes`, `roots`) or plain
//! text files with one word per line. Every prefix is combined with every
//! root, then all names are lowercased, validated and deduplicated in first
//! occurrence order.

use crate::error::DomainScoutError;
use crate::types::normalize_tld;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Raw contents of a word list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WordList {
    /// Names checked as is
    #[serde(default)]
    pub words: Vec<String>,

    /// Prepended to every root
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Combined with every prefix
    #[serde(default)]
    pub roots: Vec<String>,
}

impl WordList {
    /// Parse a JSON word list.
    pub fn from_json_str(content: &str) -> Result<Self, DomainScoutError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a JSON word list from disk.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DomainScoutError> {
        let path = path.as_ref();
        let content = read_file(path)?;
        serde_json::from_str(&content).map_err(|e| DomainScoutError::ParseError {
            message: format!("Invalid JSON word list '{}': {}", path.display(), e),
            content: None,
        })
    }

    /// Parse a plain-text word list: one word per line, blank lines and
    /// `#` comments ignored.
    pub fn from_text(content: &str) -> Self {
        let words = content
            .lines()
            .filter_map(|line| line.split('#').next())
            .map(str::trim)
            .filter(|word| !word.is_empty())
            .map(String::from)
            .collect();

        Self {
            words,
            ..Default::default()
        }
    }

    /// Load a plain-text word list from disk.
    pub fn from_text_file<P: AsRef<Path>>(path: P) -> Result<Self, DomainScoutError> {
        Ok(Self::from_text(&read_file(path.as_ref())?))
    }

    /// Append another list's words, prefixes and roots.
    pub fn extend(&mut self, other: WordList) {
        self.words.extend(other.words);
        self.prefixes.extend(other.prefixes);
        self.roots.extend(other.roots);
    }

    /// Every `prefix + root`, prefix-major.
    pub fn combinations(&self) -> Vec<String> {
        self.prefixes
            .iter()
            .flat_map(|prefix| {
                self.roots
                    .iter()
                    .map(move |root| format!("{}{}", prefix.trim(), root.trim()))
            })
            .collect()
    }

    /// Words followed by combinations, normalized and deduplicated.
    pub fn names(&self) -> Vec<String> {
        dedupe_names(self.words.iter().cloned().chain(self.combinations()))
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && (self.prefixes.is_empty() || self.roots.is_empty())
    }
}

fn read_file(path: &Path) -> Result<String, DomainScoutError> {
    if !path.exists() {
        return Err(DomainScoutError::file_error(
            path.to_string_lossy(),
            "File not found",
        ));
    }

    fs::read_to_string(path).map_err(|e| {
        DomainScoutError::file_error(path.to_string_lossy(), format!("Failed to read file: {}", e))
    })
}

/// Check that `name` can be used as the left-most label of a domain:
/// 2 to 63 characters, ASCII letters, digits and hyphens, no hyphen at
/// either end.
pub fn check_label(name: &str) -> Result<(), DomainScoutError> {
    let reason = if name.len() < 2 {
        "shorter than 2 characters"
    } else if name.len() > 63 {
        "longer than 63 characters"
    } else if name.starts_with('-') || name.ends_with('-') {
        "starts or ends with a hyphen"
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        "contains characters other than letters, digits and hyphens"
    } else {
        return Ok(());
    };

    Err(DomainScoutError::invalid_domain(name, reason))
}

pub fn is_valid_label(name: &str) -> bool {
    check_label(name).is_ok()
}

/// Lowercase, validate and deduplicate names, keeping first occurrences.
pub fn dedupe_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for name in names {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        if let Err(e) = check_label(&name) {
            tracing::warn!(error = %e, "skipping invalid name");
            continue;
        }
        if seen.insert(name.clone()) {
            result.push(name);
        }
    }

    result
}

/// Normalize a TLD list: trim, lowercase, drop leading dots and empties,
/// deduplicate in order.
pub fn normalize_tlds(tlds: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tlds.iter()
        .map(|tld| normalize_tld(tld))
        .filter(|tld| !tld.is_empty())
        .filter(|tld| seen.insert(tld.clone()))
        .collect()
}
