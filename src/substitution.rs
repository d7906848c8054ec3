//! Word substitution tables.
//!
//! The same structure backs both stages of the pipeline: pre-substitution
//! normalises raw input before keyword matching ("im" -> "you are"), and
//! post-substitution flips pronouns in the captured context ("my" -> "your").

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{ElizaScriptError, Result};

/// An immutable mapping from a single lowercase word to its replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: HashMap<String, String>,
}

impl SubstitutionTable {
    /// Creates an empty table. Substituting through it only normalises case and spacing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `key,value` lines.
    ///
    /// Only the first comma delimits, so a value may itself contain commas.
    /// Blank lines are skipped. A line without any comma is an error; the
    /// table is never returned partially populated.
    ///
    /// # Errors
    ///
    /// Returns [`ElizaScriptError::MissingDelimiter`] naming `source_name` and
    /// the 1-based line number of the first malformed line.
    pub fn parse(source_name: &str, text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) =
                line.split_once(',')
                    .ok_or_else(|| ElizaScriptError::MissingDelimiter {
                        source_name: source_name.to_string(),
                        line_number: idx + 1,
                        line: line.to_string(),
                    })?;
            if key.chars().any(char::is_uppercase) {
                warn!(
                    source = source_name,
                    line = idx + 1,
                    key,
                    "substitution key has uppercase letters and will never match"
                );
            }
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(Self { entries })
    }

    /// Reads and parses a substitution file.
    ///
    /// # Errors
    ///
    /// Returns [`ElizaScriptError::Io`] if the file cannot be read, or any
    /// error from [`SubstitutionTable::parse`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ElizaScriptError::io(path, e))?;
        let table = Self::parse(&path.display().to_string(), &text)?;
        info!(path = %path.display(), entries = table.len(), "loaded substitution table");
        Ok(table)
    }

    /// Returns the replacement for an exact, already-lowercased word.
    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowercases `text`, splits it on whitespace and replaces every token that
    /// is a key of this table. Each token is replaced at most once; the
    /// replacement is never looked up again.
    pub fn substitute(&self, text: &str) -> String {
        self.substitute_tokens(text).join(" ")
    }

    /// Token-wise form of [`SubstitutionTable::substitute`]: one output entry per
    /// input token, before joining.
    pub fn substitute_tokens<'a>(&'a self, text: &str) -> Vec<Cow<'a, str>> {
        text.to_lowercase()
            .split_whitespace()
            .map(|word| match self.get(word) {
                Some(replacement) => Cow::Borrowed(replacement),
                None => Cow::Owned(word.to_string()),
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for SubstitutionTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Applies `table` to `text`. See [`SubstitutionTable::substitute`].
pub fn substitute(text: &str, table: &SubstitutionTable) -> String {
    table.substitute(text)
}
