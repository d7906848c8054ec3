//! Script data model and parser.
//!
//! A script is a text file of response groups separated by `>>` lines. Groups
//! are positional: the first two hold the welcome and farewell lines, the
//! last two hold the quit phrases and the fallback responses, and everything
//! in between is an ordinary keyword group.
//!
//! ```text
//! Hello. How are you feeling today?
//! >>
//! Goodbye. It was nice talking to you.
//! >>
//! sad
//! Why are you sad *?
//! I am sorry to hear that you are sad.
//! >>
//! bye
//! quit
//! >>
//! Please go on.
//! Tell me more.
//! >>
//! ```

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{ElizaScriptError, Result};

/// Line that terminates a response group.
pub const GROUP_SEPARATOR: &str = ">>";

/// Marker in a response template replaced by the captured context.
pub const WILDCARD: &str = "*";

/// Minimum number of groups: welcome, farewell, quit phrases, fallbacks.
pub const MIN_GROUPS: usize = 4;

/// An ordered list of lines. For keyword groups, line 0 is the trigger and the
/// rest are response templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseGroup {
    lines: Vec<String>,
}

impl ResponseGroup {
    /// Creates a group from its lines.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// All lines in file order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The first line: the trigger of a keyword group, or the message of the
    /// welcome and farewell groups.
    pub fn head(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    /// The trigger of a keyword group.
    pub fn trigger(&self) -> &str {
        self.head()
    }

    /// Response templates of a keyword group (every line after the trigger).
    pub fn templates(&self) -> &[String] {
        self.lines.get(1..).unwrap_or_default()
    }

    /// Number of lines, trigger included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the group has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns true if some line equals `text` exactly.
    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|line| line == text)
    }
}

/// An immutable, validated script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    groups: Vec<ResponseGroup>,
}

impl Script {
    /// Builds a script from groups already split into lines.
    ///
    /// # Errors
    ///
    /// Fails if there are fewer than [`MIN_GROUPS`] groups, if any group is
    /// empty, or if a keyword group has no response template.
    ///
    /// Surrounding whitespace is trimmed from keyword triggers.
    pub fn from_groups(source_name: &str, mut groups: Vec<ResponseGroup>) -> Result<Self> {
        if groups.len() < MIN_GROUPS {
            return Err(ElizaScriptError::TooFewGroups {
                source_name: source_name.to_string(),
                found: groups.len(),
            });
        }
        if let Some(index) = groups.iter().position(ResponseGroup::is_empty) {
            return Err(ElizaScriptError::EmptyGroup {
                source_name: source_name.to_string(),
                index,
            });
        }
        let keyword_end = groups.len() - 2;
        for group in &mut groups[2..keyword_end] {
            if let Some(trigger) = group.lines.first_mut() {
                *trigger = trigger.trim().to_string();
            }
        }
        let script = Self { groups };
        for (index, group) in script.keyword_groups_indexed() {
            if group.templates().is_empty() {
                return Err(ElizaScriptError::MissingResponses {
                    source_name: source_name.to_string(),
                    index,
                    trigger: group.trigger().to_string(),
                });
            }
        }
        Ok(script)
    }

    /// Parses script text. Every run of lines up to a `>>` line becomes one
    /// group; a final run with no closing separator is kept as well. Blank
    /// lines are ignored and a trailing `\r` is stripped from each line.
    ///
    /// # Errors
    ///
    /// See [`Script::from_groups`].
    pub fn parse(source_name: &str, text: &str) -> Result<Self> {
        let mut groups = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for raw in text.lines() {
            let line = raw.trim_end_matches('\r');
            if line == GROUP_SEPARATOR {
                groups.push(ResponseGroup {
                    lines: std::mem::take(&mut current),
                });
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            current.push(line.to_string());
        }
        if !current.is_empty() {
            groups.push(ResponseGroup { lines: current });
        }
        Self::from_groups(source_name, groups)
    }

    /// Reads and parses a script file.
    ///
    /// # Errors
    ///
    /// Returns [`ElizaScriptError::Io`] if the file cannot be read, or any
    /// validation error from [`Script::parse`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ElizaScriptError::io(path, e))?;
        let script = Self::parse(&path.display().to_string(), &text)?;
        info!(
            path = %path.display(),
            groups = script.groups.len(),
            keywords = script.keyword_groups().len(),
            "loaded script"
        );
        Ok(script)
    }

    /// All groups in file order.
    pub fn groups(&self) -> &[ResponseGroup] {
        &self.groups
    }

    /// Message printed once when a session starts.
    pub fn welcome(&self) -> &str {
        self.groups[0].head()
    }

    /// Message printed when a session ends.
    pub fn farewell(&self) -> &str {
        self.groups[1].head()
    }

    /// Phrases that end the session when entered exactly.
    pub fn quit_phrases(&self) -> &ResponseGroup {
        &self.groups[self.groups.len() - 2]
    }

    /// Responses used when no keyword group matches.
    pub fn fallbacks(&self) -> &ResponseGroup {
        &self.groups[self.groups.len() - 1]
    }

    /// Ordinary keyword groups, in the order they are tried.
    pub fn keyword_groups(&self) -> &[ResponseGroup] {
        &self.groups[2..self.groups.len() - 2]
    }

    /// Returns true if `raw` equals one of the quit phrases exactly.
    pub fn is_quit(&self, raw: &str) -> bool {
        self.quit_phrases().contains(raw)
    }

    fn keyword_groups_indexed(&self) -> impl Iterator<Item = (usize, &ResponseGroup)> {
        self.keyword_groups()
            .iter()
            .enumerate()
            .map(|(i, group)| (i + 2, group))
    }
}
