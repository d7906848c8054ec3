//! Whole-word trigger matching.
//!
//! The responder only needs to know whether a trigger occurs as a whole word
//! in an utterance and where. [`WordMatcher`] captures that, so the regex
//! implementation can be swapped for a plain token scan without touching the
//! selection algorithm.

use std::collections::HashMap;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{ElizaScriptError, Result};

/// How trigger text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSyntax {
    /// The trigger is literal text; regex metacharacters have no special meaning.
    #[default]
    Literal,
    /// The trigger is a regular expression, bounded by `\b` on both sides.
    Pattern,
}

impl std::str::FromStr for TriggerSyntax {
    type Err = ElizaScriptError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "pattern" | "regex" => Ok(Self::Pattern),
            other => Err(ElizaScriptError::config(format!(
                "unknown trigger syntax {other:?} (expected \"literal\" or \"pattern\")"
            ))),
        }
    }
}

/// Finds whole-word occurrences of a trigger in an utterance.
pub trait WordMatcher: Send + Sync {
    /// Byte range of the first whole-word occurrence of `needle` in `haystack`.
    fn find_whole_word(&self, haystack: &str, needle: &str) -> Option<Range<usize>>;

    /// Returns true if `needle` occurs in `haystack` as a whole word.
    fn contains_whole_word(&self, haystack: &str, needle: &str) -> bool {
        self.find_whole_word(haystack, needle).is_some()
    }
}

/// Regex-backed matcher. Case-insensitive.
///
/// Triggers known up front are compiled once by [`RegexMatcher::for_triggers`];
/// any other needle is compiled on demand.
#[derive(Debug, Clone, Default)]
pub struct RegexMatcher {
    syntax: TriggerSyntax,
    compiled: HashMap<String, Regex>,
}

impl RegexMatcher {
    /// Creates a matcher with no precompiled triggers.
    pub fn new(syntax: TriggerSyntax) -> Self {
        Self {
            syntax,
            compiled: HashMap::new(),
        }
    }

    /// Creates a matcher and compiles every trigger in `triggers`.
    ///
    /// # Errors
    ///
    /// Returns [`ElizaScriptError::InvalidTrigger`] for the first trigger that
    /// does not compile. Only possible with [`TriggerSyntax::Pattern`].
    pub fn for_triggers<'a, I>(syntax: TriggerSyntax, triggers: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut compiled = HashMap::new();
        for trigger in triggers {
            if compiled.contains_key(trigger) {
                continue;
            }
            let re = build_regex(syntax, trigger)?;
            compiled.insert(trigger.to_string(), re);
        }
        Ok(Self { syntax, compiled })
    }

    /// The trigger syntax in use.
    pub fn syntax(&self) -> TriggerSyntax {
        self.syntax
    }
}

/// Literal triggers capture group 1; the surrounding groups only assert a
/// non-word neighbour, since the regex crate has no lookbehind.
fn build_regex(syntax: TriggerSyntax, trigger: &str) -> Result<Regex> {
    let source = match syntax {
        TriggerSyntax::Literal => format!(r"(?:^|\W)({})(?:\W|$)", regex::escape(trigger)),
        TriggerSyntax::Pattern => format!(r"\b({})\b", trigger),
    };
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .build()
        .map_err(|source| ElizaScriptError::InvalidTrigger {
            trigger: trigger.to_string(),
            source,
        })
}

fn span_of(re: &Regex, haystack: &str) -> Option<Range<usize>> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
}

impl WordMatcher for RegexMatcher {
    fn find_whole_word(&self, haystack: &str, needle: &str) -> Option<Range<usize>> {
        if needle.trim().is_empty() {
            return None;
        }
        match self.compiled.get(needle) {
            Some(re) => span_of(re, haystack),
            // An invalid ad-hoc pattern simply never matches.
            None => build_regex(self.syntax, needle)
                .ok()
                .and_then(|re| span_of(&re, haystack)),
        }
    }
}

/// Whitespace-token matcher: the trigger's words must appear as consecutive
/// tokens of the utterance. Punctuation attached to a token is part of it, so
/// `"sad."` does not match the trigger `sad`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMatcher;

fn token_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push(s..i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(s..text.len());
    }
    spans
}

impl WordMatcher for TokenMatcher {
    fn find_whole_word(&self, haystack: &str, needle: &str) -> Option<Range<usize>> {
        let wanted: Vec<String> = needle.split_whitespace().map(str::to_lowercase).collect();
        if wanted.is_empty() {
            return None;
        }
        let spans = token_spans(haystack);
        spans.windows(wanted.len()).find_map(|window| {
            let hit = window
                .iter()
                .zip(&wanted)
                .all(|(span, word)| haystack[span.clone()].to_lowercase() == *word);
            hit.then(|| window[0].start..window[window.len() - 1].end)
        })
    }
}
