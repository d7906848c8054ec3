//! Error types for the ELIZA script responder.
//!
//! Loading is the only fallible stage: once a [`Script`](crate::Script) and its
//! substitution tables are built, matching and substitution never fail.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for ELIZA script operations.
pub type Result<T> = std::result::Result<T, ElizaScriptError>;

/// Errors that can occur while loading or driving an ELIZA script.
#[derive(Error, Debug)]
pub enum ElizaScriptError {
    /// A script or substitution file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A substitution line has no `key,value` delimiter.
    #[error("{source_name}:{line_number}: missing ',' delimiter in substitution line {line:?}")]
    MissingDelimiter {
        /// Name of the source being parsed.
        source_name: String,
        /// 1-based line number.
        line_number: usize,
        /// The offending line.
        line: String,
    },

    /// The script does not contain the four reserved groups.
    #[error("{source_name}: script needs at least 4 groups (welcome, farewell, quit phrases, fallbacks), found {found}")]
    TooFewGroups {
        /// Name of the source being parsed.
        source_name: String,
        /// Number of groups found.
        found: usize,
    },

    /// Two adjacent separators produced a group with no lines.
    #[error("{source_name}: group {index} is empty")]
    EmptyGroup {
        /// Name of the source being parsed.
        source_name: String,
        /// 0-based group index.
        index: usize,
    },

    /// A keyword group has a trigger but no response templates.
    #[error("{source_name}: keyword group {index} ({trigger:?}) has no response templates")]
    MissingResponses {
        /// Name of the source being parsed.
        source_name: String,
        /// 0-based group index.
        index: usize,
        /// The group's trigger.
        trigger: String,
    },

    /// A trigger is not valid pattern syntax.
    #[error("Invalid trigger {trigger:?}: {source}")]
    InvalidTrigger {
        /// The trigger text.
        trigger: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// Reading from or writing to the console failed.
    #[error("Console error: {0}")]
    Console(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ElizaScriptError {
    /// Create an I/O error for a file path.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns true for errors raised while loading a script or substitution table.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::MissingDelimiter { .. }
                | Self::TooFewGroups { .. }
                | Self::EmptyGroup { .. }
                | Self::MissingResponses { .. }
        )
    }
}
