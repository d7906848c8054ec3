//! Configuration for the ELIZA script responder.
//!
//! Configuration is loaded from environment variables, a JSON file, or
//! provided explicitly through the `with_*` builders.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ElizaScriptError, Result};
use crate::matcher::TriggerSyntax;

/// Default pre-substitution file, relative to the working directory.
pub const DEFAULT_PRE_SUBSTITUTIONS: &str = "PreSubstitute.txt";

/// Default post-substitution file, relative to the working directory.
pub const DEFAULT_POST_SUBSTITUTIONS: &str = "PostSubstitute.txt";

/// Default pause before each reply, in milliseconds.
pub const DEFAULT_RESPONSE_DELAY_MS: u64 = 1000;

/// Configuration for loading a script and running sessions over it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElizaScriptConfig {
    /// Script file.
    script_path: Option<PathBuf>,
    /// Substitutions applied to raw input before matching.
    pre_substitutions_path: PathBuf,
    /// Substitutions applied to the captured context.
    post_substitutions_path: PathBuf,
    /// Pause before each reply.
    response_delay_ms: u64,
    /// Seed for the session RNG; `None` seeds from entropy.
    seed: Option<u64>,
    /// How triggers are interpreted.
    trigger_syntax: TriggerSyntax,
}

impl Default for ElizaScriptConfig {
    fn default() -> Self {
        Self {
            script_path: None,
            pre_substitutions_path: PathBuf::from(DEFAULT_PRE_SUBSTITUTIONS),
            post_substitutions_path: PathBuf::from(DEFAULT_POST_SUBSTITUTIONS),
            response_delay_ms: DEFAULT_RESPONSE_DELAY_MS,
            seed: None,
            trigger_syntax: TriggerSyntax::Literal,
        }
    }
}

impl ElizaScriptConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - ELIZA_SCRIPT: script file
    /// - ELIZA_PRE_SUBSTITUTIONS: pre-substitution file
    /// - ELIZA_POST_SUBSTITUTIONS: post-substitution file
    /// - ELIZA_RESPONSE_DELAY_MS: pause before each reply
    /// - ELIZA_SEED: RNG seed
    /// - ELIZA_TRIGGER_SYNTAX: `literal` or `pattern`
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or the trigger
    /// syntax is unknown.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ELIZA_SCRIPT") {
            config.script_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("ELIZA_PRE_SUBSTITUTIONS") {
            config.pre_substitutions_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("ELIZA_POST_SUBSTITUTIONS") {
            config.post_substitutions_path = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var("ELIZA_RESPONSE_DELAY_MS") {
            config.response_delay_ms = parse_number("ELIZA_RESPONSE_DELAY_MS", &raw)?;
        }
        if let Ok(raw) = std::env::var("ELIZA_SEED") {
            config.seed = Some(parse_number("ELIZA_SEED", &raw)?);
        }
        if let Ok(raw) = std::env::var("ELIZA_TRIGGER_SYNTAX") {
            config.trigger_syntax = raw.parse()?;
        }

        Ok(config)
    }

    /// Load configuration from a JSON file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ElizaScriptError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Get the script path, if set.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }

    /// Get the script path.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no script path was given.
    pub fn require_script_path(&self) -> Result<&Path> {
        self.script_path()
            .ok_or_else(|| ElizaScriptError::config("You must provide a script file"))
    }

    /// Get the pre-substitution file.
    pub fn pre_substitutions_path(&self) -> &Path {
        &self.pre_substitutions_path
    }

    /// Get the post-substitution file.
    pub fn post_substitutions_path(&self) -> &Path {
        &self.post_substitutions_path
    }

    /// Get the pause before each reply.
    pub fn response_delay(&self) -> Duration {
        Duration::from_millis(self.response_delay_ms)
    }

    /// Get the RNG seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Get the trigger syntax.
    pub fn trigger_syntax(&self) -> TriggerSyntax {
        self.trigger_syntax
    }

    /// Set the script path.
    pub fn with_script_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.script_path = Some(path.into());
        self
    }

    /// Set the pre-substitution file.
    pub fn with_pre_substitutions_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.pre_substitutions_path = path.into();
        self
    }

    /// Set the post-substitution file.
    pub fn with_post_substitutions_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.post_substitutions_path = path.into();
        self
    }

    /// Set the pause before each reply, in milliseconds.
    pub fn with_response_delay_ms(mut self, millis: u64) -> Self {
        self.response_delay_ms = millis;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the trigger syntax.
    pub fn with_trigger_syntax(mut self, syntax: TriggerSyntax) -> Self {
        self.trigger_syntax = syntax;
        self
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ElizaScriptError::config(format!("{name} must be a number, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ElizaScriptConfig::default();
        assert_eq!(config.script_path(), None);
        assert_eq!(
            config.pre_substitutions_path(),
            Path::new(DEFAULT_PRE_SUBSTITUTIONS)
        );
        assert_eq!(
            config.post_substitutions_path(),
            Path::new(DEFAULT_POST_SUBSTITUTIONS)
        );
        assert_eq!(config.response_delay(), Duration::from_secs(1));
        assert_eq!(config.trigger_syntax(), TriggerSyntax::Literal);
        assert!(config.require_script_path().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ElizaScriptConfig::new()
            .with_script_path("doctor.txt")
            .with_pre_substitutions_path("pre.txt")
            .with_response_delay_ms(0)
            .with_seed(42)
            .with_trigger_syntax(TriggerSyntax::Pattern);

        assert_eq!(config.require_script_path().unwrap(), Path::new("doctor.txt"));
        assert_eq!(config.pre_substitutions_path(), Path::new("pre.txt"));
        assert_eq!(config.response_delay(), Duration::ZERO);
        assert_eq!(config.seed(), Some(42));
        assert_eq!(config.trigger_syntax(), TriggerSyntax::Pattern);
    }

    #[test]
    fn test_config_from_json_keeps_defaults() {
        let config: ElizaScriptConfig =
            serde_json::from_str(r#"{"scriptPath": "doctor.txt", "triggerSyntax": "pattern"}"#)
                .unwrap();
        assert_eq!(config.script_path(), Some(Path::new("doctor.txt")));
        assert_eq!(config.trigger_syntax(), TriggerSyntax::Pattern);
        assert_eq!(config.response_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert!(parse_number::<u64>("ELIZA_SEED", "abc").is_err());
        assert_eq!(parse_number::<u64>("ELIZA_SEED", " 12 ").unwrap(), 12);
    }
}
