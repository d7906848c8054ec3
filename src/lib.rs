//! # ELIZA Script Responder
//!
//! A script-driven take on Joseph Weizenbaum's ELIZA. The conversation rules
//! live in a plain text script of keyword groups rather than in code, and two
//! word-substitution tables rewrite the user's words: one before keyword
//! matching, one on the fragment echoed back.
//!
//! ## Pipeline
//!
//! raw line → quit check → pre-substitution → first matching keyword group →
//! context after the keyword → post-substitution → template fill.
//! If no group matches, a random fallback line is used instead.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use elizaos_eliza_script::{Responder, Script, Session, SubstitutionTable, Turn};
//!
//! let script = Script::parse(
//!     "inline",
//!     "Hello.\n>>\nGoodbye.\n>>\nsad\nWhy are you sad *?\n>>\nbye\n>>\nGo on.\n>>\n",
//! )
//! .unwrap();
//! let post: SubstitutionTable = [("my", "your")].into_iter().collect();
//! let responder = Responder::new(script, SubstitutionTable::new(), post).unwrap();
//!
//! let mut session = Session::with_seed(Arc::new(responder), 1);
//! assert_eq!(
//!     session.turn("I am sad about my cat"),
//!     Turn::Reply("Why are you sad about your cat?".to_string())
//! );
//! assert!(session.turn("bye").is_farewell());
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod error;
pub mod interop;
pub mod logging;
pub mod matcher;
pub mod random;
pub mod responder;
pub mod script;
pub mod session;
pub mod substitution;

pub use config::ElizaScriptConfig;
pub use error::{ElizaScriptError, Result};
pub use matcher::{RegexMatcher, TokenMatcher, TriggerSyntax, WordMatcher};
pub use random::pick;
pub use responder::{fill_template, Responder, Response};
pub use script::{ResponseGroup, Script};
pub use session::{Session, Turn, TurnKind};
pub use substitution::{substitute, SubstitutionTable};
