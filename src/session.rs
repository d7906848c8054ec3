//! Per-conversation turn handling.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::responder::{Responder, Response};

/// What a single turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// A keyword group matched.
    Reply(String),
    /// Nothing matched; a fallback line was chosen.
    Fallback(String),
    /// The input was a quit phrase; holds the farewell message.
    Farewell(String),
}

/// Kind of a [`Turn`], without its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    /// See [`Turn::Reply`].
    Matched,
    /// See [`Turn::Fallback`].
    Fallback,
    /// See [`Turn::Farewell`].
    Farewell,
}

impl Turn {
    /// The text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Reply(text) | Self::Fallback(text) | Self::Farewell(text) => text,
        }
    }

    /// The kind of turn.
    pub fn kind(&self) -> TurnKind {
        match self {
            Self::Reply(_) => TurnKind::Matched,
            Self::Fallback(_) => TurnKind::Fallback,
            Self::Farewell(_) => TurnKind::Farewell,
        }
    }

    /// Returns true if this turn ended the conversation.
    pub fn is_farewell(&self) -> bool {
        matches!(self, Self::Farewell(_))
    }

    /// Consumes the turn, returning its text.
    pub fn into_text(self) -> String {
        match self {
            Self::Reply(text) | Self::Fallback(text) | Self::Farewell(text) => text,
        }
    }
}

/// One conversation over a shared [`Responder`].
///
/// The session owns its random number generator; the responder is never
/// mutated, so sessions can run side by side over the same `Arc`.
#[derive(Debug)]
pub struct Session {
    responder: Arc<Responder>,
    rng: StdRng,
    turns: usize,
    ended: bool,
}

impl Session {
    /// Creates a session seeded from system entropy.
    pub fn new(responder: Arc<Responder>) -> Self {
        Self::with_rng(responder, StdRng::from_entropy())
    }

    /// Creates a session with a fixed seed, for reproducible conversations.
    pub fn with_seed(responder: Arc<Responder>, seed: u64) -> Self {
        Self::with_rng(responder, StdRng::seed_from_u64(seed))
    }

    /// Creates a session seeded from `seed` if given, else from entropy.
    pub fn with_optional_seed(responder: Arc<Responder>, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(responder, seed),
            None => Self::new(responder),
        }
    }

    fn with_rng(responder: Arc<Responder>, rng: StdRng) -> Self {
        Self {
            responder,
            rng,
            turns: 0,
            ended: false,
        }
    }

    /// The welcome message.
    pub fn greeting(&self) -> &str {
        self.responder.script().welcome()
    }

    /// The farewell message.
    pub fn farewell(&self) -> &str {
        self.responder.script().farewell()
    }

    /// Handles one line of user input.
    ///
    /// The line is lowercased and checked against the quit phrases as-is;
    /// pre-substitution only runs afterwards, for keyword matching.
    pub fn turn(&mut self, input: &str) -> Turn {
        self.turns += 1;
        let raw = input.to_lowercase();

        if self.responder.script().is_quit(&raw) {
            debug!(turn = self.turns, "quit phrase entered");
            self.ended = true;
            return Turn::Farewell(self.farewell().to_string());
        }

        let utterance = self.responder.pre_substitute(&raw);
        match self.responder.respond(&utterance, &mut self.rng) {
            Response::Matched(text) => Turn::Reply(text),
            Response::NoMatch => {
                debug!(turn = self.turns, "falling back");
                Turn::Fallback(self.responder.fallback(&mut self.rng).to_string())
            }
        }
    }

    /// Number of turns taken so far.
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Returns true once a quit phrase has been entered.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// The shared responder.
    pub fn responder(&self) -> &Arc<Responder> {
        &self.responder
    }
}
