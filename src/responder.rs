//! Keyword matching and response selection.
//!
//! Given an utterance that has already been through pre-substitution, the
//! responder walks the keyword groups in script order and stops at the first
//! group whose trigger occurs as a whole word. The text after that trigger
//! becomes the context: it is post-substituted and written into every `*` of a
//! randomly chosen template. Earlier groups always win, whatever the trigger
//! length.

use std::fmt;

use rand::Rng;
use tracing::debug;

use crate::config::ElizaScriptConfig;
use crate::error::Result;
use crate::matcher::{RegexMatcher, TriggerSyntax, WordMatcher};
use crate::random::pick;
use crate::script::{Script, WILDCARD};
use crate::substitution::SubstitutionTable;

/// Outcome of matching one utterance against the keyword groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A keyword group matched; holds the filled template, which may be empty.
    Matched(String),
    /// No keyword group matched.
    NoMatch,
}

impl Response {
    /// Returns true for [`Response::Matched`].
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// Immutable engine: a script, its two substitution tables and a matcher.
///
/// The responder holds no per-conversation state. Randomness is supplied by
/// the caller, so one instance can be shared by any number of sessions.
pub struct Responder {
    script: Script,
    pre_substitutions: SubstitutionTable,
    post_substitutions: SubstitutionTable,
    matcher: Box<dyn WordMatcher>,
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("script", &self.script)
            .field("pre_substitutions", &self.pre_substitutions.len())
            .field("post_substitutions", &self.post_substitutions.len())
            .finish_non_exhaustive()
    }
}

impl Responder {
    /// Creates a responder that treats triggers as literal text.
    ///
    /// # Errors
    ///
    /// Never fails for literal triggers; the signature matches
    /// [`Responder::with_syntax`].
    pub fn new(
        script: Script,
        pre_substitutions: SubstitutionTable,
        post_substitutions: SubstitutionTable,
    ) -> Result<Self> {
        Self::with_syntax(
            script,
            pre_substitutions,
            post_substitutions,
            TriggerSyntax::Literal,
        )
    }

    /// Creates a responder with every trigger precompiled under `syntax`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ElizaScriptError::InvalidTrigger`] if a trigger is not
    /// a valid pattern.
    pub fn with_syntax(
        script: Script,
        pre_substitutions: SubstitutionTable,
        post_substitutions: SubstitutionTable,
        syntax: TriggerSyntax,
    ) -> Result<Self> {
        let matcher = RegexMatcher::for_triggers(
            syntax,
            script.keyword_groups().iter().map(|g| g.trigger()),
        )?;
        Ok(Self::with_matcher(
            script,
            pre_substitutions,
            post_substitutions,
            matcher,
        ))
    }

    /// Creates a responder with a custom matcher.
    pub fn with_matcher<M: WordMatcher + 'static>(
        script: Script,
        pre_substitutions: SubstitutionTable,
        post_substitutions: SubstitutionTable,
        matcher: M,
    ) -> Self {
        Self {
            script,
            pre_substitutions,
            post_substitutions,
            matcher: Box::new(matcher),
        }
    }

    /// Loads the script and both substitution tables named by `config`.
    ///
    /// # Errors
    ///
    /// Fails fast on the first missing file, malformed line or invalid
    /// trigger; nothing is returned half-loaded.
    pub fn from_config(config: &ElizaScriptConfig) -> Result<Self> {
        let script = Script::load(config.require_script_path()?)?;
        let pre = SubstitutionTable::load(config.pre_substitutions_path())?;
        let post = SubstitutionTable::load(config.post_substitutions_path())?;
        Self::with_syntax(script, pre, post, config.trigger_syntax())
    }

    /// The script.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Table applied to raw input before matching.
    pub fn pre_substitutions(&self) -> &SubstitutionTable {
        &self.pre_substitutions
    }

    /// Table applied to the captured context.
    pub fn post_substitutions(&self) -> &SubstitutionTable {
        &self.post_substitutions
    }

    /// Applies pre-substitution to a raw line.
    pub fn pre_substitute(&self, raw: &str) -> String {
        self.pre_substitutions.substitute(raw)
    }

    /// Matches an already pre-substituted utterance against the keyword groups.
    pub fn respond<R: Rng + ?Sized>(&self, utterance: &str, rng: &mut R) -> Response {
        for (index, group) in self.script.keyword_groups().iter().enumerate() {
            let trigger = group.trigger();
            let Some(span) = self.matcher.find_whole_word(utterance, trigger) else {
                continue;
            };

            // Line 0 is the trigger, so templates occupy 1..len.
            let template = &group.lines()[pick(rng, 1, group.len())];
            let context = self.post_substitutions.substitute(context_after(utterance, span.end));
            debug!(group = index + 2, trigger, "keyword matched");
            return Response::Matched(fill_template(template, &context));
        }
        debug!("no keyword matched");
        Response::NoMatch
    }

    /// Picks a fallback line uniformly at random.
    pub fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        let fallbacks = self.script.fallbacks().lines();
        fallbacks[pick(rng, 0, fallbacks.len())].as_str()
    }
}

/// Text after the matched trigger, or the whole utterance if nothing follows it.
///
/// Splits at the end of the whole-word match rather than at the first raw
/// substring hit, so `sad` inside `sadly` never starts the context.
fn context_after(utterance: &str, trigger_end: usize) -> &str {
    let tail = utterance.get(trigger_end..).unwrap_or_default().trim();
    if tail.is_empty() {
        utterance
    } else {
        tail
    }
}

/// Replaces every wildcard marker in `template` with `context`.
pub fn fill_template(template: &str, context: &str) -> String {
    template.replace(WILDCARD, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::TokenMatcher;
    use crate::script::ResponseGroup;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn script(keyword_groups: Vec<ResponseGroup>) -> Script {
        let mut groups = vec![
            ResponseGroup::new(["Hello."]),
            ResponseGroup::new(["Goodbye."]),
        ];
        groups.extend(keyword_groups);
        groups.push(ResponseGroup::new(["bye"]));
        groups.push(ResponseGroup::new(["Please go on.", "Tell me more."]));
        Script::from_groups("test", groups).unwrap()
    }

    fn post() -> SubstitutionTable {
        [("my", "your"), ("i", "you"), ("am", "are")]
            .into_iter()
            .collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1966)
    }

    #[test]
    fn test_context_is_text_after_trigger() {
        let responder = Responder::new(
            script(vec![ResponseGroup::new(["sad", "Why are you sad *?"])]),
            SubstitutionTable::new(),
            post(),
        )
        .unwrap();
        let got = responder.respond("i am sad about my job", &mut rng());
        assert_eq!(got, Response::Matched("Why are you sad about your job?".into()));
    }

    #[test]
    fn test_context_skips_trigger_inside_longer_word() {
        let responder = Responder::new(
            script(vec![ResponseGroup::new(["sad", "why sad *"])]),
            SubstitutionTable::new(),
            SubstitutionTable::new(),
        )
        .unwrap();
        let got = responder.respond("sadly i am sad today", &mut rng());
        assert_eq!(got, Response::Matched("why sad today".into()));
    }

    #[test]
    fn test_trigger_at_end_uses_whole_utterance() {
        let responder = Responder::new(
            script(vec![ResponseGroup::new(["sad", "You said: *"])]),
            SubstitutionTable::new(),
            post(),
        )
        .unwrap();
        let got = responder.respond("i am sad", &mut rng());
        assert_eq!(got, Response::Matched("You said: you are sad".into()));
    }

    #[test]
    fn test_first_group_in_script_order_wins() {
        let responder = Responder::new(
            script(vec![
                ResponseGroup::new(["mother", "Tell me about your family."]),
                ResponseGroup::new(["my mother", "Your mother?"]),
            ]),
            SubstitutionTable::new(),
            post(),
        )
        .unwrap();
        let got = responder.respond("my mother hates me", &mut rng());
        assert_eq!(got, Response::Matched("Tell me about your family.".into()));
    }

    #[test]
    fn test_no_match() {
        let responder = Responder::new(
            script(vec![ResponseGroup::new(["sad", "Why?"])]),
            SubstitutionTable::new(),
            post(),
        )
        .unwrap();
        assert_eq!(responder.respond("sadly the weather", &mut rng()), Response::NoMatch);
        assert_eq!(responder.respond("", &mut rng()), Response::NoMatch);
    }

    #[test]
    fn test_single_template_group() {
        let responder = Responder::new(
            script(vec![ResponseGroup::new(["computer", "Do computers worry you?"])]),
            SubstitutionTable::new(),
            post(),
        )
        .unwrap();
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(
                responder.respond("computer", &mut rng),
                Response::Matched("Do computers worry you?".into())
            );
        }
    }

    #[test]
    fn test_template_chosen_from_group() {
        let templates = ["A *", "B *", "C *"];
        let mut lines = vec!["dream"];
        lines.extend(templates);
        let responder = Responder::new(
            script(vec![ResponseGroup::new(lines)]),
            SubstitutionTable::new(),
            SubstitutionTable::new(),
        )
        .unwrap();
        let mut rng = rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            match responder.respond("i had a dream about cats", &mut rng) {
                Response::Matched(text) => {
                    seen.insert(text);
                }
                Response::NoMatch => panic!("expected a match"),
            }
        }
        let expected: std::collections::HashSet<String> =
            ["A about cats", "B about cats", "C about cats"]
                .into_iter()
                .map(String::from)
                .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_every_wildcard_is_filled() {
        assert_eq!(fill_template("* and * again", "this"), "this and this again");
        assert_eq!(fill_template("no marker", "ignored"), "no marker");
    }

    #[test]
    fn test_empty_rendering_is_still_a_match() {
        let responder = Responder::new(
            script(vec![ResponseGroup::new(["hush", "*"])]),
            SubstitutionTable::new(),
            // Every context word maps to nothing visible.
            [("quiet", "")].into_iter().collect(),
        )
        .unwrap();
        let got = responder.respond("hush quiet", &mut rng());
        assert_eq!(got, Response::Matched(String::new()));
        assert!(got.is_match());
    }

    #[test]
    fn test_literal_metacharacters_in_trigger() {
        let responder = Responder::new(
            script(vec![ResponseGroup::new(["why?", "Why do you ask *?"])]),
            SubstitutionTable::new(),
            SubstitutionTable::new(),
        )
        .unwrap();
        assert!(responder.respond("but why? really", &mut rng()).is_match());
        assert_eq!(responder.respond("but wh really", &mut rng()), Response::NoMatch);
    }

    #[test]
    fn test_pattern_syntax_trigger() {
        let responder = Responder::with_syntax(
            script(vec![ResponseGroup::new(["mom|mother", "Your family: *"])]),
            SubstitutionTable::new(),
            post(),
            TriggerSyntax::Pattern,
        )
        .unwrap();
        assert_eq!(
            responder.respond("my mom is kind", &mut rng()),
            Response::Matched("Your family: is kind".into())
        );
    }

    #[test]
    fn test_custom_matcher() {
        let responder = Responder::with_matcher(
            script(vec![ResponseGroup::new(["sad", "Sad *"])]),
            SubstitutionTable::new(),
            SubstitutionTable::new(),
            TokenMatcher,
        );
        assert!(responder.respond("so sad today", &mut rng()).is_match());
        assert_eq!(responder.respond("so sad.", &mut rng()), Response::NoMatch);
    }

    #[test]
    fn test_fallback_is_a_fallback_line() {
        let responder = Responder::new(
            script(vec![]),
            SubstitutionTable::new(),
            SubstitutionTable::new(),
        )
        .unwrap();
        let mut rng = rng();
        for _ in 0..50 {
            let line = responder.fallback(&mut rng);
            assert!(responder.script().fallbacks().contains(line));
        }
    }

    #[test]
    fn test_responder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Responder>();
    }
}
