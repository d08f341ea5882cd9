//! Magic-bullet stage.
//!
//! Magic-bullet templates are high-precision frames whose context alone names
//! the answer ("[np-left]protects against", "[np=surgery]"). They are tried on
//! the whole message before the general grammar.
//!
//! ## Padding
//!
//! Floating slots need four tokens of context, and chunkers delimit phrases at
//! the edges of a text poorly. The message is therefore wrapped in filler:
//!
//! ```text
//! "Pretty tinny long short yellow dummy. " + message + ". " + "Pretty tinny long short yellow dummy"
//!                                           └── body ──┘
//! ```
//!
//! Templates and the chunker both run on the padded text, so all offsets in
//! this module are padded offsets. A template's anchor text must lie inside
//! the body, and phrases are clipped to the body before use; filler never
//! reaches the output.
//!
//! ## Selection
//!
//! The template with the longest raw match wins (first declared on a tie). For
//! inline templates the raw match is the qualifying phrase itself, so an inline
//! template without a qualifying phrase does not match at all.

use super::compiled_rules::{Grammar, TemplateHit};
use super::resolve;
use crate::chunker::{Chunker, NounPhrase};
use crate::rules::stopwords::Stopwords;
use crate::rules::template::NpSlot;
use crate::{Analysis, Range};
use tracing::trace;

const FILLER: &str = "Pretty tinny long short yellow dummy";

/// A message wrapped in filler context.
#[derive(Debug, Clone)]
pub(crate) struct PaddedMessage {
    text: String,
    body: Range,
}

impl PaddedMessage {
    pub(crate) fn new(message: &str) -> Self {
        let mut text = format!("{FILLER}. ");
        let start = text.len();
        text.push_str(message);
        let end = text.len();
        text.push_str(if message.ends_with('.') { " " } else { ". " });
        text.push_str(FILLER);
        PaddedMessage { text, body: Range::new(start, end) }
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn body(&self) -> Range {
        self.body
    }

    /// Chunk the padded text and keep the body part of every phrase.
    pub(crate) fn phrases(&self, chunker: &dyn Chunker) -> Vec<NounPhrase> {
        chunker.chunk(&self.text).into_iter().filter_map(|np| self.clip(&np)).collect()
    }

    fn clip(&self, np: &NounPhrase) -> Option<NounPhrase> {
        let start = np.start.max(self.body.start);
        let end = np.end.min(self.body.end);
        if start >= end {
            return None;
        }
        let slice = self.text.get(start..end)?;
        let lead = slice.len() - slice.trim_start().len();
        let trimmed = slice.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(NounPhrase::new(trimmed, start + lead, start + lead + trimmed.len()))
    }
}

/// The part of a hit that is template text rather than slot context.
fn anchor(hit: &TemplateHit, slot: Option<&NpSlot>) -> Range {
    match (slot, hit.window) {
        (Some(NpSlot::Left), Some(window)) => Range::new(window.end, hit.range.end),
        (Some(NpSlot::Right), Some(window)) => Range::new(hit.range.start, window.start),
        _ => hit.range,
    }
}

/// Extract a solution for `term` from `message` with the magic-bullet grammar.
///
/// Returns `Found`, `Unresolved` (a template won but no phrase qualified) or
/// `NoPatternFound`.
pub fn match_magic_bullet(
    message: &str,
    term: &str,
    grammar: &Grammar,
    stopwords: &Stopwords,
    chunker: &dyn Chunker,
) -> Analysis {
    let no_pattern = || Analysis::NoPatternFound { problem: term.to_string() };
    if grammar.is_empty() {
        return no_pattern();
    }

    let padded = PaddedMessage::new(message);
    let mut phrases: Option<Vec<NounPhrase>> = None;

    // (length, hit, qualifying inline phrase)
    let mut best: Option<(usize, TemplateHit, Option<NounPhrase>)> = None;
    for (index, template) in grammar.iter().enumerate() {
        let Some(hit) = grammar.match_one(index, padded.text(), term) else {
            continue;
        };
        let slot = template.template().np_slot();
        if !padded.body().contains(&anchor(&hit, slot)) {
            continue;
        }

        let (len, inline) = match slot {
            Some(NpSlot::Inline(literal)) => {
                let phrases = phrases.get_or_insert_with(|| padded.phrases(chunker));
                match resolve::inline_head(phrases, literal, term) {
                    Some(np) => (np.text.chars().count(), Some(np.clone())),
                    None => continue,
                }
            }
            _ => (hit.len, None),
        };

        if best.as_ref().is_none_or(|(best_len, _, _)| len > *best_len) {
            best = Some((len, hit, inline));
        }
    }

    let Some((_, hit, inline)) = best else {
        return no_pattern();
    };
    let rule = grammar.rule(hit.index);
    trace!(template = %rule.template, len = hit.len, "magic-bullet template selected");

    let slot = grammar.get(hit.index).and_then(|t| t.template().np_slot());
    let candidate = match (slot, hit.window) {
        (Some(NpSlot::Inline(_)), _) => inline,
        (Some(NpSlot::Left), Some(window)) => {
            let phrases = phrases.get_or_insert_with(|| padded.phrases(chunker));
            resolve::last_within(phrases, window, stopwords).cloned()
        }
        (Some(NpSlot::Right), Some(window)) => {
            let phrases = phrases.get_or_insert_with(|| padded.phrases(chunker));
            resolve::first_within(phrases, window, stopwords).cloned()
        }
        _ => None,
    };

    match candidate {
        Some(np) if !resolve::is_self_reference(&np.text, term) => {
            Analysis::Found { solution: np.text, problem: term.to_string(), rule }
        }
        Some(np) => {
            trace!(phrase = %np.text, term, "magic-bullet candidate rejected as self-reference");
            Analysis::Unresolved { problem: term.to_string(), rule }
        }
        None => Analysis::Unresolved { problem: term.to_string(), rule },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::HeuristicChunker;
    use crate::config::StopwordMode;
    use crate::GrammarKind;

    fn grammar(lines: &str) -> Grammar {
        Grammar::parse_partitioned("grammar.txt", lines).unwrap().1
    }

    fn stop() -> Stopwords {
        Stopwords::parse("stop_words.txt", "dummy\n^you$", StopwordMode::Regex).unwrap()
    }

    fn run(message: &str, term: &str, lines: &str) -> Analysis {
        match_magic_bullet(message, term, &grammar(lines), &stop(), &HeuristicChunker::new())
    }

    const GRAMMAR: &str = "[np = surgery]\n[npl]protect\\w*( \\w+){0,5} against\nanalgesic \\w+ of[npr]";

    #[test]
    fn padding_wraps_the_body() {
        let padded = PaddedMessage::new("Surgery works.");
        assert_eq!(padded.text(), "Pretty tinny long short yellow dummy. Surgery works. Pretty tinny long short yellow dummy");
        let body = padded.body();
        assert_eq!(&padded.text()[body.start..body.end], "Surgery works.");

        let padded = PaddedMessage::new("obesity");
        assert!(padded.text().ends_with("obesity. Pretty tinny long short yellow dummy"));
    }

    #[test]
    fn clipped_phrases_never_contain_filler() {
        let padded = PaddedMessage::new("dummy obesity");
        let phrases = padded.phrases(&HeuristicChunker::new());
        assert!(phrases.iter().all(|np| padded.body().contains(&Range::new(np.start, np.end))));
        assert!(phrases.iter().all(|np| !np.text.contains("Pretty")));
    }

    #[test]
    fn magic_bullet_examples_matching() {
        // (message, term, expected solution, expected template)
        let cases: Vec<(&str, &str, &str, &str)> = vec![
            ("This medicine protects you against obesity", "obesity", "This medicine", "[npl]protect\\w*( \\w+){0,5} against"),
            ("Big surgery in obesity", "obesity", "Big surgery", "[np = surgery]"),
            ("Obesity and the analgesic power of this new medicine", "obesity", "this new medicine", "analgesic \\w+ of[npr]"),
            ("This medicine\nprotects you against obesity", "obesity", "This medicine", "[npl]protect\\w*( \\w+){0,5} against"),
        ];

        for (message, term, solution, template) in cases {
            match run(message, term, GRAMMAR) {
                Analysis::Found { solution: got, problem, rule } => {
                    assert_eq!(got, solution, "message: {message}");
                    assert_eq!(problem, term);
                    assert_eq!(rule.template, template);
                    assert_eq!(rule.grammar, GrammarKind::MagicBullet);
                }
                other => panic!("message: {message}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn no_template_is_no_pattern_found() {
        let got = run("Yoga for obesity", "obesity", GRAMMAR);
        assert_eq!(got, Analysis::NoPatternFound { problem: "obesity".into() });
    }

    #[test]
    fn matched_template_without_phrase_is_unresolved() {
        // The only phrase in the window is a stopword.
        let got = run("you protect against obesity", "obesity", "[npl]protect against");
        assert!(matches!(got, Analysis::Unresolved { ref rule, .. } if rule.template == "[npl]protect against"), "{got:?}");
    }

    #[test]
    fn generic_inline_phrase_does_not_match() {
        let got = run("New surgery for obesity", "obesity", "[np = surgery]");
        assert_eq!(got, Analysis::NoPatternFound { problem: "obesity".into() });
    }

    #[test]
    fn templates_cannot_anchor_in_the_filler() {
        let got = run("obesity is hard", "obesity", "[npl]yellow dummy");
        assert_eq!(got, Analysis::NoPatternFound { problem: "obesity".into() });
    }

    #[test]
    fn longest_raw_match_wins() {
        let lines = "[npl]protects\n[npl]protects you against";
        match run("This medicine protects you against obesity", "obesity", lines) {
            Analysis::Found { rule, solution, .. } => {
                assert_eq!(rule.index, 1);
                assert_eq!(solution, "This medicine");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
