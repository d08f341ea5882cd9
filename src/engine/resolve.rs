//! Noun-phrase resolution.
//!
//! Once a template has won, its answer is a noun phrase picked from the
//! chunker output by position:
//!
//! ```text
//! solution-first / left slot:   ... [np] [np] |match| ...     closest phrase before, scanning backwards
//! problem-first / right slot:   ... |match| [np] [np] ...     first phrase after, scanning forwards
//! ```
//!
//! Stopword phrases are skipped during the scan. The self-reference check
//! runs on the chosen phrase afterwards and rejects it outright.

use crate::chunker::NounPhrase;
use crate::rules::stopwords::Stopwords;
use crate::Range;
use tracing::trace;

/// Determiners and possessives that make a two-word inline phrase too generic
/// ("new treatment", "our treatment").
const GENERIC_LEADS: &[&str] = &["the", "new", "its", "our", "her", "his", "my", "your", "which", "and"];

fn span(np: &NounPhrase) -> Range {
    Range::new(np.start, np.end)
}

/// Closest phrase ending at or before `limit`, skipping stopwords.
pub(crate) fn closest_before<'a>(phrases: &'a [NounPhrase], limit: usize, stopwords: &Stopwords) -> Option<&'a NounPhrase> {
    phrases.iter().rev().filter(|np| np.end <= limit).find(|np| admissible(np, stopwords))
}

/// First phrase starting at or after `limit`, skipping stopwords.
pub(crate) fn first_after<'a>(phrases: &'a [NounPhrase], limit: usize, stopwords: &Stopwords) -> Option<&'a NounPhrase> {
    phrases.iter().filter(|np| np.start >= limit).find(|np| admissible(np, stopwords))
}

/// Last phrase wholly inside `window`, skipping stopwords.
pub(crate) fn last_within<'a>(phrases: &'a [NounPhrase], window: Range, stopwords: &Stopwords) -> Option<&'a NounPhrase> {
    phrases.iter().rev().filter(|np| window.contains(&span(np))).find(|np| admissible(np, stopwords))
}

/// First phrase wholly inside `window`, skipping stopwords.
pub(crate) fn first_within<'a>(phrases: &'a [NounPhrase], window: Range, stopwords: &Stopwords) -> Option<&'a NounPhrase> {
    phrases.iter().filter(|np| window.contains(&span(np))).find(|np| admissible(np, stopwords))
}

fn admissible(np: &NounPhrase, stopwords: &Stopwords) -> bool {
    let rejected = stopwords.disqualifies(&np.text);
    if rejected {
        trace!(phrase = %np.text, "phrase rejected by stopword");
    }
    !rejected
}

/// True when `needle` occurs in `haystack` as whole words.
fn contains_words(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, m)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + m.len()..].chars().next();
        before.is_none_or(|c| !c.is_alphanumeric()) && after.is_none_or(|c| !c.is_alphanumeric())
    })
}

/// True when `candidate` is just the disease term again: equal to it, part of
/// it, or containing it. Containment is word-bounded, so "Rest" is not part of
/// "cardiac arrest".
pub(crate) fn is_self_reference(candidate: &str, term: &str) -> bool {
    let candidate = candidate.trim().to_lowercase();
    let term = term.trim().to_lowercase();
    !candidate.is_empty() && !term.is_empty() && (contains_words(&term, &candidate) || contains_words(&candidate, &term))
}

/// First phrase that names `literal` as its head: it ends with the literal
/// and has at least one word before it.
///
/// Rejected: phrases whose leading words are the disease term itself
/// ("frontal fibrosing alopecia treatment"), and two-word phrases led by a
/// generic word ("new treatment").
pub(crate) fn inline_head<'a>(phrases: &'a [NounPhrase], literal: &str, term: &str) -> Option<&'a NounPhrase> {
    let literal = literal.trim().to_lowercase();
    let term = term.trim().to_lowercase();

    phrases.iter().find(|np| {
        let lower = np.text.trim().to_lowercase();
        let Some(prefix) = lower.strip_suffix(literal.as_str()) else {
            return false;
        };
        // The literal must be a whole trailing word.
        if !prefix.ends_with(char::is_whitespace) {
            return false;
        }
        let prefix = prefix.trim();
        if prefix.is_empty() || prefix == term {
            return false;
        }
        let words: Vec<&str> = lower.split_whitespace().collect();
        !(words.len() == 2 && GENERIC_LEADS.contains(&words[0]))
    })
}
