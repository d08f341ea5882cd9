//! Start-term lookup and sentence isolation.
//!
//! This is the cheap front of the pipeline. Before any template is compiled
//! for a message we need to know which disease term it talks about, and
//! which sentence-like segment mentions it.
//!
//! ## Start-term lookup
//!
//! ```text
//! message words ──▶ StartTermIndex buckets ──▶ candidate terms
//!                                               │ verify: term occurs in message
//!                                               ▼ (case-insensitive, word-bounded)
//!                                         longest term wins
//! ```
//!
//! Only buckets of words present in the message are consulted, so the cost is
//! proportional to the message, not to the lexicon.
//!
//! ## Sentence isolation
//!
//! The message is cut at, in this order of precedence at a given position:
//! `...`, `…`, `?`, `!`, `—`, `,`, `;`, `:`, `http` (a link starts a new
//! segment) and `. X` (a period followed by a capitalized word). The first
//! segment containing the term is used by the counter and general stages.

use crate::rules::start_terms::{self, StartTermIndex};
use crate::Range;
use regex::RegexBuilder;
use serde::Serialize;
use std::collections::HashSet;
use tracing::trace;

/// A disease term located in a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StartTermMatch {
    /// The term as written in the message.
    pub term: String,
    /// The lexicon entry (lowercased) that matched.
    pub lexicon_term: String,
    /// Byte span of `term` in the message.
    pub range: Range,
}

fn is_boundary(c: Option<char>) -> bool {
    c.is_none_or(|c| !c.is_alphanumeric())
}

/// First word-bounded, case-insensitive occurrence of `term` in `message`.
///
/// `ascii_lower` is `message` with ASCII letters lowercased; it has the same
/// byte offsets, so ASCII terms are searched there directly.
fn locate(message: &str, ascii_lower: &str, term: &str) -> Option<Range> {
    let bounded = |start: usize, end: usize| {
        is_boundary(message[..start].chars().next_back()) && is_boundary(message[end..].chars().next())
    };

    if term.is_ascii() {
        return ascii_lower
            .match_indices(term)
            .map(|(start, m)| (start, start + m.len()))
            .find(|&(start, end)| bounded(start, end))
            .map(|(start, end)| Range::new(start, end));
    }

    let regex = RegexBuilder::new(&regex::escape(term)).case_insensitive(true).build().ok()?;
    regex.find_iter(message).find(|m| bounded(m.start(), m.end())).map(|m| Range::new(m.start(), m.end()))
}

/// Find the longest lexicon term occurring in `message`.
///
/// Among equally long terms the first one found wins; the order follows the
/// message words and then the lexicon order.
pub fn find_start_term(message: &str, index: &StartTermIndex) -> Option<StartTermMatch> {
    let ascii_lower = message.to_ascii_lowercase();
    let mut seen_words: HashSet<String> = HashSet::new();
    let mut checked: HashSet<&str> = HashSet::new();
    let mut best: Option<(usize, &str, Range)> = None;

    for raw in start_terms::words(message) {
        let word = raw.to_lowercase();
        if !seen_words.insert(word.clone()) {
            continue;
        }
        for term in index.candidates(&word) {
            if !checked.insert(term) {
                continue;
            }
            let Some(range) = locate(message, &ascii_lower, term) else {
                continue;
            };
            let len = term.chars().count();
            if best.is_none_or(|(best_len, _, _)| len > best_len) {
                best = Some((len, term, range));
            }
        }
    }

    let (_, lexicon_term, range) = best?;
    let found = StartTermMatch {
        term: message[range.start..range.end].to_string(),
        lexicon_term: lexicon_term.to_string(),
        range,
    };
    trace!(term = %found.term, start = range.start, end = range.end, "start term found");
    Some(found)
}

/// Sentence-like segments of `message`, as trimmed byte spans.
pub(crate) fn segments(message: &str) -> Vec<Range> {
    let boundaries = regex!(r"\.\.\.|…|[?!—,;:]|http\S*|\.\s+\p{Lu}");
    let mut out = Vec::new();
    let mut start = 0;

    for m in boundaries.find_iter(message) {
        let text = m.as_str();
        let next = if text.starts_with("http") {
            // The link opens the next segment and is never cut itself.
            m.start()
        } else if text.starts_with('.') && text.len() > 1 && !text.starts_with("...") {
            // `. X`: the capital letter opens the next segment.
            m.end() - text.chars().next_back().map_or(0, char::len_utf8)
        } else {
            m.end()
        };
        push_trimmed(message, start, m.start(), &mut out);
        start = next;
    }
    push_trimmed(message, start, message.len(), &mut out);
    out
}

fn push_trimmed(message: &str, start: usize, end: usize, out: &mut Vec<Range>) {
    if start >= end {
        return;
    }
    let slice = &message[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trail = slice.len() - slice.trim_end().len();
    if lead + trail < slice.len() {
        out.push(Range::new(start + lead, end - trail));
    }
}

/// The first segment containing the start term, or the whole message when
/// the term straddles a boundary.
pub fn isolate_sentence(message: &str, start_term: &StartTermMatch) -> Range {
    let sentence = segments(message)
        .into_iter()
        .find(|segment| segment.contains(&start_term.range))
        .unwrap_or(Range::new(0, message.len()));
    trace!(start = sentence.start, end = sentence.end, "sentence isolated");
    sentence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(message: &'a str, ranges: &[Range]) -> Vec<&'a str> {
        ranges.iter().map(|r| &message[r.start..r.end]).collect()
    }

    #[test]
    fn start_term_examples_matching() {
        let index = StartTermIndex::build(["anorexia", "anorexia nervosa", "asthma", "type 2 diabetes", "flu", "copd"]);

        // (message, expected term as written)
        let cases: Vec<(&str, Option<&str>)> = vec![
            ("Mindfulness for anorexia nervosa", Some("anorexia nervosa")),
            ("Mindfulness for Anorexia Nervosa!", Some("Anorexia Nervosa")),
            ("anorexia is hard", Some("anorexia")),
            ("Yoga helps #asthma", Some("asthma")),
            ("Beating Type 2 Diabetes with diet", Some("Type 2 Diabetes")),
            ("Influence of weather", None),
            ("The influence of flu", Some("flu")),
            ("Nothing medical here", None),
            ("Yoga for asthma/COPD", Some("asthma")),
            ("Yoga for asthma&copd", Some("asthma")),
            ("Living with COPD/emphysema", Some("COPD")),
        ];

        for (message, expected) in cases {
            let got = find_start_term(message, &index);
            assert_eq!(got.as_ref().map(|m| m.term.as_str()), expected, "message: {message}");
            if let Some(found) = got {
                assert_eq!(&message[found.range.start..found.range.end], found.term);
            }
        }
    }

    #[test]
    fn lexicon_term_is_reported_lowercased() {
        let index = StartTermIndex::build(["Anorexia Nervosa"]);
        let found = find_start_term("ANOREXIA NERVOSA awareness", &index).unwrap();
        assert_eq!(found.lexicon_term, "anorexia nervosa");
        assert_eq!(found.range, Range::new(0, 16));
    }

    #[test]
    fn non_ascii_terms_are_found_case_insensitively() {
        let index = StartTermIndex::build(["síndrome de down"]);
        let found = find_start_term("Apoyo al Síndrome de Down", &index).unwrap();
        assert_eq!(found.term, "Síndrome de Down");
    }

    #[test]
    fn segments_split_on_boundary_markers() {
        let message = "Great news... yoga works, for asthma; see http://x.co/a Really. Try it now? Yes";
        assert_eq!(texts(message, &segments(message)), vec![
            "Great news",
            "yoga works",
            "for asthma",
            "see",
            "http://x.co/a Really",
            "Try it now",
            "Yes"
        ]);
    }

    #[test]
    fn decimal_points_and_lowercase_continuations_do_not_split() {
        let message = "Take 2.5 mg daily. it helps with flu";
        assert_eq!(texts(message, &segments(message)), vec!["Take 2.5 mg daily. it helps with flu"]);
    }

    #[test]
    fn isolates_the_segment_with_the_term() {
        let index = StartTermIndex::build(["obesity"]);
        let message = "Big news! This medicine protects you against obesity. Read more";
        let found = find_start_term(message, &index).unwrap();
        let sentence = isolate_sentence(message, &found);
        assert_eq!(&message[sentence.start..sentence.end], "This medicine protects you against obesity");
    }
}
