//! General problem/solution grammar stage.
//!
//! ```text
//! "[solution] for [problem]"  on  "This is a new medicine for hyperthyroidism"
//!                                              |for hyperthyroidism|   longest match
//!  [This] is [a new medicine]                                          phrases ending before it
//!            ^^^^^^^^^^^^^^^^ closest one wins
//! ```
//!
//! The sentence is chunked whole, not just the region on the solution side, so
//! phrase boundaries come out the same as for the full sentence.

use super::compiled_rules::Grammar;
use super::resolve;
use crate::chunker::Chunker;
use crate::rules::stopwords::Stopwords;
use crate::Analysis;
use tracing::trace;

/// Extract a solution for `term` from `sentence` with the general grammar.
pub fn match_general(
    sentence: &str,
    term: &str,
    grammar: &Grammar,
    stopwords: &Stopwords,
    chunker: &dyn Chunker,
) -> Analysis {
    let Some(hit) = grammar.longest_match(sentence, term) else {
        return Analysis::NoPatternFound { problem: term.to_string() };
    };
    let rule = grammar.rule(hit.index);
    let solution_first = grammar.get(hit.index).is_some_and(|t| t.template().solution_first());

    let phrases = chunker.chunk(sentence);
    let candidate = if solution_first {
        resolve::closest_before(&phrases, hit.range.start, stopwords)
    } else {
        resolve::first_after(&phrases, hit.range.end, stopwords)
    };

    match candidate {
        Some(np) if !resolve::is_self_reference(&np.text, term) => {
            trace!(template = %rule.template, solution = %np.text, "general grammar resolved");
            Analysis::Found { solution: np.text.clone(), problem: term.to_string(), rule }
        }
        Some(np) => {
            trace!(template = %rule.template, phrase = %np.text, "candidate rejected as self-reference");
            Analysis::Unresolved { problem: term.to_string(), rule }
        }
        None => {
            trace!(template = %rule.template, "no phrase on the solution side");
            Analysis::Unresolved { problem: term.to_string(), rule }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::{HeuristicChunker, PhraseListChunker};
    use crate::config::StopwordMode;

    const GRAMMAR: &str = "[solution] for [problem]\n\
                           [solution] (is|are) good for [problem]\n\
                           [problem] (can be )?treated with [solution]";

    fn grammar() -> Grammar {
        Grammar::parse_partitioned("grammar.txt", GRAMMAR).unwrap().0
    }

    fn stop() -> Stopwords {
        Stopwords::parse("stop_words.txt", "^(you|it|this|that)$\n^@\\w+$", StopwordMode::Regex).unwrap()
    }

    fn run(sentence: &str, term: &str) -> Analysis {
        match_general(sentence, term, &grammar(), &stop(), &HeuristicChunker::new())
    }

    #[test]
    fn general_examples_matching() {
        // (sentence, term, expected solution, expected template index)
        let cases: Vec<(&str, &str, &str, usize)> = vec![
            ("This is a new medicine for hyperthyroidism", "hyperthyroidism", "a new medicine", 0),
            ("Green tea is good for asthma", "asthma", "Green tea", 1),
            ("Asthma can be treated with inhaled steroids", "Asthma", "inhaled steroids", 2),
            ("@clinic yoga for #asthma", "asthma", "yoga", 0),
        ];

        for (sentence, term, solution, index) in cases {
            match run(sentence, term) {
                Analysis::Found { solution: got, problem, rule } => {
                    assert_eq!(got, solution, "sentence: {sentence}");
                    assert_eq!(problem, term);
                    assert_eq!(rule.index, index, "sentence: {sentence}");
                }
                other => panic!("sentence: {sentence}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn stopword_phrases_are_skipped() {
        // "it" is the closest phrase but a stopword; scanning continues backwards.
        let chunker = PhraseListChunker::new(["turmeric", "it"]);
        let got = match_general("turmeric, it for arthritis", "arthritis", &grammar(), &stop(), &chunker);
        assert_eq!(got.solution(), Some("turmeric"));
    }

    #[test]
    fn self_reference_is_unresolved() {
        let chunker = PhraseListChunker::new(["asthma", "asthma drugs"]);
        let got = match_general("asthma drugs for asthma", "asthma", &grammar(), &stop(), &chunker);
        assert!(matches!(got, Analysis::Unresolved { ref rule, .. } if rule.index == 0), "{got:?}");
    }

    #[test]
    fn nothing_on_the_solution_side_is_unresolved() {
        let got = run("for hyperthyroidism", "hyperthyroidism");
        assert!(matches!(got, Analysis::Unresolved { .. }), "{got:?}");
    }

    #[test]
    fn no_match_is_no_pattern_found() {
        let got = run("hyperthyroidism is rare", "hyperthyroidism");
        assert_eq!(got, Analysis::NoPatternFound { problem: "hyperthyroidism".into() });
    }
}
