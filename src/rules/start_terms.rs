//! Start-term (disease term) index.
//!
//! Checking every known disease term against every message does not scale to
//! a lexicon of thousands of terms. Instead each term is indexed under each of
//! its content words; at match time only the buckets of words that actually
//! occur in the message are consulted.
//!
//! ```text
//! "anorexia nervosa"      -> anorexia, nervosa
//! "type ii diabetes"      -> type, diabetes        ("ii" is a roman numeral)
//! "vitamin d deficiency"  -> vitamin, deficiency   (single letter)
//! "of the"                -> dropped (no indexable word)
//! ```

use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Words never used as index keys.
const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "by", "for", "from", "in", "into", "of", "on", "or", "the", "to", "with", "without",
];

const ROMAN_NUMERALS: &[&str] = &["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];

/// Index words of `text`: runs of word characters, keeping inner hyphens and
/// apostrophes (`alzheimer's`, `covid-19`). Any other punctuation separates
/// words, so `#asthma,` yields `asthma` and `asthma/copd` yields both.
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    regex!(r"\w+(?:['’\-]\w+)*").find_iter(text).map(|m| m.as_str())
}

/// True when a (lowercased, normalized) token may not serve as an index key.
fn is_forbidden_token(token: &str) -> bool {
    token.is_empty()
        || token.chars().count() == 1
        || token.chars().all(|c| c.is_ascii_digit())
        || FUNCTION_WORDS.contains(&token)
        || ROMAN_NUMERALS.contains(&token)
}

/// Word -> terms index over the lowercased disease-term lexicon.
#[derive(Debug, Clone, Default)]
pub struct StartTermIndex {
    terms: Vec<String>,
    buckets: HashMap<String, Vec<usize>>,
}

impl StartTermIndex {
    /// Build the index. Terms are lowercased and deduplicated; terms whose
    /// words are all forbidden are dropped.
    pub fn build<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = StartTermIndex::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut dropped = 0usize;

        for raw in terms {
            let term = raw.as_ref().trim().to_lowercase();
            if term.is_empty() || seen.contains(&term) {
                continue;
            }

            let keys: Vec<&str> = words(&term).filter(|t| !is_forbidden_token(t)).collect();
            if keys.is_empty() {
                dropped += 1;
                continue;
            }

            let id = index.terms.len();
            for key in keys {
                let bucket = index.buckets.entry(key.to_string()).or_default();
                if bucket.last() != Some(&id) {
                    bucket.push(id);
                }
            }
            seen.insert(term.clone());
            index.terms.push(term);
        }

        debug!(terms = index.terms.len(), keys = index.buckets.len(), dropped, "start-term index built");
        index
    }

    /// Terms indexed under `word` (expects a lowercased, normalized word).
    pub fn candidates<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.buckets.get(word).into_iter().flatten().map(|&id| self.terms[id].as_str())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
