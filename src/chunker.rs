//! Noun-phrase chunking.
//!
//! The analyzer needs one linguistic capability: "given text, list its noun
//! phrases with offsets". It is consumed through the [`Chunker`] trait and
//! passed in explicitly, so callers can plug in any tagger-backed chunker.
//!
//! Offsets are byte offsets into exactly the string passed to
//! [`Chunker::chunk`]. Callers that chunk a modified copy of a message (the
//! magic-bullet stage pads it) must translate offsets themselves.
//!
//! Two implementations ship with the crate:
//!
//! - [`HeuristicChunker`]: closed-class word lists + punctuation. A noun
//!   phrase is a maximal run of open-class tokens, optionally led by
//!   determiners. Good enough for short English posts; deterministic.
//! - [`PhraseListChunker`]: a gazetteer. Emits leftmost-longest occurrences of
//!   a fixed phrase list.

use serde::Serialize;
use std::collections::HashSet;

/// A noun phrase and its span in the chunked text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NounPhrase {
    pub text: String,
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

impl NounPhrase {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        NounPhrase { text: text.into(), start, end }
    }

    fn from_span(source: &str, start: usize, end: usize) -> Self {
        NounPhrase { text: source[start..end].to_string(), start, end }
    }
}

/// Produces non-overlapping noun phrases in left-to-right order.
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str) -> Vec<NounPhrase>;
}

// --- Heuristic chunker -------------------------------------------------------

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "my", "your", "his", "her", "its", "our", "their", "some", "any", "no", "every", "each", "all",
    "both", "another", "such", "this", "that", "these", "those",
];

/// Determiners that are a phrase of their own when nothing follows ("This is ...").
const DEMONSTRATIVES: &[&str] = &["this", "that", "these", "those"];

const PRONOUNS: &[&str] = &[
    "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "myself", "yourself", "himself", "herself",
    "itself", "ourselves", "themselves", "someone", "everyone", "anyone", "nobody", "something", "everything",
    "anything", "nothing",
];

/// Closed-class and high-frequency verbal words that end a phrase.
const BREAK_WORDS: &[&str] = &[
    // prepositions
    "about", "above", "across", "after", "against", "along", "among", "around", "as", "at", "before", "behind",
    "below", "beneath", "beside", "between", "beyond", "by", "despite", "during", "except", "for", "from", "in",
    "inside", "into", "like", "near", "of", "off", "on", "onto", "out", "over", "per", "since", "through",
    "throughout", "to", "toward", "towards", "under", "until", "up", "upon", "via", "with", "within", "without",
    // conjunctions and relatives
    "and", "or", "but", "nor", "so", "yet", "if", "because", "while", "whereas", "although", "though", "than",
    "which", "who", "whom", "whose", "what", "when", "where", "why", "how", "whether",
    // auxiliaries and modals
    "am", "is", "are", "was", "were", "be", "been", "being", "do", "does", "did", "done", "have", "has", "had",
    "having", "can", "could", "may", "might", "must", "shall", "should", "will", "would", "'s", "isn't", "aren't",
    "wasn't", "don't", "doesn't", "didn't", "can't", "won't",
    // frequent verbs in treatment talk
    "beat", "beats", "become", "becomes", "bring", "brings", "combat", "combats", "cure", "cures", "cured", "curing",
    "ease", "eases", "eased", "fight", "fights", "fought", "fighting", "get", "gets", "got", "give", "gives", "gave",
    "go", "goes", "went", "help", "helps", "helped", "helping", "improve", "improves", "improved", "keep", "keeps",
    "kept", "lower", "lowers", "lowered", "make", "makes", "made", "manage", "manages", "managed", "prevent",
    "prevents", "prevented", "protect", "protects", "protected", "reduce", "reduces", "reduced", "relieve",
    "relieves", "relieved", "reverse", "reverses", "reversed", "say", "says", "said", "see", "sees", "saw", "show",
    "shows", "showed", "shown", "stop", "stops", "stopped", "suffer", "suffers", "suffered", "take", "takes", "took",
    "taken", "tackle", "tackles", "treat", "treats", "treated", "treating", "try", "tries", "tried", "use", "uses",
    "used", "using", "work", "works", "worked", "linked", "associated", "caused", "causes", "found", "approved",
    // adverbs and particles
    "not", "now", "also", "just", "only", "very", "really", "already", "still", "even", "ever", "never", "always",
    "often", "here", "there", "then", "too", "again", "today", "tonight", "yesterday", "tomorrow",
];

/// Splits on closed-class words and punctuation.
///
/// ```text
/// "This is a new medicine for hyperthyroidism"
///  [This] is [a new medicine] for [hyperthyroidism]
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicChunker {
    determiners: HashSet<&'static str>,
    demonstratives: HashSet<&'static str>,
    pronouns: HashSet<&'static str>,
    breaks: HashSet<&'static str>,
}

impl Default for HeuristicChunker {
    fn default() -> Self {
        HeuristicChunker {
            determiners: DETERMINERS.iter().copied().collect(),
            demonstratives: DEMONSTRATIVES.iter().copied().collect(),
            pronouns: PRONOUNS.iter().copied().collect(),
            breaks: BREAK_WORDS.iter().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    /// A phrase on its own: pronoun, @handle, #hashtag, URL.
    Standalone,
    Determiner,
    Content,
    Break,
}

/// A run of tokens being grown into a phrase.
#[derive(Debug, Default)]
struct Run {
    start: Option<usize>,
    end: usize,
    content: bool,
    lone_demonstrative: bool,
}

impl Run {
    fn take(&mut self, source: &str, out: &mut Vec<NounPhrase>) {
        if let Some(start) = self.start {
            if self.content || self.lone_demonstrative {
                out.push(NounPhrase::from_span(source, start, self.end));
            }
        }
        *self = Run::default();
    }
}

impl HeuristicChunker {
    pub fn new() -> Self {
        Self::default()
    }

    fn classify(&self, token: &str) -> TokenClass {
        if token.starts_with('@') || token.starts_with('#') || token.contains("://") {
            return TokenClass::Standalone;
        }
        if !token.chars().next().is_some_and(|c| c.is_alphanumeric()) {
            return TokenClass::Break;
        }
        // ASCII folding is enough: every closed-class list is ASCII English.
        let lower = token.to_ascii_lowercase();
        let word = lower.as_str();
        if self.pronouns.contains(word) {
            TokenClass::Standalone
        } else if self.determiners.contains(word) {
            TokenClass::Determiner
        } else if self.breaks.contains(word) {
            TokenClass::Break
        } else {
            TokenClass::Content
        }
    }
}

impl Chunker for HeuristicChunker {
    fn chunk(&self, text: &str) -> Vec<NounPhrase> {
        let tokens = regex!(r"https?://\S+|[@#]\w+|\w+(?:['’\-]\w+)*|[^\w\s]");
        let mut out = Vec::new();
        let mut run = Run::default();

        for m in tokens.find_iter(text) {
            let token = m.as_str();
            match self.classify(token) {
                TokenClass::Standalone => {
                    run.take(text, &mut out);
                    out.push(NounPhrase::from_span(text, m.start(), m.end()));
                }
                TokenClass::Break => run.take(text, &mut out),
                TokenClass::Determiner => {
                    // A determiner opens a phrase; after content it starts a new one.
                    if run.content {
                        run.take(text, &mut out);
                    }
                    if run.start.is_none() {
                        run.start = Some(m.start());
                        run.lone_demonstrative = self.demonstratives.contains(token.to_ascii_lowercase().as_str());
                    } else {
                        run.lone_demonstrative = false;
                    }
                    run.end = m.end();
                }
                TokenClass::Content => {
                    if run.start.is_none() {
                        run.start = Some(m.start());
                    }
                    run.end = m.end();
                    run.content = true;
                }
            }
        }
        run.take(text, &mut out);
        out
    }
}

// --- Phrase-list chunker -----------------------------------------------------

/// Gazetteer chunker over a fixed phrase list.
///
/// Matching is ASCII case-insensitive and respects word boundaries; at each
/// position the longest listed phrase wins and matches never overlap.
#[derive(Debug, Clone)]
pub struct PhraseListChunker {
    phrases: Vec<String>,
}

impl PhraseListChunker {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut phrases: Vec<String> =
            phrases.into_iter().map(|p| p.as_ref().trim().to_ascii_lowercase()).filter(|p| !p.is_empty()).collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        phrases.dedup();
        PhraseListChunker { phrases }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

impl Chunker for PhraseListChunker {
    fn chunk(&self, text: &str) -> Vec<NounPhrase> {
        let lower = text.to_ascii_lowercase();
        let bytes = lower.as_bytes();
        let mut out = Vec::new();
        let mut pos = 0;

        while pos < lower.len() {
            let at_boundary = pos == 0 || !is_word_byte(bytes[pos - 1]) || !is_word_byte(bytes[pos]);
            let hit = at_boundary
                .then(|| {
                    self.phrases.iter().find(|p| {
                        lower[pos..].starts_with(p.as_str())
                            && (pos + p.len() == lower.len()
                                || !is_word_byte(bytes[pos + p.len()])
                                || !is_word_byte(bytes[pos + p.len() - 1]))
                    })
                })
                .flatten();

            match hit {
                Some(phrase) => {
                    out.push(NounPhrase::from_span(text, pos, pos + phrase.len()));
                    pos += phrase.len();
                }
                None => {
                    pos += lower[pos..].chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        out
    }
}
