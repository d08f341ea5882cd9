#[macro_use]
mod macros;
mod api;
mod chunker;
mod config;
mod engine;
mod error;
mod rules;

pub use api::{AnalysisReport, analyze_message, analyze_message_verbose, classify_user};
pub use chunker::{Chunker, HeuristicChunker, NounPhrase, PhraseListChunker};
pub use config::{ResourceConfig, ResourcePaths, StopwordMode};
pub use engine::{
    AnalysisTrace, Analyzer, AnalyzerRun, CompiledTemplate, Grammar, Stage, StageMetrics, StartTermMatch, WINDOW_TOKENS,
    find_start_term, is_suppressed, isolate_sentence, match_general, match_magic_bullet,
};
pub use error::{ResourceLoadError, Result, TagCycleError};
pub use rules::start_terms::StartTermIndex;
pub use rules::stopwords::Stopwords;
pub use rules::template::{NpSlot, PlaceholderSet, Segment, Template, TemplateClass};
pub use rules::user::dictionary::UserDictionary;
pub use rules::user::lexicon::{Lexicon, LexiconEntry};
pub use rules::user::name_patterns::{NamePattern, NamePatterns};
pub use rules::user::{DEFAULT_TAG_PRIORITY, QueryTerms, TagPriority, UserResources};
pub use rules::{MessageResources, ResourceSources, Resources};

use serde::Serialize;

// --- Sentinels ---------------------------------------------------------------

/// Legacy marker for "no solution was extracted".
pub const NOTHING_FOUND: &str = "<nothing_found>";
/// Legacy marker for "the message names no disease term".
pub const NO_START_WORD: &str = "<no start word>";
/// Legacy marker for "no template matched".
pub const NO_PATTERN_FOUND: &str = "<no pattern found>";
/// Legacy marker for "no user pattern matched".
pub const NO_PATTERN: &str = "<no pattern>";
/// Legacy marker for "no semantic tag"; also usable as an explicit lexicon tag.
pub const NO_TAG: &str = "<no tag>";
/// Legacy marker for "classification came from neither name nor description".
pub const NO_PROVENANCE: &str = "<no name/description>";

// --- Shared types ------------------------------------------------------------

/// Byte span into a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    /// Start byte index (inclusive).
    pub start: usize,
    /// End byte index (exclusive).
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Range { start, end }
    }

    pub fn contains(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Which template set produced a [`MatchedRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarKind {
    General,
    MagicBullet,
    Counter,
}

/// The template that decided an outcome, identified by grammar and position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MatchedRule {
    pub grammar: GrammarKind,
    /// Declaration index within its grammar.
    pub index: usize,
    /// Template text as written in the resource file.
    pub template: String,
}

/// Outcome of analyzing one message.
///
/// Every stage returns one of these whole; later stages forward or replace it,
/// they never merge two of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Analysis {
    /// A solution noun phrase was extracted for `problem`.
    Found { solution: String, problem: String, rule: MatchedRule },
    /// A template matched but no noun phrase survived the filters.
    Unresolved { problem: String, rule: MatchedRule },
    /// A disease term was found but no template matched.
    NoPatternFound { problem: String },
    /// A counter rule marked the sentence as a known false-positive frame.
    Suppressed { problem: String, rule: MatchedRule },
    /// The message contains no disease term.
    NoStartWord,
}

impl Analysis {
    pub fn solution(&self) -> Option<&str> {
        match self {
            Analysis::Found { solution, .. } => Some(solution),
            _ => None,
        }
    }

    pub fn problem(&self) -> Option<&str> {
        match self {
            Analysis::Found { problem, .. }
            | Analysis::Unresolved { problem, .. }
            | Analysis::NoPatternFound { problem }
            | Analysis::Suppressed { problem, .. } => Some(problem),
            Analysis::NoStartWord => None,
        }
    }

    pub fn rule(&self) -> Option<&MatchedRule> {
        match self {
            Analysis::Found { rule, .. } | Analysis::Unresolved { rule, .. } | Analysis::Suppressed { rule, .. } => {
                Some(rule)
            }
            Analysis::NoPatternFound { .. } | Analysis::NoStartWord => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Analysis::Found { .. })
    }

    /// Render as the legacy `(solution, problem, rule)` string triple.
    pub fn to_triple(&self) -> (String, String, String) {
        let solution = self.solution().unwrap_or(NOTHING_FOUND).to_string();
        let problem = self.problem().unwrap_or(NO_START_WORD).to_string();
        let rule = self.rule().map(|r| r.template.clone()).unwrap_or_else(|| NO_PATTERN_FOUND.to_string());
        (solution, problem, rule)
    }
}

/// Where a user classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    FromName,
    FromDescription,
    None,
}

/// Outcome of classifying one user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum UserAnalysis {
    /// A name pattern (e.g. a credential suffix) matched.
    FromName { pattern: String, tag: String, matched: String },
    /// A description lexicon entry matched.
    FromDescription { pattern: String, tag: String, matched: String },
    Unclassified,
}

impl UserAnalysis {
    pub fn pattern(&self) -> Option<&str> {
        match self {
            UserAnalysis::FromName { pattern, .. } | UserAnalysis::FromDescription { pattern, .. } => Some(pattern),
            UserAnalysis::Unclassified => None,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            UserAnalysis::FromName { tag, .. } | UserAnalysis::FromDescription { tag, .. } => Some(tag),
            UserAnalysis::Unclassified => None,
        }
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            UserAnalysis::FromName { .. } => Provenance::FromName,
            UserAnalysis::FromDescription { .. } => Provenance::FromDescription,
            UserAnalysis::Unclassified => Provenance::None,
        }
    }

    /// True when the user carries a real semantic tag.
    ///
    /// A lexicon entry may tag a description explicitly as [`NO_TAG`]; that
    /// counts as classified but not relevant.
    pub fn is_relevant(&self) -> bool {
        self.tag().is_some_and(|t| t != NO_TAG)
    }

    /// Render as the legacy `(pattern, tag, provenance)` string triple.
    pub fn to_triple(&self) -> (String, String, String) {
        let provenance = match self.provenance() {
            Provenance::FromName => "<from Name>",
            Provenance::FromDescription => "<from Description>",
            Provenance::None => NO_PROVENANCE,
        };
        (
            self.pattern().unwrap_or(NO_PATTERN).to_string(),
            self.tag().unwrap_or(NO_TAG).to_string(),
            provenance.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> MatchedRule {
        MatchedRule { grammar: GrammarKind::General, index: 0, template: "[solution] for [problem]".into() }
    }

    #[test]
    fn triples_use_legacy_sentinels() {
        assert_eq!(
            Analysis::NoStartWord.to_triple(),
            (NOTHING_FOUND.into(), NO_START_WORD.into(), NO_PATTERN_FOUND.into())
        );
        assert_eq!(
            Analysis::NoPatternFound { problem: "asthma".into() }.to_triple(),
            (NOTHING_FOUND.into(), "asthma".into(), NO_PATTERN_FOUND.into())
        );
        assert_eq!(
            Analysis::Unresolved { problem: "asthma".into(), rule: rule() }.to_triple(),
            (NOTHING_FOUND.into(), "asthma".into(), "[solution] for [problem]".into())
        );
        assert_eq!(
            UserAnalysis::Unclassified.to_triple(),
            (NO_PATTERN.into(), NO_TAG.into(), NO_PROVENANCE.into())
        );
    }

    #[test]
    fn unresolved_and_no_pattern_are_distinguishable() {
        let unresolved = Analysis::Unresolved { problem: "asthma".into(), rule: rule() };
        let none = Analysis::NoPatternFound { problem: "asthma".into() };
        assert_ne!(unresolved, none);
        assert!(unresolved.rule().is_some());
        assert!(none.rule().is_none());
        assert_eq!(unresolved.solution(), None);
    }

    #[test]
    fn explicit_no_tag_is_not_relevant() {
        let user = UserAnalysis::FromDescription { pattern: "bot".into(), tag: NO_TAG.into(), matched: "bot".into() };
        assert_eq!(user.provenance(), Provenance::FromDescription);
        assert!(!user.is_relevant());
    }

    #[test]
    fn analysis_serializes_with_outcome_tag() {
        let json = serde_json::to_value(Analysis::NoPatternFound { problem: "asthma".into() }).unwrap();
        assert_eq!(json["outcome"], "no_pattern_found");
        assert_eq!(json["problem"], "asthma");
    }
}
