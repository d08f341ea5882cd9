//! User classification resources.
//!
//! - `dictionary.rs`: tag -> alternatives, expanded transitively.
//! - `lexicon.rs`: description patterns compiled against the dictionary.
//! - `name_patterns.rs`: credential patterns for display names.
//!
//! Plus the two small lists defined here: description query terms (a cheap
//! pre-filter) and the editorial tag priority.

pub mod dictionary;
pub mod lexicon;
pub mod name_patterns;


use crate::NO_TAG;
use crate::error::Result;
use crate::rules::loader::{self, Source};
use dictionary::UserDictionary;
use lexicon::Lexicon;
use name_patterns::NamePatterns;
use tracing::debug;

/// Highest priority first.
pub const DEFAULT_TAG_PRIORITY: &[&str] = &[
    "Doctor",
    "Academia",
    "Publishing source",
    "Institution",
    "Association",
    "Professional",
    "News source",
    "Healthcare initiative",
    "Patient",
    "Med Business",
    "Interested in healthcare",
    "Generic",
    NO_TAG,
];

/// Editorial ranking used when a description matches entries of several tags.
///
/// Tags missing from the list rank below every listed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPriority {
    tags: Vec<String>,
}

impl Default for TagPriority {
    fn default() -> Self {
        TagPriority { tags: DEFAULT_TAG_PRIORITY.iter().map(|t| t.to_string()).collect() }
    }
}

impl TagPriority {
    /// One tag per line, highest priority first.
    pub fn from_lines(text: &str) -> Self {
        TagPriority { tags: loader::entries(text).map(|(_, tag)| tag.to_string()).collect() }
    }

    pub fn rank(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t == tag)
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Terms a description must contain before the lexicon is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryTerms {
    terms: Vec<String>,
}

impl QueryTerms {
    pub fn from_lines(text: &str) -> Self {
        QueryTerms { terms: loader::entries(text).map(|(_, term)| term.to_lowercase()).collect() }
    }

    /// Case-insensitive substring test.
    pub fn matches(&self, description: &str) -> bool {
        let lower = description.to_lowercase();
        self.terms.iter().any(|t| lower.contains(t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Everything [`crate::classify_user`] reads.
#[derive(Debug, Clone, Default)]
pub struct UserResources {
    pub name_patterns: NamePatterns,
    pub lexicon: Lexicon,
    /// `None` disables the pre-filter.
    pub queries: Option<QueryTerms>,
    pub priority: TagPriority,
}

/// Raw text of the user resource files.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UserSources<'a> {
    pub dictionary: Source<'a>,
    pub grammar: Source<'a>,
    pub name_patterns: Source<'a>,
    pub queries: Option<&'a str>,
    pub priority: Option<&'a str>,
}

impl UserResources {
    pub(crate) fn parse(sources: UserSources<'_>) -> Result<Self> {
        let dictionary = UserDictionary::parse(sources.dictionary.name, sources.dictionary.text)?;
        let lexicon = Lexicon::parse(sources.grammar.name, sources.grammar.text, &dictionary)?;
        let name_patterns = NamePatterns::parse(sources.name_patterns.name, sources.name_patterns.text)?;
        let queries = sources.queries.map(QueryTerms::from_lines);
        let priority = sources.priority.map(TagPriority::from_lines).unwrap_or_default();

        debug!(
            dictionary_tags = dictionary.tags().count(),
            lexicon = lexicon.len(),
            name_patterns = name_patterns.len(),
            queries = queries.as_ref().map_or(0, QueryTerms::len),
            "user resources loaded"
        );
        Ok(UserResources { name_patterns, lexicon, queries, priority })
    }
}
