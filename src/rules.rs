//! Language resources.
//!
//! Resource files are loaded once into an immutable [`Resources`] value and
//! shared read-only by every analysis call. Changing a rule means building a
//! fresh set; nothing is mutated in place.
//!
//! ```text
//! grammar.txt ─────────┬─ general grammar       ┐
//!                      └─ magic-bullet grammar  │
//! counter_grammar.txt ─── counter grammar       ├─ MessageResources
//! start_words.txt ─────── StartTermIndex        │
//! stop_words.txt ──────── Stopwords             ┘
//!
//! user_dictionary.txt ─┐
//! user_grammar.txt ────┴─ Lexicon               ┐
//! user_name_patterns.txt  NamePatterns          ├─ UserResources
//! description_queries.txt QueryTerms (optional) │
//! tag_priority.txt ────── TagPriority (optional)┘
//! ```

pub mod loader;
pub mod start_terms;
pub mod stopwords;
pub mod template;
pub mod user;

use crate::config::{ResourceConfig, ResourcePaths, StopwordMode};
use crate::engine::Grammar;
use crate::error::Result;
use crate::GrammarKind;
use loader::Source;
use start_terms::StartTermIndex;
use std::path::Path;
use stopwords::Stopwords;
use tracing::debug;
use user::{UserResources, UserSources};

/// Everything [`crate::analyze_message`] reads.
#[derive(Debug, Clone)]
pub struct MessageResources {
    pub start_terms: StartTermIndex,
    pub general: Grammar,
    pub magic_bullet: Grammar,
    pub counter: Grammar,
    pub stopwords: Stopwords,
}

impl Default for MessageResources {
    fn default() -> Self {
        MessageResources {
            start_terms: StartTermIndex::default(),
            general: Grammar::empty(GrammarKind::General),
            magic_bullet: Grammar::empty(GrammarKind::MagicBullet),
            counter: Grammar::empty(GrammarKind::Counter),
            stopwords: Stopwords::default(),
        }
    }
}

/// The complete, immutable resource set.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    pub message: MessageResources,
    pub user: UserResources,
}

/// Resource file contents held in memory.
///
/// Lets tests and embedders build a [`Resources`] set without touching disk.
#[derive(Debug, Clone, Default)]
pub struct ResourceSources {
    pub grammar: String,
    pub counter_grammar: String,
    pub start_terms: String,
    pub stopwords: String,
    pub user_dictionary: String,
    pub user_grammar: String,
    pub user_name_patterns: String,
    pub description_queries: Option<String>,
    pub tag_priority: Option<String>,
    pub stopword_mode: StopwordMode,
}

/// Names used in load errors, one per resource.
struct SourceNames {
    grammar: String,
    counter_grammar: String,
    start_terms: String,
    stopwords: String,
    user_dictionary: String,
    user_grammar: String,
    user_name_patterns: String,
}

impl SourceNames {
    fn conventional() -> Self {
        SourceNames {
            grammar: "grammar.txt".into(),
            counter_grammar: "counter_grammar.txt".into(),
            start_terms: "start_words.txt".into(),
            stopwords: "stop_words.txt".into(),
            user_dictionary: "user_dictionary.txt".into(),
            user_grammar: "user_grammar.txt".into(),
            user_name_patterns: "user_name_patterns.txt".into(),
        }
    }

    fn from_paths(paths: &ResourcePaths) -> Self {
        let name = |p: &Path| p.display().to_string();
        SourceNames {
            grammar: name(&paths.grammar),
            counter_grammar: name(&paths.counter_grammar),
            start_terms: name(&paths.start_terms),
            stopwords: name(&paths.stopwords),
            user_dictionary: name(&paths.user_dictionary),
            user_grammar: name(&paths.user_grammar),
            user_name_patterns: name(&paths.user_name_patterns),
        }
    }
}

impl Resources {
    /// Read and compile every file named by `config`.
    pub fn load(config: &ResourceConfig) -> Result<Self> {
        let paths = &config.paths;
        let optional = |path: Option<&Path>| path.map(loader::read_resource).transpose();

        let sources = ResourceSources {
            grammar: loader::read_resource(&paths.grammar)?,
            counter_grammar: loader::read_resource(&paths.counter_grammar)?,
            start_terms: loader::read_resource(&paths.start_terms)?,
            stopwords: loader::read_resource(&paths.stopwords)?,
            user_dictionary: loader::read_resource(&paths.user_dictionary)?,
            user_grammar: loader::read_resource(&paths.user_grammar)?,
            user_name_patterns: loader::read_resource(&paths.user_name_patterns)?,
            description_queries: optional(paths.description_queries.as_deref())?,
            tag_priority: optional(config.tag_priority.as_deref())?,
            stopword_mode: config.stopword_mode,
        };
        Self::build(&sources, &SourceNames::from_paths(paths))
    }

    /// Load the conventional layout inside `dir` (see [`ResourceConfig::in_dir`]).
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(&ResourceConfig::in_dir(dir))
    }

    /// Compile in-memory resource text.
    pub fn from_sources(sources: &ResourceSources) -> Result<Self> {
        Self::build(sources, &SourceNames::conventional())
    }

    fn build(sources: &ResourceSources, names: &SourceNames) -> Result<Self> {
        let (general, magic_bullet) = Grammar::parse_partitioned(&names.grammar, &sources.grammar)?;
        let counter = Grammar::parse_counter(&names.counter_grammar, &sources.counter_grammar)?;
        let start_terms = StartTermIndex::build(loader::entries(&sources.start_terms).map(|(_, term)| term));
        let stopwords = Stopwords::parse(&names.stopwords, &sources.stopwords, sources.stopword_mode)?;
        debug!(source = %names.start_terms, terms = start_terms.len(), stopwords = stopwords.entries().len(), "message resources loaded");

        let user = UserResources::parse(UserSources {
            dictionary: Source { name: &names.user_dictionary, text: &sources.user_dictionary },
            grammar: Source { name: &names.user_grammar, text: &sources.user_grammar },
            name_patterns: Source { name: &names.user_name_patterns, text: &sources.user_name_patterns },
            queries: sources.description_queries.as_deref(),
            priority: sources.tag_priority.as_deref(),
        })?;

        Ok(Resources {
            message: MessageResources { start_terms, general, magic_bullet, counter, stopwords },
            user,
        })
    }
}
