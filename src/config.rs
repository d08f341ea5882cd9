//! Resource configuration.
//!
//! A [`ResourceConfig`] names every resource file and carries the two
//! data-level switches the rule files alone cannot express: how stopwords are
//! matched and (optionally) where the tag priority list lives.
//!
//! ```json
//! {
//!   "paths": { "grammar": "grammar.txt", "start_terms": "start_words.txt", ... },
//!   "stopword_mode": "regex",
//!   "tag_priority": "tag_priority.txt"
//! }
//! ```
//!
//! Relative paths in a config file resolve against the file's directory.

use crate::error::{ResourceLoadError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a stopword entry is tested against a candidate noun phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwordMode {
    /// Each entry is a case-insensitive regex searched anywhere in the phrase.
    #[default]
    Regex,
    /// Each entry is a case-insensitive literal substring.
    Literal,
}

/// Locations of the individual resource files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePaths {
    pub grammar: PathBuf,
    pub counter_grammar: PathBuf,
    pub start_terms: PathBuf,
    pub stopwords: PathBuf,
    pub user_dictionary: PathBuf,
    pub user_grammar: PathBuf,
    pub user_name_patterns: PathBuf,
    /// Pre-filter terms for descriptions. Without it every description is analyzed.
    #[serde(default)]
    pub description_queries: Option<PathBuf>,
}

impl ResourcePaths {
    /// The conventional file names inside `dir` (see `data/`).
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let queries = dir.join("description_queries.txt");
        ResourcePaths {
            grammar: dir.join("grammar.txt"),
            counter_grammar: dir.join("counter_grammar.txt"),
            start_terms: dir.join("start_words.txt"),
            stopwords: dir.join("stop_words.txt"),
            user_dictionary: dir.join("user_dictionary.txt"),
            user_grammar: dir.join("user_grammar.txt"),
            user_name_patterns: dir.join("user_name_patterns.txt"),
            description_queries: queries.exists().then_some(queries),
        }
    }

    fn rebase(&mut self, base: &Path) {
        for path in [
            &mut self.grammar,
            &mut self.counter_grammar,
            &mut self.start_terms,
            &mut self.stopwords,
            &mut self.user_dictionary,
            &mut self.user_grammar,
            &mut self.user_name_patterns,
        ] {
            rebase_path(path, base);
        }
        if let Some(path) = self.description_queries.as_mut() {
            rebase_path(path, base);
        }
    }
}

fn rebase_path(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

/// Everything needed to load a [`crate::Resources`] set from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub paths: ResourcePaths,
    #[serde(default)]
    pub stopword_mode: StopwordMode,
    /// One tag per line, highest priority first. Defaults to the built-in order.
    #[serde(default)]
    pub tag_priority: Option<PathBuf>,
}

impl ResourceConfig {
    /// Conventional layout inside `dir`, picking up `tag_priority.txt` when present.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let priority = dir.join("tag_priority.txt");
        ResourceConfig {
            paths: ResourcePaths::in_dir(dir),
            stopword_mode: StopwordMode::default(),
            tag_priority: priority.exists().then_some(priority),
        }
    }

    pub fn from_json_str(json: &str, base: &Path) -> std::result::Result<Self, serde_json::Error> {
        let mut config: ResourceConfig = serde_json::from_str(json)?;
        config.paths.rebase(base);
        if let Some(path) = config.tag_priority.as_mut() {
            rebase_path(path, base);
        }
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = crate::rules::loader::read_resource(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&json, base).map_err(|source| ResourceLoadError::Config { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_against_the_config_directory() {
        let json = r#"{
            "paths": {
                "grammar": "g.txt",
                "counter_grammar": "/abs/cg.txt",
                "start_terms": "terms.txt",
                "stopwords": "stop.txt",
                "user_dictionary": "dict.txt",
                "user_grammar": "ug.txt",
                "user_name_patterns": "names.txt"
            },
            "stopword_mode": "literal"
        }"#;
        let config = ResourceConfig::from_json_str(json, Path::new("/etc/curalex")).unwrap();
        assert_eq!(config.paths.grammar, PathBuf::from("/etc/curalex/g.txt"));
        assert_eq!(config.paths.counter_grammar, PathBuf::from("/abs/cg.txt"));
        assert_eq!(config.paths.description_queries, None);
        assert_eq!(config.stopword_mode, StopwordMode::Literal);
        assert_eq!(config.tag_priority, None);
    }

    #[test]
    fn stopword_mode_defaults_to_regex() {
        let json = r#"{"paths": {"grammar": "a", "counter_grammar": "b", "start_terms": "c", "stopwords": "d",
            "user_dictionary": "e", "user_grammar": "f", "user_name_patterns": "g"}}"#;
        let config = ResourceConfig::from_json_str(json, Path::new(".")).unwrap();
        assert_eq!(config.stopword_mode, StopwordMode::Regex);
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let err = ResourceConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ResourceLoadError::Io { .. }));
    }

    #[test]
    fn broken_config_json_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curalex.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = ResourceConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, ResourceLoadError::Config { .. }));
    }
}
