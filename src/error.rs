//! Load-time error taxonomy.
//!
//! Only resource loading can fail. Per-message and per-user analysis always
//! returns data (see [`crate::Analysis`] and [`crate::UserAnalysis`]); the
//! "nothing found" outcomes are ordinary values, never errors.

use std::path::PathBuf;
use thiserror::Error;

/// A dictionary tag that (transitively) expands back into itself.
///
/// `chain` lists the tags visited, starting and ending with the repeated tag,
/// e.g. `["<A>", "<B>", "<A>"]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tag cycle detected: {}", chain.join(" -> "))]
pub struct TagCycleError {
    pub chain: Vec<String>,
}

/// Failure to build a [`crate::Resources`] set. Fatal at startup.
#[derive(Debug, Error)]
pub enum ResourceLoadError {
    #[error("cannot read resource file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}:{line}: malformed entry: {reason}")]
    Malformed { source_name: String, line: usize, reason: String },

    #[error("{source_name}:{line}: invalid template '{template}': {reason}")]
    InvalidTemplate { source_name: String, line: usize, template: String, reason: String },

    #[error("{source_name}:{line}: pattern '{pattern}' does not compile: {source}")]
    InvalidPattern {
        source_name: String,
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern '{pattern}' references unknown tag {tag}")]
    UnknownTag { tag: String, pattern: String },

    #[error(transparent)]
    TagCycle(#[from] TagCycleError),

    #[error("invalid resource configuration {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = ResourceLoadError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_cycle_message_lists_the_chain() {
        let err = ResourceLoadError::from(TagCycleError { chain: vec!["<A>".into(), "<B>".into(), "<A>".into()] });
        assert_eq!(err.to_string(), "tag cycle detected: <A> -> <B> -> <A>");
    }

    #[test]
    fn malformed_message_points_at_the_line() {
        let err = ResourceLoadError::Malformed {
            source_name: "user_grammar.txt".into(),
            line: 7,
            reason: "expected 2 tab-separated fields, found 1".into(),
        };
        assert_eq!(err.to_string(), "user_grammar.txt:7: malformed entry: expected 2 tab-separated fields, found 1");
    }
}
