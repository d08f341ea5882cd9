//! Description lexicon: user-grammar patterns compiled against the dictionary.
//!
//! Each line of the user grammar is `pattern<TAB>semantic tag`. Dictionary tags
//! inside the pattern are replaced by their alternatives before compiling:
//!
//! ```text
//! <MEDICAL_JOB> at <MEDICAL_PLACE>    Professional
//!   -> (?:physicist|nurse|...) at (?:hospital|clinic|...)
//! ```

use super::dictionary::UserDictionary;
use crate::error::{ResourceLoadError, Result};
use crate::rules::loader;
use regex::{Regex, RegexBuilder};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LexiconEntry {
    /// Pattern as written in the grammar file.
    pub pattern: String,
    pub tag: String,
    regex: Regex,
}

impl LexiconEntry {
    /// Leftmost match in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<regex::Match<'t>> {
        self.regex.find(text)
    }
}

/// Compiled lexicon in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
}

impl Lexicon {
    pub fn parse(source_name: &str, text: &str, dictionary: &UserDictionary) -> Result<Self> {
        let mut entries = Vec::new();
        for (line_no, line) in loader::entries(text) {
            let [pattern, tag] = loader::fields::<2>(source_name, line_no, line)?;
            let expanded = dictionary.substitute(pattern)?;
            let regex = RegexBuilder::new(&expanded).case_insensitive(true).build().map_err(|source| {
                ResourceLoadError::InvalidPattern {
                    source_name: source_name.to_string(),
                    line: line_no,
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            entries.push(LexiconEntry { pattern: pattern.to_string(), tag: tag.to_string(), regex });
        }
        debug!(source = source_name, entries = entries.len(), "user lexicon compiled");
        Ok(Lexicon { entries })
    }

    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
