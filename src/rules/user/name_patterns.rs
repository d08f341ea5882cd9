//! Name patterns: credential markers in a display name.
//!
//! `regex<TAB>tag` per line, matched case-sensitively against the raw name
//! (`MD` is a credential, `md` is not).

use crate::error::{ResourceLoadError, Result};
use crate::rules::loader;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct NamePattern {
    pub pattern: String,
    pub tag: String,
    regex: Regex,
}

impl NamePattern {
    pub fn find<'t>(&self, name: &'t str) -> Option<regex::Match<'t>> {
        self.regex.find(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamePatterns {
    patterns: Vec<NamePattern>,
}

impl NamePatterns {
    pub fn parse(source_name: &str, text: &str) -> Result<Self> {
        let mut patterns = Vec::new();
        for (line_no, line) in loader::entries(text) {
            let [pattern, tag] = loader::fields::<2>(source_name, line_no, line)?;
            let regex = Regex::new(pattern).map_err(|source| ResourceLoadError::InvalidPattern {
                source_name: source_name.to_string(),
                line: line_no,
                pattern: pattern.to_string(),
                source,
            })?;
            patterns.push(NamePattern { pattern: pattern.to_string(), tag: tag.to_string(), regex });
        }
        Ok(NamePatterns { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamePattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
