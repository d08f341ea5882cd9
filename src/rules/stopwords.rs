//! Noun-phrase stopwords.
//!
//! Entries disqualify a candidate phrase from being delivered as an answer
//! (generic pronouns, bare `@handles`, ...). How an entry is tested is data:
//! see [`StopwordMode`].

use crate::config::StopwordMode;
use crate::error::{ResourceLoadError, Result};
use crate::rules::loader;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    mode: StopwordMode,
    entries: Vec<String>,
    compiled: Vec<Regex>,
}

impl Stopwords {
    pub fn parse(source_name: &str, text: &str, mode: StopwordMode) -> Result<Self> {
        let mut stopwords = Stopwords { mode, ..Stopwords::default() };
        for (line_no, line) in loader::entries(text) {
            // Regex entries keep their case: `\S` and `\s` differ.
            let entry = match mode {
                StopwordMode::Regex => line.to_string(),
                StopwordMode::Literal => line.to_lowercase(),
            };
            if mode == StopwordMode::Regex {
                let regex = RegexBuilder::new(&entry).case_insensitive(true).build().map_err(|source| {
                    ResourceLoadError::InvalidPattern {
                        source_name: source_name.to_string(),
                        line: line_no,
                        pattern: entry.clone(),
                        source,
                    }
                })?;
                stopwords.compiled.push(regex);
            }
            stopwords.entries.push(entry);
        }
        Ok(stopwords)
    }

    pub fn mode(&self) -> StopwordMode {
        self.mode
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// True when `phrase` may not be returned as an answer.
    pub fn disqualifies(&self, phrase: &str) -> bool {
        match self.mode {
            StopwordMode::Regex => self.compiled.iter().any(|re| re.is_match(phrase)),
            StopwordMode::Literal => {
                let lower = phrase.to_lowercase();
                self.entries.iter().any(|e| lower.contains(e.as_str()))
            }
        }
    }
}
