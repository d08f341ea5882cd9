//! Template compilation and template sets.
//!
//! This module holds the *static* side of the engine: parsed templates turned
//! into matchable expressions, grouped into the three grammars.
//!
//! Compilation happens once, at load time:
//!
//! 1. Parse the text into segments (`rules/template.rs`) and validate the
//!    placeholder counts for the template's class.
//! 2. Render with a probe term and compile, so a malformed regex fails the
//!    whole load instead of silently dropping a rule.
//! 3. Templates without `[problem]` keep that compiled `Regex` for reuse;
//!    the others are re-rendered per start term at match time.
//!
//! ## Rendering
//!
//! ```text
//! [problem]   -> (?:#\w*TERM|TERM)        TERM regex-escaped, hashtag form first
//! [solution]  -> removed together with the whitespace around it
//! [np=lit]    -> lit                       escaped
//! [np-left]   -> (?P<np>(?:\S+\s+){4})     four tokens of left context
//! [np-right]  -> (?P<np>(?:\s+\S+){4})     four tokens of right context
//! ```
//!
//! Every expression is case-insensitive.
//!
//! ## Invariants
//!
//! - A [`Grammar`]'s templates keep their declaration order; that order is the
//!   tie-break for equal-length matches.

use crate::error::{ResourceLoadError, Result};
use crate::rules::loader;
use crate::rules::template::{NpSlot, PlaceholderSet, Segment, Template, TemplateClass};
use crate::{GrammarKind, MatchedRule, Range};
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::fmt::Write;
use tracing::{debug, trace, warn};

/// Number of whitespace-delimited tokens captured by a floating noun-phrase slot.
pub const WINDOW_TOKENS: usize = 4;

const PROBE_TERM: &str = "probe term";

/// Render `template` into a regex source with `term` in the problem slot.
pub(crate) fn render(template: &Template, term: &str) -> String {
    let escaped = regex::escape(term);
    let mut out = String::new();
    let mut trim_next = false;

    for segment in template.segments() {
        match segment {
            Segment::Text(text) => out.push_str(if trim_next { text.trim_start() } else { text }),
            Segment::Problem => {
                let _ = write!(out, r"(?:#\w*{escaped}|{escaped})");
            }
            Segment::Solution => {
                let kept = out.trim_end().len();
                out.truncate(kept);
            }
            Segment::NounPhrase(NpSlot::Inline(literal)) => out.push_str(&regex::escape(literal)),
            Segment::NounPhrase(NpSlot::Left) => {
                let _ = write!(out, r"(?P<np>(?:\S+\s+){{{WINDOW_TOKENS}}})");
            }
            Segment::NounPhrase(NpSlot::Right) => {
                let _ = write!(out, r"(?P<np>(?:\s+\S+){{{WINDOW_TOKENS}}})");
            }
        }
        trim_next = *segment == Segment::Solution;
    }
    out
}

fn build(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// A validated template plus its reusable regex when it has no problem slot.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: Template,
    fixed: Option<Regex>,
}

impl CompiledTemplate {
    fn compile(template: Template, class: TemplateClass, source_name: &str, line: usize) -> Result<Self> {
        template.validate(class).map_err(|reason| ResourceLoadError::InvalidTemplate {
            source_name: source_name.to_string(),
            line,
            template: template.source().to_string(),
            reason,
        })?;

        let rendered = render(&template, PROBE_TERM);
        let probe = build(&rendered).map_err(|source| ResourceLoadError::InvalidPattern {
            source_name: source_name.to_string(),
            line,
            pattern: rendered.clone(),
            source,
        })?;

        let fixed = (!template.placeholders().contains(PlaceholderSet::PROBLEM)).then_some(probe);
        Ok(CompiledTemplate { template, fixed })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn source(&self) -> &str {
        self.template.source()
    }

    /// The matchable expression for `term`.
    ///
    /// Only fails when the term itself pushes the expression past the regex
    /// size limits; callers skip the template in that case.
    pub(crate) fn instantiate(&self, term: &str) -> std::result::Result<Cow<'_, Regex>, regex::Error> {
        match &self.fixed {
            Some(regex) => Ok(Cow::Borrowed(regex)),
            None => build(&render(&self.template, term)).map(Cow::Owned),
        }
    }
}

/// Where (and how long) a template matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemplateHit {
    /// Declaration index of the template.
    pub index: usize,
    /// Span of the whole match.
    pub range: Range,
    /// Span captured by a floating noun-phrase slot, if any.
    pub window: Option<Range>,
    /// Match length in characters; the disambiguation key.
    pub len: usize,
}

/// An ordered set of compiled templates of one kind.
#[derive(Debug, Clone)]
pub struct Grammar {
    kind: GrammarKind,
    templates: Vec<CompiledTemplate>,
}

impl Grammar {
    pub fn empty(kind: GrammarKind) -> Self {
        Grammar { kind, templates: Vec::new() }
    }

    /// Parse a counter-grammar file: every line must be a counter template.
    pub fn parse_counter(source_name: &str, text: &str) -> Result<Self> {
        let mut grammar = Grammar::empty(GrammarKind::Counter);
        for (line_no, line) in loader::entries(text) {
            let compiled = CompiledTemplate::compile(Template::parse(line), TemplateClass::Counter, source_name, line_no)?;
            grammar.templates.push(compiled);
        }
        debug!(source = source_name, templates = grammar.len(), "counter grammar compiled");
        Ok(grammar)
    }

    /// Parse a grammar file, partitioning it into the general grammar and the
    /// magic-bullet grammar (templates with a noun-phrase slot).
    pub fn parse_partitioned(source_name: &str, text: &str) -> Result<(Self, Self)> {
        let mut general = Grammar::empty(GrammarKind::General);
        let mut magic = Grammar::empty(GrammarKind::MagicBullet);
        for (line_no, line) in loader::entries(text) {
            let template = Template::parse(line);
            let class = template.implied_class();
            let compiled = CompiledTemplate::compile(template, class, source_name, line_no)?;
            match class {
                TemplateClass::MagicBullet => magic.templates.push(compiled),
                _ => general.templates.push(compiled),
            }
        }
        debug!(
            source = source_name,
            general = general.len(),
            magic_bullet = magic.len(),
            "grammar compiled"
        );
        Ok((general, magic))
    }

    pub fn kind(&self) -> GrammarKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CompiledTemplate> {
        self.templates.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledTemplate> {
        self.templates.iter()
    }

    pub(crate) fn rule(&self, index: usize) -> MatchedRule {
        MatchedRule {
            grammar: self.kind,
            index,
            template: self.templates.get(index).map(|t| t.source().to_string()).unwrap_or_default(),
        }
    }

    /// Leftmost match of one template in `haystack`.
    pub(crate) fn match_one(&self, index: usize, haystack: &str, term: &str) -> Option<TemplateHit> {
        let template = self.templates.get(index)?;
        let regex = match template.instantiate(term) {
            Ok(regex) => regex,
            Err(err) => {
                warn!(grammar = ?self.kind, index, term, error = %err, "template skipped for this term");
                return None;
            }
        };
        let caps = regex.captures(haystack)?;
        let whole = caps.get(0)?;
        Some(TemplateHit {
            index,
            range: Range::new(whole.start(), whole.end()),
            window: caps.name("np").map(|m| Range::new(m.start(), m.end())),
            len: whole.as_str().chars().count(),
        })
    }

    /// The template with the longest match in `haystack`; the first declared
    /// wins a tie.
    pub(crate) fn longest_match(&self, haystack: &str, term: &str) -> Option<TemplateHit> {
        let mut best: Option<TemplateHit> = None;
        for index in 0..self.templates.len() {
            if let Some(hit) = self.match_one(index, haystack, term) {
                if best.as_ref().is_none_or(|b| hit.len > b.len) {
                    best = Some(hit);
                }
            }
        }
        if let Some(hit) = &best {
            trace!(grammar = ?self.kind, index = hit.index, len = hit.len, "longest template match");
        }
        best
    }
}
