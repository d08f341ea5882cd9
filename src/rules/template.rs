//! Template parsing.
//!
//! Grammar files hold regex templates with placeholders. A template is parsed
//! once into [`Segment`]s so that placeholders are replaced structurally: the
//! substituted term is escaped and never re-scanned, so a term that happens to
//! look like `[solution]` stays literal text.
//!
//! ```text
//! "[solution] (is|was) used for [problem]"
//!   -> [Solution, Text(" (is|was) used for "), Problem]
//!
//! "[npl]protect\w*( \w+){0,5} against"
//!   -> [NounPhrase(Left), Text("protect\w*( \w+){0,5} against")]
//! ```
//!
//! Recognized placeholders (long and legacy spellings):
//!
//! | placeholder            | legacy        | segment                     |
//! |------------------------|---------------|-----------------------------|
//! | `[problem]`            | `[p]`         | `Problem`                   |
//! | `[solution]`           | `[s]`         | `Solution`                  |
//! | `[np=treatment]`       | `[np = ...]`  | `NounPhrase(Inline(..))`    |
//! | `[np-left]`            | `[npl]`       | `NounPhrase(Left)`          |
//! | `[np-right]`           | `[npr]`       | `NounPhrase(Right)`         |
//!
//! Any other bracket (a regex character class such as `[a-z]`) and any
//! backslash-escaped `\[` is kept as regex text.

use bitflags::bitflags;

bitflags! {
    /// Placeholders present in a template.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlaceholderSet: u8 {
        const PROBLEM   = 1 << 0;
        const SOLUTION  = 1 << 1;
        const NP_INLINE = 1 << 2;
        const NP_LEFT   = 1 << 3;
        const NP_RIGHT  = 1 << 4;
        const NP_ANY    = Self::NP_INLINE.bits() | Self::NP_LEFT.bits() | Self::NP_RIGHT.bits();
    }
}

/// Noun-phrase slot of a magic-bullet template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NpSlot {
    /// The template names the phrase head literally, e.g. `[np=surgery]`.
    Inline(String),
    /// A noun phrase ends right before the anchor text.
    Left,
    /// A noun phrase starts right after the anchor text.
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Text(String),
    Problem,
    Solution,
    NounPhrase(NpSlot),
}

impl Segment {
    fn flag(&self) -> PlaceholderSet {
        match self {
            Segment::Text(_) => PlaceholderSet::empty(),
            Segment::Problem => PlaceholderSet::PROBLEM,
            Segment::Solution => PlaceholderSet::SOLUTION,
            Segment::NounPhrase(NpSlot::Inline(_)) => PlaceholderSet::NP_INLINE,
            Segment::NounPhrase(NpSlot::Left) => PlaceholderSet::NP_LEFT,
            Segment::NounPhrase(NpSlot::Right) => PlaceholderSet::NP_RIGHT,
        }
    }
}

/// The three template families and their placeholder requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateClass {
    /// Exactly one problem and one solution.
    General,
    /// Exactly one noun-phrase slot, at most one problem, no solution.
    MagicBullet,
    /// Exactly one problem, nothing else.
    Counter,
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    placeholders: PlaceholderSet,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let segments = parse_segments(source);
        let placeholders = segments.iter().fold(PlaceholderSet::empty(), |acc, s| acc | s.flag());
        Template { source: source.to_string(), segments, placeholders }
    }

    /// Template text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn placeholders(&self) -> PlaceholderSet {
        self.placeholders
    }

    /// Family implied by the placeholders; grammar files mix general and
    /// magic-bullet templates and are partitioned with this.
    pub fn implied_class(&self) -> TemplateClass {
        if self.placeholders.intersects(PlaceholderSet::NP_ANY) {
            TemplateClass::MagicBullet
        } else {
            TemplateClass::General
        }
    }

    pub fn np_slot(&self) -> Option<&NpSlot> {
        self.segments.iter().find_map(|s| match s {
            Segment::NounPhrase(slot) => Some(slot),
            _ => None,
        })
    }

    /// True when `[solution]` is written before `[problem]`.
    pub fn solution_first(&self) -> bool {
        let solution = self.segments.iter().position(|s| *s == Segment::Solution);
        let problem = self.segments.iter().position(|s| *s == Segment::Problem);
        matches!((solution, problem), (Some(s), Some(p)) if s < p)
    }

    fn count(&self, pred: impl Fn(&Segment) -> bool) -> usize {
        self.segments.iter().filter(|s| pred(s)).count()
    }

    /// Check placeholder counts for `class`; the error is a human-readable reason.
    pub fn validate(&self, class: TemplateClass) -> Result<(), String> {
        let problems = self.count(|s| *s == Segment::Problem);
        let solutions = self.count(|s| *s == Segment::Solution);
        let slots = self.count(|s| matches!(s, Segment::NounPhrase(_)));

        let (problem_ok, want_problem) = match class {
            TemplateClass::General | TemplateClass::Counter => (problems == 1, "exactly one [problem]"),
            TemplateClass::MagicBullet => (problems <= 1, "at most one [problem]"),
        };
        if !problem_ok {
            return Err(format!("expected {want_problem}, found {problems}"));
        }

        match class {
            TemplateClass::General if solutions != 1 => Err(format!("expected exactly one [solution], found {solutions}")),
            TemplateClass::General if slots > 0 => Err("noun-phrase slots are not allowed here".to_string()),
            TemplateClass::MagicBullet if slots != 1 => Err(format!("expected exactly one [np...] slot, found {slots}")),
            TemplateClass::MagicBullet | TemplateClass::Counter if solutions > 0 => {
                Err("[solution] is not allowed here".to_string())
            }
            TemplateClass::Counter if slots > 0 => Err("noun-phrase slots are not allowed here".to_string()),
            _ => Ok(()),
        }
    }
}

fn parse_segments(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        let (before, from_open) = rest.split_at(open);
        literal.push_str(before);

        let escaped = literal.ends_with('\\');
        match placeholder_at(from_open).filter(|_| !escaped) {
            Some((segment, consumed)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Text(std::mem::take(&mut literal)));
                }
                segments.push(segment);
                rest = &from_open[consumed..];
            }
            None => {
                literal.push('[');
                rest = &from_open[1..];
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Text(literal));
    }
    segments
}

/// Recognize a placeholder at the start of `s` (which begins with `[`).
/// Returns the segment and the number of bytes it spans.
fn placeholder_at(s: &str) -> Option<(Segment, usize)> {
    let close = s.find(']')?;
    let inner = s[1..close].trim();
    let segment = match inner {
        "problem" | "p" => Segment::Problem,
        "solution" | "s" => Segment::Solution,
        "np-left" | "npl" => Segment::NounPhrase(NpSlot::Left),
        "np-right" | "npr" => Segment::NounPhrase(NpSlot::Right),
        other => {
            let literal = other.strip_prefix("np")?.trim_start().strip_prefix('=')?.trim();
            if literal.is_empty() {
                return None;
            }
            Segment::NounPhrase(NpSlot::Inline(literal.to_string()))
        }
    };
    Some((segment, close + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    #[test]
    fn parses_long_and_legacy_placeholders() {
        assert_eq!(Template::parse("[solution] for [problem]").segments(), &[
            Segment::Solution,
            text(" for "),
            Segment::Problem
        ]);
        assert_eq!(Template::parse("[s] for [p]").segments(), Template::parse("[solution] for [problem]").segments());
        assert_eq!(Template::parse("[npl]is the treatment").segments(), &[
            Segment::NounPhrase(NpSlot::Left),
            text("is the treatment")
        ]);
        assert_eq!(Template::parse("the treatment is[np-right]").segments(), &[
            text("the treatment is"),
            Segment::NounPhrase(NpSlot::Right)
        ]);
        assert_eq!(Template::parse("[np = surgery]").segments(), &[Segment::NounPhrase(NpSlot::Inline(
            "surgery".into()
        ))]);
        assert_eq!(Template::parse("[np=stem cell therapy]").np_slot(), Some(&NpSlot::Inline("stem cell therapy".into())));
    }

    #[test]
    fn character_classes_and_escapes_stay_literal() {
        let t = Template::parse(r"[solution] [a-z]+ against [problem]");
        assert_eq!(t.segments(), &[Segment::Solution, text(" [a-z]+ against "), Segment::Problem]);

        let t = Template::parse(r"\[p] for [problem]");
        assert_eq!(t.segments(), &[text(r"\[p] for "), Segment::Problem]);

        let t = Template::parse("[np = ] alone [problem");
        assert_eq!(t.segments(), &[text("[np = ] alone [problem")]);
    }

    #[test]
    fn records_placeholder_set_and_direction() {
        let t = Template::parse("[problem] treated with [solution]");
        assert_eq!(t.placeholders(), PlaceholderSet::PROBLEM | PlaceholderSet::SOLUTION);
        assert!(!t.solution_first());
        assert_eq!(t.implied_class(), TemplateClass::General);

        let t = Template::parse("[solution] to treat [problem]");
        assert!(t.solution_first());

        let t = Template::parse("[npl]protect\\w*( \\w+){0,5} against");
        assert!(t.placeholders().contains(PlaceholderSet::NP_LEFT));
        assert_eq!(t.implied_class(), TemplateClass::MagicBullet);
    }

    #[test]
    fn validation_per_class() {
        assert!(Template::parse("[solution] for [problem]").validate(TemplateClass::General).is_ok());
        assert!(Template::parse("for [problem]").validate(TemplateClass::General).is_err());
        assert!(Template::parse("[solution] for [problem] and [problem]").validate(TemplateClass::General).is_err());
        assert!(Template::parse("[solution] [s] for [problem]").validate(TemplateClass::General).is_err());

        assert!(Template::parse("[np=surgery]").validate(TemplateClass::MagicBullet).is_ok());
        assert!(Template::parse("[npl]cures [problem]").validate(TemplateClass::MagicBullet).is_ok());
        assert!(Template::parse("[npl] and [npr]").validate(TemplateClass::MagicBullet).is_err());
        assert!(Template::parse("[npl] [solution]").validate(TemplateClass::MagicBullet).is_err());

        assert!(Template::parse("risk for [problem]").validate(TemplateClass::Counter).is_ok());
        assert!(Template::parse("[solution] risk for [problem]").validate(TemplateClass::Counter).is_err());
        assert!(Template::parse("risk for").validate(TemplateClass::Counter).is_err());
    }
}
