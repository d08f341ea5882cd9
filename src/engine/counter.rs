//! Counter rules: known false-positive frames.
//!
//! "risk for obesity" has the shape of "[solution] for [problem]" but names
//! no solution. A counter template matching the isolated sentence discards the
//! message before any extraction runs.

use super::compiled_rules::Grammar;
use crate::MatchedRule;
use tracing::trace;

/// The counter template with the longest match on `sentence`, if any.
pub(crate) fn suppressing_rule(sentence: &str, term: &str, counter: &Grammar) -> Option<MatchedRule> {
    let hit = counter.longest_match(sentence, term)?;
    let rule = counter.rule(hit.index);
    trace!(template = %rule.template, term, "message suppressed by counter rule");
    Some(rule)
}

/// True iff at least one counter template matches `sentence` for `term`.
pub fn is_suppressed(sentence: &str, term: &str, counter: &Grammar) -> bool {
    suppressing_rule(sentence, term, counter).is_some()
}
