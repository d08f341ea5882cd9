//! User classification.
//!
//! Two phases, the first short-circuiting the second:
//!
//! 1. Name patterns against the raw display name; the longest match wins.
//! 2. Description lexicon, behind the query-term pre-filter. The longest match
//!    is kept per tag, then the tag is chosen by editorial priority, not by
//!    match length.

use crate::rules::user::{TagPriority, UserResources};
use crate::UserAnalysis;
use tracing::trace;

/// Best match of one tag in a description.
#[derive(Debug)]
struct TagCandidate<'a> {
    tag: &'a str,
    pattern: &'a str,
    matched: String,
    len: usize,
    /// Order in which the tag was first seen; ranks unlisted tags.
    first_seen: usize,
}

fn classify_name(name: &str, resources: &UserResources) -> Option<UserAnalysis> {
    let mut best: Option<(usize, UserAnalysis)> = None;
    for pattern in resources.name_patterns.iter() {
        let Some(m) = pattern.find(name) else { continue };
        let len = m.as_str().chars().count();
        if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
            best = Some((len, UserAnalysis::FromName {
                pattern: pattern.pattern.clone(),
                tag: pattern.tag.clone(),
                matched: m.as_str().to_string(),
            }));
        }
    }
    best.map(|(_, analysis)| analysis)
}

fn classify_description(description: &str, resources: &UserResources) -> Option<UserAnalysis> {
    if let Some(queries) = &resources.queries {
        if !queries.matches(description) {
            trace!("description has no query term; lexicon skipped");
            return None;
        }
    }

    let mut candidates: Vec<TagCandidate<'_>> = Vec::new();
    for entry in resources.lexicon.entries() {
        let Some(m) = entry.find(description) else { continue };
        let len = m.as_str().chars().count();
        match candidates.iter_mut().find(|c| c.tag == entry.tag) {
            Some(existing) if len > existing.len => {
                existing.pattern = &entry.pattern;
                existing.matched = m.as_str().to_string();
                existing.len = len;
            }
            Some(_) => {}
            None => {
                let first_seen = candidates.len();
                candidates.push(TagCandidate {
                    tag: &entry.tag,
                    pattern: &entry.pattern,
                    matched: m.as_str().to_string(),
                    len,
                    first_seen,
                });
            }
        }
    }

    let winner = pick_by_priority(&candidates, &resources.priority)?;
    trace!(tag = winner.tag, pattern = winner.pattern, tags = candidates.len(), "description classified");
    Some(UserAnalysis::FromDescription {
        pattern: winner.pattern.to_string(),
        tag: winner.tag.to_string(),
        matched: winner.matched.clone(),
    })
}

fn pick_by_priority<'c, 'a>(candidates: &'c [TagCandidate<'a>], priority: &TagPriority) -> Option<&'c TagCandidate<'a>> {
    candidates.iter().min_by_key(|c| (priority.rank(c.tag).unwrap_or(usize::MAX), c.first_seen))
}

/// Classify a user from their display name and profile description.
pub(crate) fn classify(name: &str, description: &str, resources: &UserResources) -> UserAnalysis {
    if let Some(analysis) = classify_name(name, resources) {
        trace!(tag = ?analysis.tag(), "user classified from name");
        return analysis;
    }
    classify_description(description, resources).unwrap_or(UserAnalysis::Unclassified)
}
