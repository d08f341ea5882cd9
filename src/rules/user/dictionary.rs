//! User dictionary: tag -> alternatives.
//!
//! ```text
//! <MEDICAL_PLACE>   hospital
//! <MEDICAL_PLACE>   clinic
//! <DOCTOR_JOB>      dermat(ó|o)log(o|a)
//! <MEDICAL_JOB>     <DOCTOR_JOB>|<NURSE_JOB>     union of both tags
//! <MEDICAL_JOB>     chief <NURSE_JOB>            tag embedded in a value
//! ```
//!
//! Values are regex fragments. Tags are expanded transitively when the
//! dictionary is built; a tag that reaches itself again is a
//! [`TagCycleError`].

use crate::error::{ResourceLoadError, Result, TagCycleError};
use crate::rules::loader;
use std::collections::HashMap;

fn is_tag(token: &str) -> bool {
    regex!(r"^<[A-Z_]+>$").is_match(token)
}

/// Tags referenced inside a value or pattern.
fn referenced_tags(text: &str) -> impl Iterator<Item = regex::Match<'_>> {
    regex!(r"<[A-Z_]+>").find_iter(text)
}

/// A value that is nothing but `|`-joined tags: `<A>|<B>`.
fn tag_union(value: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = value.split('|').map(str::trim).collect();
    parts.iter().all(|p| is_tag(p)).then_some(parts)
}

/// Fully expanded dictionary.
#[derive(Debug, Clone, Default)]
pub struct UserDictionary {
    /// Tags in first-declared order.
    order: Vec<String>,
    expanded: HashMap<String, Vec<String>>,
}

impl UserDictionary {
    pub fn parse(source_name: &str, text: &str) -> Result<Self> {
        let mut order: Vec<String> = Vec::new();
        let mut raw: HashMap<String, Vec<String>> = HashMap::new();

        for (line_no, line) in loader::entries(text) {
            let [tag, value] = loader::fields::<2>(source_name, line_no, line)?;
            if !is_tag(tag) {
                return Err(ResourceLoadError::Malformed {
                    source_name: source_name.to_string(),
                    line: line_no,
                    reason: format!("'{tag}' is not a tag (expected <UPPER_CASE>)"),
                });
            }
            if !raw.contains_key(tag) {
                order.push(tag.to_string());
            }
            raw.entry(tag.to_string()).or_default().push(value.to_string());
        }

        let mut expanded = HashMap::new();
        for tag in &order {
            let mut stack = Vec::new();
            expand(tag, &raw, &mut expanded, &mut stack)?;
        }
        Ok(UserDictionary { order, expanded })
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn alternatives(&self, tag: &str) -> Option<&[String]> {
        self.expanded.get(tag).map(Vec::as_slice)
    }

    /// `(?:alt1|alt2|...)` for `tag`.
    pub fn group(&self, tag: &str) -> Option<String> {
        self.alternatives(tag).map(|alts| format!("(?:{})", alts.join("|")))
    }

    /// Replace every tag in `pattern` with its group.
    pub fn substitute(&self, pattern: &str) -> Result<String> {
        substitute_with(pattern, |tag| self.group(tag))
    }
}

fn substitute_with(pattern: &str, group: impl Fn(&str) -> Option<String>) -> Result<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut last = 0;
    for m in referenced_tags(pattern) {
        let replacement = group(m.as_str())
            .ok_or_else(|| ResourceLoadError::UnknownTag { tag: m.as_str().to_string(), pattern: pattern.to_string() })?;
        out.push_str(&pattern[last..m.start()]);
        out.push_str(&replacement);
        last = m.end();
    }
    out.push_str(&pattern[last..]);
    Ok(out)
}

/// Depth-first expansion of `tag` into `done`; `stack` holds the tags being expanded.
fn expand(
    tag: &str,
    raw: &HashMap<String, Vec<String>>,
    done: &mut HashMap<String, Vec<String>>,
    stack: &mut Vec<String>,
) -> Result<()> {
    if done.contains_key(tag) {
        return Ok(());
    }
    if let Some(pos) = stack.iter().position(|t| t == tag) {
        let mut chain = stack[pos..].to_vec();
        chain.push(tag.to_string());
        return Err(TagCycleError { chain }.into());
    }
    let values = raw.get(tag).ok_or_else(|| ResourceLoadError::UnknownTag {
        tag: tag.to_string(),
        pattern: stack.last().cloned().unwrap_or_default(),
    })?;

    stack.push(tag.to_string());
    let mut alternatives: Vec<String> = Vec::new();
    for value in values {
        let referenced: Vec<String> = referenced_tags(value).map(|m| m.as_str().to_string()).collect();
        for inner in &referenced {
            if !raw.contains_key(inner) {
                return Err(ResourceLoadError::UnknownTag { tag: inner.clone(), pattern: value.clone() });
            }
            expand(inner, raw, done, stack)?;
        }

        match tag_union(value) {
            Some(tags) => {
                for inner in tags {
                    alternatives.extend(done.get(inner).into_iter().flatten().cloned());
                }
            }
            None if referenced.is_empty() => alternatives.push(value.clone()),
            None => alternatives.push(substitute_with(value, |t| {
                done.get(t).map(|alts| format!("(?:{})", alts.join("|")))
            })?),
        }
    }
    stack.pop();

    let mut seen = std::collections::HashSet::new();
    alternatives.retain(|a| seen.insert(a.clone()));
    done.insert(tag.to_string(), alternatives);
    Ok(())
}
