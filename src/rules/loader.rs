//! Line-oriented resource file helpers.
//!
//! All resource files are UTF-8 text with one entry per line. Blank lines are
//! ignored; leading and trailing whitespace is not significant. Multi-field
//! entries are tab separated.

use crate::error::{ResourceLoadError, Result};
use std::path::Path;

/// Read a whole resource file. The handle is closed before returning.
pub(crate) fn read_resource(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ResourceLoadError::Io { path: path.to_path_buf(), source })
}

/// A resource's text and the name used in error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Source<'a> {
    pub name: &'a str,
    pub text: &'a str,
}

/// Non-blank trimmed lines with their 1-based line numbers.
pub(crate) fn entries(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().map(|(idx, line)| (idx + 1, line.trim())).filter(|(_, line)| !line.is_empty())
}

/// Split a line into exactly `N` tab-separated, non-empty fields.
pub(crate) fn fields<'a, const N: usize>(source_name: &str, line_no: usize, line: &'a str) -> Result<[&'a str; N]> {
    let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
    if parts.len() != N {
        return Err(ResourceLoadError::Malformed {
            source_name: source_name.to_string(),
            line: line_no,
            reason: format!("expected {} tab-separated fields, found {}", N, parts.len()),
        });
    }
    if let Some(pos) = parts.iter().position(|p| p.is_empty()) {
        return Err(ResourceLoadError::Malformed {
            source_name: source_name.to_string(),
            line: line_no,
            reason: format!("field {} is empty", pos + 1),
        });
    }
    let mut out = [""; N];
    out.copy_from_slice(&parts);
    Ok(out)
}
