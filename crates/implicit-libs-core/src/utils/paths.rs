//! Workspace-relative path helpers.
//!
//! Workspace paths are always handled as `/`-separated strings so that
//! project names, cache inputs and aliases are identical on every platform.

use std::path::{Component, Path};

/// Converts a path to a `/`-separated string.
///
/// # Example
///
/// ```ignore
/// assert_eq!(to_slash(Path::new("libs/web/ui")), "libs/web/ui");
/// ```
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::RootDir => Some(String::new()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalizes a workspace-relative path string.
///
/// Backslashes become `/`, and leading `./` as well as trailing `/` are
/// removed.
#[must_use]
pub fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut path = path.as_str();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.trim_end_matches('/').to_string()
}

/// Returns the directory part of a `/`-separated path, or `.` if there is none.
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent,
        _ => ".",
    }
}

/// Returns the leading segments of a glob that contain no wildcard.
///
/// `libs/**/index.ts` yields `libs`; `**/index.ts` yields an empty string.
#[must_use]
pub fn literal_prefix(pattern: &str) -> String {
    pattern
        .split('/')
        .take_while(|segment| !segment.contains(['*', '?', '[', '{']))
        .collect::<Vec<_>>()
        .join("/")
}
