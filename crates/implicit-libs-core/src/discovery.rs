//! Candidate marker file discovery.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::utils::paths::{literal_prefix, to_slash};

/// Errors during candidate discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// Scan pattern could not be compiled.
    #[error("Invalid scan pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Directory traversal failed.
    #[error("Failed to walk workspace: {0}")]
    Walk(#[from] ignore::Error),
}

/// Lists files under `root` whose workspace-relative path matches `scan_pattern`.
///
/// Only the literal prefix of the pattern (e.g. `libs` for
/// `libs/**/index.ts`) is traversed, and `.gitignore` rules are honored.
/// Returned paths are `/`-separated, relative to `root`, and sorted.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or traversal fails.
pub fn discover_markers(root: &Path, scan_pattern: &str) -> Result<Vec<String>, DiscoveryError> {
    let pattern = Pattern::new(scan_pattern)?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let walk_root = root.join(literal_prefix(scan_pattern));
    if !walk_root.is_dir() {
        debug!("Nothing to scan at {}", walk_root.display());
        return Ok(Vec::new());
    }

    let mut builder = ignore::WalkBuilder::new(&walk_root);
    builder.hidden(false).git_ignore(true);

    let mut markers = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let relative = to_slash(entry.path().strip_prefix(root).unwrap_or(entry.path()));
        if pattern.matches_with(&relative, options) {
            markers.push(relative);
        }
    }

    markers.sort();
    debug!("Discovered {} candidate(s) for {}", markers.len(), scan_pattern);
    Ok(markers)
}
