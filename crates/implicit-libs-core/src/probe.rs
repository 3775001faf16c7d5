//! Filesystem probes shared by the inference engine.

use std::path::{Path, PathBuf};

/// Environment failures while probing the filesystem.
///
/// "Not found" is never reported through this type; it is a normal answer.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// A metadata lookup failed for a reason other than absence.
    #[error("failed to probe {path}: {source}")]
    Io {
        /// Path being probed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Glob pattern could not be compiled.
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Underlying pattern error.
        source: glob::PatternError,
    },

    /// A directory could not be read while matching a glob.
    #[error("failed to read {}: {}", .0.path().display(), .0.error())]
    Glob(#[from] glob::GlobError),
}

/// Returns true as soon as one path matches `pattern`.
///
/// Matches are enumerated lazily, so the cost does not grow with the number
/// of matching files.
///
/// # Errors
///
/// Returns an error if the pattern is invalid or a directory cannot be read
/// before the first match is found.
pub fn has_file_matching(pattern: &str) -> Result<bool, ProbeError> {
    let mut paths = glob::glob(pattern).map_err(|source| ProbeError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    match paths.next() {
        Some(Ok(_)) => Ok(true),
        Some(Err(e)) => Err(ProbeError::Glob(e)),
        None => Ok(false),
    }
}

/// Builds a glob rooted at `dir`, escaping any glob metacharacters in it.
#[must_use]
pub fn glob_under(dir: &Path, relative_pattern: &str) -> String {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    format!("{}/{}", escaped.trim_end_matches('/'), relative_pattern)
}

/// Returns whether `path` exists.
///
/// # Errors
///
/// Returns an error for any IO failure other than `NotFound`.
pub async fn exists(path: &Path) -> Result<bool, ProbeError> {
    match tokio::fs::metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(ProbeError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
