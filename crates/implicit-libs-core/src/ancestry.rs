//! Nested project detection.
//!
//! A marker file inside a folder that already sits below another marker
//! belongs to the outer project, not to a project of its own.

use std::path::Path;

use tracing::debug;

use crate::probe::{self, ProbeError};

/// Detects whether a project directory lives inside another project.
#[derive(Debug, Clone)]
pub struct AncestryGuard {
    marker: String,
}

impl AncestryGuard {
    /// Creates a guard looking for `marker` (e.g. `index.ts`) in ancestors.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Marker file name this guard probes for.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns true if any ancestor of `project_dir` contains the marker.
    ///
    /// The walk starts at the parent of `project_dir` and stops at the
    /// filesystem root. The directory itself is not probed.
    ///
    /// # Errors
    ///
    /// Returns an error if a probe fails for a reason other than absence.
    pub async fn is_nested(&self, project_dir: &Path) -> Result<bool, ProbeError> {
        let mut current = project_dir.parent();

        while let Some(dir) = current {
            let candidate = dir.join(&self.marker);
            if probe::exists(&candidate).await? {
                debug!(
                    "{} is nested in project at {}",
                    project_dir.display(),
                    dir.display()
                );
                return Ok(true);
            }
            current = dir.parent();
        }

        Ok(false)
    }
}
