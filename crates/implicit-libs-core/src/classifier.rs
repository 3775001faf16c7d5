//! Project path classification.
//!
//! A library lives at `<root>/<platform>/<scope>/<name>-<type>`. The last
//! folder is split on `-`: the trailing token is the [`ProjectType`] and the
//! remaining tokens, if any, form the library name.

use miette::Diagnostic;

use crate::types::{ProjectIdentity, ProjectType};

/// `<root>/<platform>/<scope>/<nameAndType>`
const EXPECTED_SEGMENTS: usize = 4;

/// Reasons a project directory does not follow the naming convention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Diagnostic)]
pub enum ClassifyError {
    /// Path is too shallow, too deep, or has empty segments.
    #[error(
        "Invalid project path {path}: expected 4 segments \
         (<root>/<platform>/<scope>/<name>-<type>), found {segments}. \
         Last folder should end with one of the allowed types: {}",
        ProjectType::allowed_list()
    )]
    #[diagnostic(
        code(implicit_libs::invalid_path_shape),
        help("libraries must live exactly three levels below the scan root")
    )]
    InvalidPathShape {
        /// Offending project directory.
        path: String,
        /// Number of segments found.
        segments: usize,
    },

    /// Last folder does not end with an allowed type.
    #[error(
        "Invalid project path {path}. Last folder should end with one of the allowed types: {allowed}"
    )]
    #[diagnostic(
        code(implicit_libs::invalid_project_type),
        help("rename the folder to `<name>-<type>` or `<type>`, e.g. `search-ui`")
    )]
    InvalidProjectType {
        /// Offending project directory.
        path: String,
        /// Trailing token that was rejected.
        found: String,
        /// Allowed types, comma-separated.
        allowed: String,
    },
}

impl ClassifyError {
    /// Project directory the error refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidPathShape { path, .. } | Self::InvalidProjectType { path, .. } => path,
        }
    }
}

/// Derives platform, scope, type and optional name from a project directory.
///
/// `project_path` is relative to the scan root and `/`-separated, e.g.
/// `libs/web/catalog/search-ui`.
///
/// # Errors
///
/// Returns [`ClassifyError::InvalidPathShape`] unless the path has exactly
/// four non-empty segments, and [`ClassifyError::InvalidProjectType`] if the
/// last folder does not end with an allowed type.
pub fn classify(project_path: &str) -> Result<ProjectIdentity, ClassifyError> {
    let segments: Vec<&str> = project_path.split('/').collect();

    if segments.len() != EXPECTED_SEGMENTS || segments.iter().any(|s| s.is_empty()) {
        return Err(ClassifyError::InvalidPathShape {
            path: project_path.to_string(),
            segments: segments.len(),
        });
    }

    let (platform, scope, name_and_type) = (segments[1], segments[2], segments[3]);

    let (name, type_token) = match name_and_type.rsplit_once('-') {
        Some((name, type_token)) => (Some(name), type_token),
        None => (None, name_and_type),
    };

    let project_type =
        type_token
            .parse::<ProjectType>()
            .map_err(|e| ClassifyError::InvalidProjectType {
                path: project_path.to_string(),
                found: e.value,
                allowed: ProjectType::allowed_list(),
            })?;

    Ok(ProjectIdentity {
        platform: platform.to_string(),
        scope: scope.to_string(),
        project_type,
        name: name.filter(|n| !n.is_empty()).map(String::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_platform_scope_name_and_type() {
        let identity = classify("libs/web/catalog/search-ui").unwrap();
        assert_eq!(
            identity,
            ProjectIdentity {
                platform: "web".into(),
                scope: "catalog".into(),
                project_type: ProjectType::Ui,
                name: Some("search".into()),
            }
        );
    }

    #[test]
    fn name_is_absent_without_hyphen() {
        for t in ProjectType::ALL {
            let identity = classify(&format!("libs/web/catalog/{t}")).unwrap();
            assert_eq!(identity.name, None);
            assert_eq!(identity.project_type, t);
        }
    }

    #[test]
    fn keeps_every_token_but_the_last_in_name() {
        let identity = classify("libs/web/catalog/x-y-ui").unwrap();
        assert_eq!(identity.name.as_deref(), Some("x-y"));
        assert_eq!(identity.project_type, ProjectType::Ui);

        let identity = classify("libs/mobile/cart/my-lib-domain").unwrap();
        assert_eq!(identity.name.as_deref(), Some("my-lib"));
        assert_eq!(identity.project_type, ProjectType::Domain);
    }

    #[test]
    fn rejects_shallow_paths() {
        for path in ["libs/my-lib", "libs/web/my-lib"] {
            let err = classify(path).unwrap_err();
            assert!(matches!(err, ClassifyError::InvalidPathShape { .. }), "{path}");
            assert!(err.to_string().contains("Invalid project path"));
            assert!(err.to_string().contains(&ProjectType::allowed_list()));
        }
    }

    #[test]
    fn rejects_deep_paths() {
        let err = classify("libs/too-deep/web/catalog/search-ui").unwrap_err();
        assert_eq!(
            err,
            ClassifyError::InvalidPathShape {
                path: "libs/too-deep/web/catalog/search-ui".into(),
                segments: 5,
            }
        );
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(matches!(
            classify("libs//catalog/ui"),
            Err(ClassifyError::InvalidPathShape { .. })
        ));
        assert!(matches!(
            classify("libs/web/catalog/ui/"),
            Err(ClassifyError::InvalidPathShape { .. })
        ));
    }

    #[test]
    fn rejects_unknown_type() {
        let err = classify("libs/web/catalog/search").unwrap_err();
        assert_eq!(err.path(), "libs/web/catalog/search");
        let message = err.to_string();
        assert!(message.contains("libs/web/catalog/search"));
        assert!(message.contains("domain, feature, infra, model, ui, utils"));
    }

    #[test]
    fn rejects_unknown_trailing_token_after_hyphen() {
        let err = classify("libs/web/catalog/search-util").unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InvalidProjectType { ref found, .. } if found == "util"
        ));
    }

    #[test]
    fn empty_name_token_is_treated_as_absent() {
        let identity = classify("libs/web/catalog/-ui").unwrap();
        assert_eq!(identity.name, None);
        assert_eq!(identity.project_name(), "web-catalog-ui");
    }

    #[test]
    fn errors_carry_diagnostic_codes() {
        let err = classify("libs/web").unwrap_err();
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("implicit_libs::invalid_path_shape"));
        assert!(err.help().is_some());
    }
}
