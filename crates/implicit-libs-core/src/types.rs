//! Core types for inferred projects, targets and inference results.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Library type, encoded as the trailing `-` token of a project folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    /// Business logic, state and use cases.
    Domain,
    /// Smart components wiring UI to domain.
    Feature,
    /// Adapters to the outside world (HTTP, storage, ...).
    Infra,
    /// Plain data structures and types.
    Model,
    /// Presentational components.
    Ui,
    /// Framework-agnostic helpers.
    Utils,
}

impl ProjectType {
    /// Every allowed type, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Domain,
        Self::Feature,
        Self::Infra,
        Self::Model,
        Self::Ui,
        Self::Utils,
    ];

    /// Returns the folder suffix for this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Feature => "feature",
            Self::Infra => "infra",
            Self::Model => "model",
            Self::Ui => "ui",
            Self::Utils => "utils",
        }
    }

    /// Comma-separated list of allowed types, used in diagnostics.
    #[must_use]
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not an allowed [`ProjectType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown project type `{value}`, expected one of: {}", ProjectType::allowed_list())]
pub struct UnknownProjectType {
    /// The rejected value.
    pub value: String,
}

impl FromStr for ProjectType {
    type Err = UnknownProjectType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownProjectType {
                value: s.to_string(),
            })
    }
}

/// Identity derived from a project directory path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    /// Second path segment (e.g. `web`).
    pub platform: String,
    /// Third path segment (e.g. `catalog`).
    pub scope: String,
    /// Trailing token of the last segment.
    pub project_type: ProjectType,
    /// Remaining tokens of the last segment, if any.
    pub name: Option<String>,
}

impl ProjectIdentity {
    /// `<name>-<type>`, or `<type>` alone when there is no name.
    #[must_use]
    pub fn composite_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{name}-{}", self.project_type),
            None => self.project_type.to_string(),
        }
    }

    /// Full external project name: `<platform>-<scope>-<composite>`.
    #[must_use]
    pub fn project_name(&self) -> String {
        format!("{}-{}-{}", self.platform, self.scope, self.composite_name())
    }

    /// Classification tags attached to the project.
    #[must_use]
    pub fn tags(&self) -> Vec<ProjectTag> {
        vec![
            ProjectTag::Platform(self.platform.clone()),
            ProjectTag::Scope(self.scope.clone()),
            ProjectTag::Type(self.project_type),
        ]
    }
}

/// A classification tag such as `scope:catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectTag {
    /// `platform:<platform>`
    Platform(String),
    /// `scope:<scope>`
    Scope(String),
    /// `type:<type>`
    Type(ProjectType),
}

impl std::fmt::Display for ProjectTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Platform(p) => write!(f, "platform:{p}"),
            Self::Scope(s) => write!(f, "scope:{s}"),
            Self::Type(t) => write!(f, "type:{t}"),
        }
    }
}

impl Serialize for ProjectTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One entry of a target's cache inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TargetInput {
    /// Named input or file glob, e.g. `default` or `{workspaceRoot}/eslint.config.js`.
    FileSet(String),
    /// Versions of external packages that affect the result.
    ExternalDependencies {
        /// Package names.
        #[serde(rename = "externalDependencies")]
        external_dependencies: Vec<String>,
    },
    /// Environment variable that affects the result.
    Env {
        /// Variable name.
        env: String,
    },
}

impl TargetInput {
    /// Creates a file-set input.
    #[must_use]
    pub fn file_set(value: impl Into<String>) -> Self {
        Self::FileSet(value.into())
    }

    /// Creates an external dependency input for a single package.
    #[must_use]
    pub fn external_dependency(package: impl Into<String>) -> Self {
        Self::ExternalDependencies {
            external_dependencies: vec![package.into()],
        }
    }

    /// Creates an environment variable input.
    #[must_use]
    pub fn env(name: impl Into<String>) -> Self {
        Self::Env { env: name.into() }
    }
}

/// Options passed to the command runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOptions {
    /// Working directory, relative to the workspace root.
    pub cwd: String,
    /// Tool root directory, relative to `cwd`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    /// File the tool writes its report to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Informational metadata about a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetMetadata {
    /// Tools involved in running the target.
    pub technologies: Vec<String>,
}

/// Declarative description of a cacheable target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
    /// Shell command to run.
    pub command: String,
    /// Runner options.
    pub options: TargetOptions,
    /// Informational metadata.
    pub metadata: TargetMetadata,
    /// Whether results may be cached.
    pub cache: bool,
    /// Ordered cache inputs; order is part of the cache key.
    pub inputs: Vec<TargetInput>,
    /// Ordered cache outputs.
    pub outputs: Vec<String>,
}

/// Kind of an inferred project. Inference only yields libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// Reusable code.
    Library,
}

/// Project description produced for one project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// External project name, e.g. `web-catalog-search-ui`.
    pub name: String,
    /// Always [`ProjectKind::Library`].
    pub project_type: ProjectKind,
    /// Classification tags.
    pub tags: Vec<ProjectTag>,
    /// Targets by name. `test` is absent when the project has no tests.
    pub targets: BTreeMap<String, TargetDescriptor>,
}

/// Projects contributed by a single marker file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferredNodes {
    /// Project descriptors keyed by project directory.
    pub projects: BTreeMap<String, ProjectDescriptor>,
}

/// Advisory diagnostic for a candidate that could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceWarning {
    /// Marker file path of the skipped candidate.
    pub path: String,
    /// Human-readable reason.
    pub message: String,
    /// Optional hint on how to fix it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl std::fmt::Display for InferenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Result of an inference batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferenceReport {
    /// Inferred nodes keyed by marker file path.
    pub results: BTreeMap<String, InferredNodes>,
    /// Candidates skipped because they failed validation, sorted by path.
    pub warnings: Vec<InferenceWarning>,
}

impl InferenceReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over every inferred project as `(project_dir, descriptor)`.
    pub fn projects(&self) -> impl Iterator<Item = (&str, &ProjectDescriptor)> {
        self.results
            .values()
            .flat_map(|nodes| nodes.projects.iter())
            .map(|(dir, project)| (dir.as_str(), project))
    }

    /// Number of inferred projects.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects().count()
    }

    /// Returns true if any candidate was skipped with a warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
