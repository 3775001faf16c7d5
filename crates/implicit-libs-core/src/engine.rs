//! Batch project inference.

use crate::ancestry::AncestryGuard;
use crate::classifier::classify;
use crate::config::Config;
use crate::discovery::{self, DiscoveryError};
use crate::probe::{self, ProbeError};
use crate::targets::TargetSynthesizer;
use crate::types::{
    InferenceReport, InferenceWarning, InferredNodes, ProjectDescriptor, ProjectKind,
};
use crate::utils::paths::{normalize, parent_dir};

use miette::Diagnostic;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors that abort an inference batch.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// IO error while setting up the engine.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Workspace root does not exist or cannot be resolved.
    #[error("Invalid workspace root {path}: {source}")]
    Root {
        /// Root as given to the builder, made absolute.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A filesystem probe failed for one candidate.
    #[error("Failed to probe candidate {path}: {source}")]
    Probe {
        /// Marker path of the failing candidate.
        path: String,
        /// Underlying probe error.
        source: ProbeError,
    },

    /// Candidate discovery failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A worker task panicked or was cancelled.
    #[error("Inference task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Builder for configuring an [`InferenceEngine`].
#[derive(Default)]
pub struct InferenceEngineBuilder {
    root: Option<PathBuf>,
    config: Option<Config>,
    parallelism: Option<usize>,
    output_file: Option<String>,
}

impl InferenceEngineBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the workspace root candidates are relative to.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the maximum number of candidates evaluated at once.
    #[must_use]
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Sets the linter report file, forwarded as the lint `outputFile` option.
    #[must_use]
    pub fn output_file(mut self, output_file: impl Into<String>) -> Self {
        self.output_file = Some(output_file.into());
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined for a
    /// relative root, or if the root cannot be resolved to a real path.
    pub fn build(self) -> Result<InferenceEngine, InferenceError> {
        let config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        // Ancestry probes walk `Path::parent`, which is lexical.
        let root = std::fs::canonicalize(&root).map_err(|source| InferenceError::Root {
            path: root.clone(),
            source,
        })?;

        let parallelism = self
            .parallelism
            .or(config.engine.parallelism)
            .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, NonZeroUsize::get))
            .max(1);

        let synthesizer = TargetSynthesizer::new(config.lint.clone(), config.test.clone())
            .with_output_file(self.output_file);

        Ok(InferenceEngine {
            context: Arc::new(EngineContext {
                root,
                guard: AncestryGuard::new(config.scan.marker.clone()),
                synthesizer,
            }),
            scan_pattern: config.scan.pattern,
            parallelism,
        })
    }
}

/// Infers library projects from marker file paths.
///
/// Use [`InferenceEngine::builder()`] to construct an instance.
pub struct InferenceEngine {
    context: Arc<EngineContext>,
    scan_pattern: String,
    parallelism: usize,
}

/// Read-only state shared by every candidate evaluation.
struct EngineContext {
    root: PathBuf,
    guard: AncestryGuard,
    synthesizer: TargetSynthesizer,
}

/// What happened to a single candidate.
enum Outcome {
    Inferred {
        marker_path: String,
        project_path: String,
        project: ProjectDescriptor,
    },
    Nested,
    Invalid(InferenceWarning),
}

impl InferenceEngine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> InferenceEngineBuilder {
        InferenceEngineBuilder::new()
    }

    /// Returns the workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.context.root
    }

    /// Returns the maximum number of concurrent evaluations.
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Discovers candidates with the configured scan pattern and infers them.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery or any probe fails.
    pub async fn infer_workspace(&self) -> Result<InferenceReport, InferenceError> {
        let root = self.context.root.clone();
        let pattern = self.scan_pattern.clone();
        let candidates =
            tokio::task::spawn_blocking(move || discovery::discover_markers(&root, &pattern))
                .await??;

        info!("Found {} candidate(s) matching {}", candidates.len(), self.scan_pattern);
        self.infer_all(candidates.as_slice()).await
    }

    /// Infers projects for a batch of marker file paths relative to the root.
    ///
    /// Nested candidates are skipped silently, invalid ones are skipped with a
    /// warning. The report does not depend on the order of `candidates`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the failing candidate if a filesystem probe
    /// fails; no partial report is returned in that case.
    pub async fn infer_all<S: AsRef<str>>(
        &self,
        candidates: &[S],
    ) -> Result<InferenceReport, InferenceError> {
        let mut report = InferenceReport::new();
        let mut tasks = JoinSet::new();

        for candidate in candidates {
            if tasks.len() >= self.parallelism {
                if let Some(joined) = tasks.join_next().await {
                    collect(&mut report, joined??);
                }
            }

            let context = Arc::clone(&self.context);
            let marker_path = normalize(candidate.as_ref());
            tasks.spawn(async move { context.evaluate(marker_path).await });
        }

        while let Some(joined) = tasks.join_next().await {
            collect(&mut report, joined??);
        }

        report.warnings.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            "Inference complete: {} project(s), {} warning(s) from {} candidate(s)",
            report.project_count(),
            report.warnings.len(),
            candidates.len()
        );

        Ok(report)
    }
}

fn collect(report: &mut InferenceReport, outcome: Outcome) {
    match outcome {
        Outcome::Inferred {
            marker_path,
            project_path,
            project,
        } => {
            report.results.insert(
                marker_path,
                InferredNodes {
                    projects: BTreeMap::from([(project_path, project)]),
                },
            );
        }
        Outcome::Nested => {}
        Outcome::Invalid(warning) => report.warnings.push(warning),
    }
}

impl EngineContext {
    async fn evaluate(&self, marker_path: String) -> Result<Outcome, InferenceError> {
        let project_path = parent_dir(&marker_path).to_string();
        let project_root = self.root.join(&project_path);

        let nested = self
            .guard
            .is_nested(&project_root)
            .await
            .map_err(|source| InferenceError::Probe {
                path: marker_path.clone(),
                source,
            })?;
        if nested {
            debug!(
                "Skipping nested candidate {}: an ancestor holds {}",
                marker_path,
                self.guard.marker()
            );
            return Ok(Outcome::Nested);
        }

        let identity = match classify(&project_path) {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Skipping {}: {}", marker_path, e);
                return Ok(Outcome::Invalid(InferenceWarning {
                    path: marker_path,
                    message: e.to_string(),
                    help: e.help().map(|h| h.to_string()),
                }));
            }
        };

        let pattern = probe::glob_under(&project_root, self.synthesizer.test_pattern());
        let has_tests = tokio::task::spawn_blocking(move || probe::has_file_matching(&pattern))
            .await?
            .map_err(|source| InferenceError::Probe {
                path: marker_path.clone(),
                source,
            })?;

        let mut targets = BTreeMap::new();
        targets.insert(
            "lint".to_string(),
            self.synthesizer.lint_target(&project_path),
        );
        if has_tests {
            targets.insert(
                "test".to_string(),
                self.synthesizer.test_target(&project_path),
            );
        }

        debug!(
            "Inferred {} at {} (tests: {})",
            identity.project_name(),
            project_path,
            has_tests
        );

        Ok(Outcome::Inferred {
            marker_path,
            project_path,
            project: ProjectDescriptor {
                name: identity.project_name(),
                project_type: ProjectKind::Library,
                tags: identity.tags(),
                targets,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Workspace {
        dir: TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn with_library() -> Self {
            let ws = Self::new();
            ws.write_empty("libs/web/catalog/search-ui/index.ts");
            ws
        }

        fn write_empty(&self, relative: &str) {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        fn engine(&self) -> InferenceEngine {
            InferenceEngine::builder()
                .root(self.dir.path())
                .build()
                .unwrap()
        }
    }

    #[tokio::test]
    async fn infers_project_info_from_path() {
        let ws = Workspace::with_library();
        let report = ws
            .engine()
            .infer_all(&["libs/web/catalog/search-ui/index.ts"])
            .await
            .unwrap();

        assert_eq!(report.results.len(), 1);
        let nodes = &report.results["libs/web/catalog/search-ui/index.ts"];
        let project = &nodes.projects["libs/web/catalog/search-ui"];
        assert_eq!(project.name, "web-catalog-search-ui");
        assert_eq!(project.project_type, ProjectKind::Library);
        let tags: Vec<String> = project.tags.iter().map(ToString::to_string).collect();
        assert_eq!(tags, ["platform:web", "scope:catalog", "type:ui"]);
    }

    #[tokio::test]
    async fn infers_name_without_name_token() {
        let ws = Workspace::new();
        ws.write_empty("libs/web/catalog/ui/index.ts");

        let report = ws
            .engine()
            .infer_all(&["libs/web/catalog/ui/index.ts"])
            .await
            .unwrap();
        let (_, project) = report.projects().next().unwrap();
        assert_eq!(project.name, "web-catalog-ui");
    }

    #[tokio::test]
    async fn skips_candidates_nested_in_another_project() {
        let ws = Workspace::with_library();
        ws.write_empty("libs/web/catalog/index.ts");

        let report = ws
            .engine()
            .infer_all(&["libs/web/catalog/search-ui/index.ts"])
            .await
            .unwrap();
        assert!(report.results.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn invalid_candidates_become_warnings() {
        let ws = Workspace::with_library();
        ws.write_empty("libs/web/catalog/search/index.ts");

        let report = ws
            .engine()
            .infer_all(&[
                "libs/web/catalog/search/index.ts",
                "libs/web/catalog/search-ui/index.ts",
            ])
            .await
            .unwrap();

        assert_eq!(report.project_count(), 1);
        assert_eq!(report.warnings.len(), 1);
        let warning = &report.warnings[0];
        assert_eq!(warning.path, "libs/web/catalog/search/index.ts");
        assert!(warning.message.contains("libs/web/catalog/search"));
        assert!(warning.message.contains("domain, feature, infra, model, ui, utils"));
        assert!(warning.help.is_some());
    }

    #[tokio::test]
    async fn lint_target_is_always_present() {
        let ws = Workspace::with_library();
        let report = ws
            .engine()
            .infer_all(&["libs/web/catalog/search-ui/index.ts"])
            .await
            .unwrap();

        let (_, project) = report.projects().next().unwrap();
        let lint = &project.targets["lint"];
        assert_eq!(lint.command, "eslint .");
        assert_eq!(lint.options.cwd, "libs/web/catalog/search-ui");
        assert!(lint.cache);
    }

    #[tokio::test]
    async fn test_target_only_when_tests_exist() {
        let ws = Workspace::with_library();
        let engine = ws.engine();
        let candidates = ["libs/web/catalog/search-ui/index.ts"];

        let report = engine.infer_all(&candidates).await.unwrap();
        let (_, project) = report.projects().next().unwrap();
        assert!(!project.targets.contains_key("test"));

        ws.write_empty("libs/web/catalog/search-ui/src/search.spec.ts");
        let report = engine.infer_all(&candidates).await.unwrap();
        let (_, project) = report.projects().next().unwrap();
        let test = &project.targets["test"];
        assert_eq!(test.command, "vitest");
        assert_eq!(
            test.outputs,
            ["{workspaceRoot}/coverage/libs/web/catalog/search-ui"]
        );
    }

    #[tokio::test]
    async fn output_is_independent_of_candidate_order() {
        let ws = Workspace::new();
        let candidates = [
            "libs/web/cart/ui/index.ts",
            "libs/web/catalog/search-ui/index.ts",
            "libs/web/catalog/bad/index.ts",
            "libs/mobile/cart/data-access-infra/index.ts",
            "libs/web/too/deep/here-ui/index.ts",
        ];
        for c in candidates {
            ws.write_empty(c);
        }
        ws.write_empty("libs/web/cart/ui/ui.spec.ts");

        let engine = InferenceEngine::builder()
            .root(ws.dir.path())
            .parallelism(2)
            .build()
            .unwrap();
        let forward = engine.infer_all(&candidates).await.unwrap();
        let mut reversed = candidates;
        reversed.reverse();
        let backward = engine.infer_all(&reversed).await.unwrap();

        assert_eq!(forward, backward);
        assert_eq!(
            serde_json::to_string(&forward).unwrap(),
            serde_json::to_string(&backward).unwrap()
        );
        assert_eq!(forward.project_count(), 3);
        assert_eq!(forward.warnings.len(), 2);
    }

    #[tokio::test]
    async fn probe_failure_names_the_candidate() {
        let ws = Workspace::new();
        ws.write_empty("libs/web");

        let err = ws
            .engine()
            .infer_all(&["libs/web/catalog/ui/index.ts"])
            .await
            .unwrap_err();
        match err {
            InferenceError::Probe { path, .. } => assert_eq!(path, "libs/web/catalog/ui/index.ts"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn infer_workspace_uses_scan_pattern() {
        let ws = Workspace::with_library();
        ws.write_empty("apps/web/catalog/search-ui/index.ts");

        let report = ws.engine().infer_workspace().await.unwrap();
        let markers: Vec<&String> = report.results.keys().collect();
        assert_eq!(markers, ["libs/web/catalog/search-ui/index.ts"]);
    }

    fn two_libraries() -> Workspace {
        let ws = Workspace::with_library();
        ws.write_empty("libs/web/cart/ui/index.ts");
        ws
    }

    async fn infer_from(root: &Path) -> InferenceReport {
        InferenceEngine::builder()
            .root(root)
            .build()
            .unwrap()
            .infer_workspace()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn root_with_parent_components_matches_absolute_root() {
        let ws = two_libraries();
        let expected = infer_from(ws.dir.path()).await;
        assert_eq!(expected.project_count(), 2);

        // Lexical parents of this root include search-ui, which holds a marker.
        let winding = ws.dir.path().join("libs/web/catalog/search-ui/../../../..");
        let report = infer_from(&winding).await;

        assert_eq!(report, expected);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn relative_root_matches_absolute_root() {
        let ws = two_libraries();
        let expected = infer_from(ws.dir.path()).await;

        let cwd = std::env::current_dir().unwrap();
        let mut relative = PathBuf::new();
        for _ in cwd.components().skip(1) {
            relative.push("..");
        }
        let relative = relative.join(ws.dir.path().strip_prefix("/").unwrap());
        assert!(relative.is_relative());

        let engine = InferenceEngine::builder().root(&relative).build().unwrap();
        assert_eq!(engine.root(), ws.dir.path().canonicalize().unwrap());
        assert_eq!(engine.infer_workspace().await.unwrap(), expected);
    }

    #[test]
    fn missing_root_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nowhere");

        let err = InferenceEngine::builder()
            .root(&missing)
            .build()
            .err()
            .unwrap();
        match err {
            InferenceError::Root { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn builder_resolves_parallelism() {
        let engine = InferenceEngine::builder().root("/").build().unwrap();
        assert!(engine.parallelism() >= 1);

        let engine = InferenceEngine::builder()
            .root("/")
            .parallelism(0)
            .build()
            .unwrap();
        assert_eq!(engine.parallelism(), 1);

        let mut config = Config::default();
        config.engine.parallelism = Some(3);
        let engine = InferenceEngine::builder()
            .root("/")
            .config(config)
            .build()
            .unwrap();
        assert_eq!(engine.parallelism(), 3);
    }
}
