//! Import alias synchronization.
//!
//! Every library known to a [`ProjectGraph`] gets an alias
//! `<namespace>/<project name>` in the `compilerOptions.paths` map of the
//! base tsconfig, pointing at the library's entry file. The namespace is the
//! scope of the root `package.json` name (`@acme` for `@acme/root`).
//!
//! Existing aliases with the same key are overwritten, every other key of
//! the document is kept as is.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::PathsConfig;
use crate::types::InferenceReport;
use crate::utils::paths::normalize;

/// Errors while reading a project graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Graph file could not be read.
    #[error("Failed to read project graph {path}: {source}")]
    Io {
        /// Graph file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Graph file is not a valid exported graph.
    #[error("Failed to parse project graph: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors while synchronizing aliases. All of them leave the document on
/// disk untouched.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SyncError {
    /// `package.json` has no string `name`.
    #[error("Package manifest has no `name`; cannot derive the alias namespace")]
    #[diagnostic(
        code(implicit_libs::missing_package_name),
        help("add a scoped name such as \"@acme/source\" to the root package.json")
    )]
    MissingPackageName,

    /// Part of the document is not a JSON object.
    #[error("Invalid document: `{location}` must be a JSON object")]
    #[diagnostic(code(implicit_libs::invalid_document))]
    InvalidDocument {
        /// Which part of the document is malformed.
        location: &'static str,
    },

    /// File could not be read or written.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// File is not valid JSON.
    #[error("Failed to parse {path} as JSON: {source}")]
    Json {
        /// File path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Project graph could not be loaded.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Kind of a project in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Application.
    App,
    /// Library; the only kind that receives an alias.
    Lib,
    /// End-to-end test project.
    E2e,
}

/// A project as seen by the alias synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// Project name, e.g. `web-cart-ui`.
    pub name: String,
    /// Project directory relative to the workspace root.
    pub project_root: String,
    /// Project kind.
    pub kind: NodeKind,
}

impl GraphNode {
    /// Creates a library node.
    #[must_use]
    pub fn library(name: impl Into<String>, project_root: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_root: project_root.into(),
            kind: NodeKind::Lib,
        }
    }
}

/// Source of workspace projects.
pub trait ProjectGraph {
    /// Returns every project node of the workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph cannot be loaded.
    fn nodes(&self) -> Result<Vec<GraphNode>, GraphError>;
}

/// In-memory graph.
#[derive(Debug, Clone, Default)]
pub struct StaticGraph {
    nodes: Vec<GraphNode>,
}

impl StaticGraph {
    /// Creates a graph from a list of nodes.
    #[must_use]
    pub fn new(nodes: Vec<GraphNode>) -> Self {
        Self { nodes }
    }

    /// Builds a graph where every inferred project is a library.
    #[must_use]
    pub fn from_report(report: &InferenceReport) -> Self {
        let nodes = report
            .projects()
            .map(|(root, project)| GraphNode::library(project.name.clone(), root))
            .collect();
        Self { nodes }
    }
}

impl ProjectGraph for StaticGraph {
    fn nodes(&self) -> Result<Vec<GraphNode>, GraphError> {
        Ok(self.nodes.clone())
    }
}

/// Graph exported as JSON (`{"graph": {"nodes": {...}}}`).
#[derive(Debug, Clone)]
pub struct GraphFile {
    path: PathBuf,
}

#[derive(Deserialize)]
struct ExportedGraph {
    graph: ExportedNodes,
}

#[derive(Deserialize)]
struct ExportedNodes {
    nodes: BTreeMap<String, ExportedNode>,
}

#[derive(Deserialize)]
struct ExportedNode {
    name: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    data: ExportedNodeData,
}

#[derive(Deserialize)]
struct ExportedNodeData {
    root: String,
}

impl GraphFile {
    /// Creates a graph backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses an exported graph document.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` does not have the exported graph shape.
    pub fn parse(content: &str) -> Result<Vec<GraphNode>, GraphError> {
        let exported: ExportedGraph = serde_json::from_str(content)?;
        Ok(exported
            .graph
            .nodes
            .into_values()
            .map(|node| GraphNode {
                name: node.name,
                project_root: node.data.root,
                kind: node.kind,
            })
            .collect())
    }
}

impl ProjectGraph for GraphFile {
    fn nodes(&self) -> Result<Vec<GraphNode>, GraphError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| GraphError::Io {
            path: self.path.clone(),
            source,
        })?;
        Self::parse(&content)
    }
}

/// Where aliases are read from and written to.
#[derive(Debug, Clone)]
pub struct AliasSettings {
    /// Base tsconfig path relative to the workspace root.
    pub tsconfig: PathBuf,
    /// Root package manifest path relative to the workspace root.
    pub package_json: PathBuf,
    /// Extension of the library entry file.
    pub extension: String,
    /// Compute the summary without writing the document.
    pub dry_run: bool,
}

impl Default for AliasSettings {
    fn default() -> Self {
        Self::from(&PathsConfig::default())
    }
}

impl From<&PathsConfig> for AliasSettings {
    fn from(config: &PathsConfig) -> Self {
        Self {
            tsconfig: config.tsconfig.clone(),
            package_json: config.package_json.clone(),
            extension: config.extension.clone(),
            dry_run: false,
        }
    }
}

impl AliasSettings {
    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Outcome of an alias synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Aliases that did not exist before.
    pub added: usize,
    /// Aliases whose target changed.
    pub updated: usize,
    /// Aliases already up to date.
    pub unchanged: usize,
    /// Whether the document was written back.
    pub written: bool,
}

impl SyncSummary {
    /// Returns true if any alias was added or updated.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.added + self.updated > 0
    }
}

/// Merges one alias per library of `graph` into `tsconfig`.
///
/// `tsconfig` is only modified once the namespace and the graph have been
/// resolved and the document shape has been checked.
///
/// # Errors
///
/// Returns [`SyncError::MissingPackageName`] if `package_json` has no string
/// `name`, [`SyncError::InvalidDocument`] if `tsconfig`, its
/// `compilerOptions` or its `paths` is not an object, and
/// [`SyncError::Graph`] if the graph cannot be loaded.
pub fn sync_paths(
    graph: &dyn ProjectGraph,
    package_json: &Value,
    tsconfig: &mut Value,
    settings: &AliasSettings,
) -> Result<SyncSummary, SyncError> {
    let namespace = namespace(package_json)?;
    let aliases = library_aliases(&graph.nodes()?, namespace, &settings.extension);

    check_shape(tsconfig)?;
    let paths = paths_object(tsconfig)?;

    let mut summary = SyncSummary::default();
    for (alias, target) in aliases {
        let target = Value::from(vec![target]);
        match paths.get(&alias) {
            None => summary.added += 1,
            Some(existing) if *existing == target => summary.unchanged += 1,
            Some(_) => summary.updated += 1,
        }
        debug!("Alias {} -> {}", alias, target);
        paths.insert(alias, target);
    }

    Ok(summary)
}

/// Reads the package manifest and base tsconfig under `root`, merges the
/// aliases and writes the tsconfig back unless `settings.dry_run` is set.
///
/// # Errors
///
/// Returns an error if a file cannot be read, parsed or written, or if
/// [`sync_paths`] fails. The tsconfig is not written on error.
pub fn sync_tsconfig_paths(
    root: &Path,
    graph: &dyn ProjectGraph,
    settings: &AliasSettings,
) -> Result<SyncSummary, SyncError> {
    let package_json = read_json(&root.join(&settings.package_json))?;
    let tsconfig_path = root.join(&settings.tsconfig);
    let mut tsconfig = read_json(&tsconfig_path)?;

    let mut summary = sync_paths(graph, &package_json, &mut tsconfig, settings)?;

    if settings.dry_run {
        info!(
            "Dry run: {} alias(es) would be added, {} updated",
            summary.added, summary.updated
        );
        return Ok(summary);
    }

    let mut content = serde_json::to_string_pretty(&tsconfig).map_err(|source| SyncError::Json {
        path: tsconfig_path.clone(),
        source,
    })?;
    content.push('\n');
    std::fs::write(&tsconfig_path, content).map_err(|source| SyncError::Io {
        path: tsconfig_path.clone(),
        source,
    })?;
    summary.written = true;

    info!(
        "Updated {}: {} added, {} updated, {} unchanged",
        tsconfig_path.display(),
        summary.added,
        summary.updated,
        summary.unchanged
    );
    Ok(summary)
}

fn namespace(package_json: &Value) -> Result<&str, SyncError> {
    let name = package_json
        .get("name")
        .and_then(Value::as_str)
        .ok_or(SyncError::MissingPackageName)?;
    Ok(name.split('/').next().unwrap_or(name))
}

fn library_aliases(
    nodes: &[GraphNode],
    namespace: &str,
    extension: &str,
) -> BTreeMap<String, String> {
    nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Lib)
        .map(|node| {
            let alias = format!("{namespace}/{}", node.name);
            (alias, entry_file(&node.project_root, extension))
        })
        .collect()
}

fn entry_file(project_root: &str, extension: &str) -> String {
    let root = normalize(project_root);
    if root.is_empty() || root == "." {
        format!("index.{extension}")
    } else {
        format!("{root}/index.{extension}")
    }
}

fn check_shape(document: &Value) -> Result<(), SyncError> {
    let root = document.as_object().ok_or(SyncError::InvalidDocument {
        location: "<root>",
    })?;
    let Some(compiler_options) = root.get("compilerOptions") else {
        return Ok(());
    };
    let compiler_options = compiler_options
        .as_object()
        .ok_or(SyncError::InvalidDocument {
            location: "compilerOptions",
        })?;
    match compiler_options.get("paths") {
        Some(paths) if !paths.is_object() => Err(SyncError::InvalidDocument {
            location: "compilerOptions.paths",
        }),
        _ => Ok(()),
    }
}

fn paths_object(document: &mut Value) -> Result<&mut Map<String, Value>, SyncError> {
    let invalid = |location| SyncError::InvalidDocument { location };

    document
        .as_object_mut()
        .ok_or_else(|| invalid("<root>"))?
        .entry("compilerOptions")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| invalid("compilerOptions"))?
        .entry("paths")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| invalid("compilerOptions.paths"))
}

fn read_json(path: &Path) -> Result<Value, SyncError> {
    let content = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SyncError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn package_json() -> Value {
        json!({ "name": "@marmicode/root" })
    }

    fn graph() -> StaticGraph {
        StaticGraph::new(vec![
            GraphNode::library("web-cart-ui", "libs/web/cart/ui"),
            GraphNode {
                name: "demo".into(),
                project_root: "apps/demo".into(),
                kind: NodeKind::App,
            },
            GraphNode {
                name: "demo-e2e".into(),
                project_root: "apps/demo-e2e".into(),
                kind: NodeKind::E2e,
            },
        ])
    }

    #[test]
    fn adds_paths_for_libraries_only() {
        let mut tsconfig = json!({ "compilerOptions": { "paths": {} } });
        let summary = sync_paths(
            &graph(),
            &package_json(),
            &mut tsconfig,
            &AliasSettings::default(),
        )
        .unwrap();

        assert_eq!(
            tsconfig,
            json!({
                "compilerOptions": {
                    "paths": { "@marmicode/web-cart-ui": ["libs/web/cart/ui/index.ts"] }
                }
            })
        );
        assert_eq!(summary.added, 1);
        assert!(summary.has_changes());
    }

    #[test]
    fn overrides_existing_alias_and_keeps_others() {
        let graph = StaticGraph::new(vec![GraphNode::library(
            "web-cart-ui",
            "libs/web/new-cart/ui",
        )]);
        let mut tsconfig = json!({
            "compilerOptions": {
                "strict": true,
                "paths": {
                    "@marmicode/web-cart-ui": ["libs/web/cart/ui/index.ts"],
                    "@marmicode/legacy": ["legacy/index.ts"]
                }
            },
            "exclude": ["node_modules"]
        });

        let summary = sync_paths(
            &graph,
            &package_json(),
            &mut tsconfig,
            &AliasSettings::default(),
        )
        .unwrap();

        assert_eq!(
            tsconfig,
            json!({
                "compilerOptions": {
                    "strict": true,
                    "paths": {
                        "@marmicode/web-cart-ui": ["libs/web/new-cart/ui/index.ts"],
                        "@marmicode/legacy": ["legacy/index.ts"]
                    }
                },
                "exclude": ["node_modules"]
            })
        );
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.added, 0);
    }

    #[test]
    fn second_run_reports_unchanged() {
        let mut tsconfig = json!({});
        let settings = AliasSettings::default();
        sync_paths(&graph(), &package_json(), &mut tsconfig, &settings).unwrap();
        let summary = sync_paths(&graph(), &package_json(), &mut tsconfig, &settings).unwrap();

        assert_eq!(summary.unchanged, 1);
        assert!(!summary.has_changes());
    }

    #[test]
    fn creates_missing_compiler_options() {
        let mut tsconfig = json!({ "extends": "./base.json" });
        sync_paths(
            &graph(),
            &package_json(),
            &mut tsconfig,
            &AliasSettings::default(),
        )
        .unwrap();

        assert_eq!(
            tsconfig["compilerOptions"]["paths"]["@marmicode/web-cart-ui"],
            json!(["libs/web/cart/ui/index.ts"])
        );
    }

    #[test]
    fn unscoped_package_name_is_used_whole() {
        let mut tsconfig = json!({});
        sync_paths(
            &graph(),
            &json!({ "name": "workspace" }),
            &mut tsconfig,
            &AliasSettings::default(),
        )
        .unwrap();

        let paths = tsconfig["compilerOptions"]["paths"].as_object().unwrap();
        assert!(paths.contains_key("workspace/web-cart-ui"));
    }

    #[test]
    fn normalizes_project_roots() {
        let graph = StaticGraph::new(vec![
            GraphNode::library("a", "./libs/web/a/ui/"),
            GraphNode::library("root", "."),
        ]);
        let mut tsconfig = json!({});
        let mut settings = AliasSettings::default();
        settings.extension = "tsx".into();
        sync_paths(&graph, &package_json(), &mut tsconfig, &settings).unwrap();

        let paths = &tsconfig["compilerOptions"]["paths"];
        assert_eq!(paths["@marmicode/a"], json!(["libs/web/a/ui/index.tsx"]));
        assert_eq!(paths["@marmicode/root"], json!(["index.tsx"]));
    }

    #[test]
    fn missing_package_name_leaves_document_untouched() {
        let original = json!({ "compilerOptions": { "paths": {} } });
        let mut tsconfig = original.clone();

        let err = sync_paths(
            &graph(),
            &json!({ "version": "1.0.0" }),
            &mut tsconfig,
            &AliasSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(err, SyncError::MissingPackageName));
        assert_eq!(tsconfig, original);
    }

    #[test]
    fn rejects_non_object_paths() {
        let original = json!({ "compilerOptions": { "paths": [] } });
        let mut tsconfig = original.clone();

        let err = sync_paths(
            &graph(),
            &package_json(),
            &mut tsconfig,
            &AliasSettings::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SyncError::InvalidDocument {
                location: "compilerOptions.paths"
            }
        ));
        assert_eq!(tsconfig, original);
    }

    #[test]
    fn parses_exported_graph() {
        let content = r#"{
            "graph": {
                "nodes": {
                    "web-cart-ui": {
                        "name": "web-cart-ui",
                        "type": "lib",
                        "data": { "root": "libs/web/cart/ui", "tags": [] }
                    },
                    "demo": {
                        "name": "demo",
                        "type": "app",
                        "data": { "root": "apps/demo" }
                    }
                },
                "dependencies": {}
            }
        }"#;

        let nodes = GraphFile::parse(content).unwrap();
        assert_eq!(
            nodes,
            [
                GraphNode {
                    name: "demo".into(),
                    project_root: "apps/demo".into(),
                    kind: NodeKind::App,
                },
                GraphNode::library("web-cart-ui", "libs/web/cart/ui"),
            ]
        );
    }

    #[test]
    fn rejects_malformed_graph() {
        let err = GraphFile::parse(r#"{ "nodes": {} }"#).unwrap_err();
        assert!(matches!(err, GraphError::Parse(_)));
    }

    #[test]
    fn writes_tsconfig_with_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), r#"{"name":"@marmicode/root"}"#).unwrap();
        fs::write(
            tmp.path().join("tsconfig.base.json"),
            r#"{"compileOnSave":false,"compilerOptions":{"paths":{}}}"#,
        )
        .unwrap();

        let summary =
            sync_tsconfig_paths(tmp.path(), &graph(), &AliasSettings::default()).unwrap();
        assert!(summary.written);

        let content = fs::read_to_string(tmp.path().join("tsconfig.base.json")).unwrap();
        assert!(content.ends_with("}\n"));
        assert!(content.find("compileOnSave").unwrap() < content.find("compilerOptions").unwrap());
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(
            value["compilerOptions"]["paths"]["@marmicode/web-cart-ui"],
            json!(["libs/web/cart/ui/index.ts"])
        );
    }

    #[test]
    fn dry_run_does_not_write() {
        let tmp = TempDir::new().unwrap();
        let original = r#"{"compilerOptions":{"paths":{}}}"#;
        fs::write(tmp.path().join("package.json"), r#"{"name":"@marmicode/root"}"#).unwrap();
        fs::write(tmp.path().join("tsconfig.base.json"), original).unwrap();

        let settings = AliasSettings::default().dry_run(true);
        let summary = sync_tsconfig_paths(tmp.path(), &graph(), &settings).unwrap();

        assert_eq!(summary.added, 1);
        assert!(!summary.written);
        assert_eq!(
            fs::read_to_string(tmp.path().join("tsconfig.base.json")).unwrap(),
            original
        );
    }

    #[test]
    fn missing_tsconfig_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), r#"{"name":"@marmicode/root"}"#).unwrap();

        let err = sync_tsconfig_paths(tmp.path(), &graph(), &AliasSettings::default()).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
