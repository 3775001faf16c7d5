//! Lint and test target synthesis.
//!
//! Targets are purely declarative: nothing here checks that the commands
//! exist. Input lists are ordered and the order feeds the runner's cache
//! key, so every builder below emits inputs in a fixed order.

use crate::config::{LintConfig, TestConfig};
use crate::types::{TargetDescriptor, TargetInput, TargetMetadata, TargetOptions};

/// Token the task runner expands to the workspace root.
pub const WORKSPACE_ROOT: &str = "{workspaceRoot}";

/// Token the task runner expands to the target's `outputFile` option.
pub const OUTPUT_FILE: &str = "{options.outputFile}";

/// Builds the `lint` and `test` targets of a project.
#[derive(Debug, Clone, Default)]
pub struct TargetSynthesizer {
    lint: LintConfig,
    test: TestConfig,
    output_file: Option<String>,
}

impl TargetSynthesizer {
    /// Creates a synthesizer from lint and test settings.
    #[must_use]
    pub fn new(lint: LintConfig, test: TestConfig) -> Self {
        Self {
            lint,
            test,
            output_file: None,
        }
    }

    /// Sets the report file passed to the linter as `outputFile`.
    #[must_use]
    pub fn with_output_file(mut self, output_file: Option<String>) -> Self {
        self.output_file = output_file.filter(|f| !f.is_empty());
        self
    }

    /// Glob, relative to a project directory, matching its test files.
    #[must_use]
    pub fn test_pattern(&self) -> &str {
        &self.test.pattern
    }

    /// Builds the lint target. Always cacheable.
    #[must_use]
    pub fn lint_target(&self, project_path: &str) -> TargetDescriptor {
        let mut inputs = vec![
            TargetInput::file_set("default"),
            TargetInput::file_set("^default"),
        ];
        inputs.extend(
            ancestor_config_paths(project_path, &self.lint.config_file)
                .into_iter()
                .map(TargetInput::FileSet),
        );
        inputs.push(TargetInput::file_set(format!(
            "{WORKSPACE_ROOT}/{}",
            self.lint.rules_glob
        )));
        inputs.push(TargetInput::external_dependency(&self.lint.tool));

        TargetDescriptor {
            command: self.lint.command.clone(),
            options: TargetOptions {
                cwd: project_path.to_string(),
                root: None,
                output_file: self.output_file.clone(),
            },
            metadata: TargetMetadata {
                technologies: vec![self.lint.tool.clone()],
            },
            cache: true,
            inputs,
            outputs: vec![OUTPUT_FILE.to_string()],
        }
    }

    /// Builds the test target. Callers decide whether the project has tests.
    #[must_use]
    pub fn test_target(&self, project_path: &str) -> TargetDescriptor {
        TargetDescriptor {
            command: self.test.command.clone(),
            options: TargetOptions {
                cwd: project_path.to_string(),
                root: Some(".".to_string()),
                output_file: None,
            },
            metadata: TargetMetadata {
                technologies: vec![self.test.tool.clone()],
            },
            cache: true,
            inputs: vec![
                TargetInput::file_set("default"),
                TargetInput::file_set("^production"),
                TargetInput::external_dependency(&self.test.tool),
                TargetInput::env(&self.test.env),
            ],
            outputs: vec![format!("{WORKSPACE_ROOT}/coverage/{project_path}")],
        }
    }
}

/// Lists the lint config file of every directory from `project_path` up to
/// the workspace root, closest first.
///
/// `libs/web/ui` yields `{workspaceRoot}/libs/web/ui/<file>`,
/// `{workspaceRoot}/libs/web/<file>`, `{workspaceRoot}/libs/<file>` and
/// finally `{workspaceRoot}/<file>`: one entry per level, bounded by the
/// number of segments.
#[must_use]
pub fn ancestor_config_paths(project_path: &str, config_file: &str) -> Vec<String> {
    let segments: Vec<&str> = project_path
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    (0..=segments.len())
        .rev()
        .map(|depth| {
            let mut path = String::from(WORKSPACE_ROOT);
            for segment in &segments[..depth] {
                path.push('/');
                path.push_str(segment);
            }
            path.push('/');
            path.push_str(config_file);
            path
        })
        .collect()
}
