//! Configuration types for implicit-libs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration, usually loaded from `implicit-libs.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Candidate discovery settings.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Inference engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Lint target settings.
    #[serde(default)]
    pub lint: LintConfig,

    /// Test target settings.
    #[serde(default)]
    pub test: TestConfig,

    /// tsconfig path alias settings.
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Where to look for project marker files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob, relative to the workspace root, matching marker files.
    #[serde(default = "default_scan_pattern")]
    pub pattern: String,

    /// Marker file name whose presence makes a folder a project.
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pattern: default_scan_pattern(),
            marker: default_marker(),
        }
    }
}

/// Inference engine tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of candidates evaluated concurrently.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

/// Lint target generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Command run in the project directory.
    #[serde(default = "default_lint_command")]
    pub command: String,

    /// Linter package name, used as an external dependency cache key.
    #[serde(default = "default_lint_tool")]
    pub tool: String,

    /// Lint configuration file looked up in every ancestor directory.
    #[serde(default = "default_lint_config_file")]
    pub config_file: String,

    /// Workspace-relative glob of custom lint rules.
    #[serde(default = "default_lint_rules_glob")]
    pub rules_glob: String,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            command: default_lint_command(),
            tool: default_lint_tool(),
            config_file: default_lint_config_file(),
            rules_glob: default_lint_rules_glob(),
        }
    }
}

/// Test target generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConfig {
    /// Command run in the project directory.
    #[serde(default = "default_test_command")]
    pub command: String,

    /// Test runner package name, used as an external dependency cache key.
    #[serde(default = "default_test_tool")]
    pub tool: String,

    /// Glob, relative to the project directory, matching test files.
    #[serde(default = "default_test_pattern")]
    pub pattern: String,

    /// Environment variable that affects test results.
    #[serde(default = "default_test_env")]
    pub env: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            command: default_test_command(),
            tool: default_test_tool(),
            pattern: default_test_pattern(),
            env: default_test_env(),
        }
    }
}

/// tsconfig path alias synchronization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base tsconfig holding `compilerOptions.paths`.
    #[serde(default = "default_tsconfig")]
    pub tsconfig: PathBuf,

    /// Package manifest whose `name` provides the alias namespace.
    #[serde(default = "default_package_json")]
    pub package_json: PathBuf,

    /// Extension of each library's entry file.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            tsconfig: default_tsconfig(),
            package_json: default_package_json(),
            extension: default_extension(),
        }
    }
}

fn default_scan_pattern() -> String {
    "libs/**/index.ts".to_string()
}

fn default_marker() -> String {
    "index.ts".to_string()
}

fn default_lint_command() -> String {
    "eslint .".to_string()
}

fn default_lint_tool() -> String {
    "eslint".to_string()
}

fn default_lint_config_file() -> String {
    "eslint.config.js".to_string()
}

fn default_lint_rules_glob() -> String {
    "tools/eslint-rules/**/*".to_string()
}

fn default_test_command() -> String {
    "vitest".to_string()
}

fn default_test_tool() -> String {
    "vitest".to_string()
}

fn default_test_pattern() -> String {
    "**/*.spec.*".to_string()
}

fn default_test_env() -> String {
    "CI".to_string()
}

fn default_tsconfig() -> PathBuf {
    PathBuf::from("tsconfig.base.json")
}

fn default_package_json() -> PathBuf {
    PathBuf::from("package.json")
}

fn default_extension() -> String {
    "ts".to_string()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
