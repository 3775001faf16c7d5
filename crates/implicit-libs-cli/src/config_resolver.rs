//! Configuration lookup for a workspace.
//!
//! The first match wins:
//!
//! 1. `--config <path>`
//! 2. `implicit-libs.toml` or `.implicit-libs.toml` in the workspace root or
//!    the closest ancestor holding one, so the tool behaves the same when
//!    pointed at a sub-folder of the monorepo
//! 3. `config.toml` in the user config directory
//!    (`$IMPLICIT_LIBS_CONFIG_DIR`, else `~/.implicit-libs/`)
//! 4. built-in defaults

use anyhow::{Context, Result};
use implicit_libs_core::Config;
use std::fmt;
use std::path::{Path, PathBuf};

/// Config file names looked up in each workspace directory, in order.
const WORKSPACE_CONFIG_NAMES: &[&str] = &["implicit-libs.toml", ".implicit-libs.toml"];

/// Config file name within the user config directory.
const USER_CONFIG_NAME: &str = "config.toml";

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Flag(PathBuf),
    /// Found in the workspace root or one of its ancestors.
    Workspace(PathBuf),
    /// Found in the user config directory.
    User(PathBuf),
    /// Nothing found.
    Defaults,
}

impl ConfigSource {
    fn path(&self) -> Option<&Path> {
        match self {
            Self::Flag(p) | Self::Workspace(p) | Self::User(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Workspace(p) => write!(f, "{}", p.display()),
            Self::User(p) => write!(f, "{} (user config)", p.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// A parsed configuration and the file it was read from.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Parsed configuration.
    pub config: Config,
    /// Where it came from.
    pub source: ConfigSource,
}

/// Finds and parses the configuration for `workspace`.
///
/// # Errors
///
/// Returns an error naming the file if the chosen config cannot be read or
/// parsed. A missing `--config` file is an error, not a fallback.
pub fn load(workspace: &Path, explicit: Option<&Path>) -> Result<LoadedConfig> {
    load_with(workspace, explicit, user_config_dir().as_deref())
}

/// `load` with the user directory passed in, so tests do not touch `$HOME`.
fn load_with(
    workspace: &Path,
    explicit: Option<&Path>,
    user_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let source = locate(workspace, explicit, user_dir);

    let config = match source.path() {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    tracing::debug!("Using config from {}", source);
    Ok(LoadedConfig { config, source })
}

fn locate(workspace: &Path, explicit: Option<&Path>, user_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Flag(path.to_path_buf());
    }

    // `.` has no lexical ancestors; walk the real path when it resolves.
    let workspace = workspace
        .canonicalize()
        .unwrap_or_else(|_| workspace.to_path_buf());

    for dir in workspace.ancestors() {
        let found = WORKSPACE_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = found {
            return ConfigSource::Workspace(path);
        }
    }

    user_dir
        .map(|dir| dir.join(USER_CONFIG_NAME))
        .filter(|path| path.is_file())
        .map_or(ConfigSource::Defaults, ConfigSource::User)
}

/// `$IMPLICIT_LIBS_CONFIG_DIR`, else `~/.implicit-libs`.
fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("IMPLICIT_LIBS_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".implicit-libs"))
}
