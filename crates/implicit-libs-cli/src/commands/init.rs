//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# implicit-libs configuration
# Every value below is the built-in default.

[scan]
# Marker files that make their folder a library candidate
pattern = "libs/**/index.ts"
# A candidate below another folder holding this file is not a project
marker = "index.ts"

[engine]
# Candidates evaluated at once (default: number of CPUs)
# parallelism = 8

[lint]
command = "eslint ."
tool = "eslint"
# Config file looked up in the project folder and each of its ancestors
config_file = "eslint.config.js"
rules_glob = "tools/eslint-rules/**/*"

[test]
command = "vitest"
tool = "vitest"
# A test target is only added when a file under the project matches
pattern = "**/*.spec.*"
env = "CI"

[paths]
tsconfig = "tsconfig.base.json"
package_json = "package.json"
extension = "ts"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new("implicit-libs.toml"), force)?;

    println!("Created implicit-libs.toml");
    println!("\nNext steps:");
    println!("  1. Edit implicit-libs.toml to match your workspace layout");
    println!("  2. Run: implicit-libs infer");
    println!("  3. Run: implicit-libs sync-paths");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
