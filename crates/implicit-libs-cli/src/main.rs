//! implicit-libs CLI tool.
//!
//! Usage:
//! ```bash
//! implicit-libs infer [OPTIONS] [PATH]
//! implicit-libs sync-paths [OPTIONS] [PATH]
//! implicit-libs list-types
//! implicit-libs init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Convention-based library inference for TypeScript monorepos
#[derive(Parser)]
#[command(name = "implicit-libs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Infer library projects from the folder layout
    Infer {
        /// Workspace root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Report file passed to the linter as `outputFile`
        #[arg(long)]
        output_file: Option<String>,

        /// Maximum number of candidates evaluated at once
        #[arg(short = 'j', long)]
        parallelism: Option<usize>,
    },

    /// Write one import alias per library into the base tsconfig
    SyncPaths {
        /// Workspace root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Exported project graph JSON; inferred from PATH when omitted
        #[arg(long)]
        graph: Option<PathBuf>,

        /// Report changes without writing the tsconfig
        #[arg(long)]
        dry_run: bool,
    },

    /// List allowed project types
    ListTypes,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for inference reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-project compact format.
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Infer {
            path,
            format,
            output_file,
            parallelism,
        } => {
            commands::infer::run(
                &path,
                format,
                output_file,
                parallelism,
                cli.config.as_deref(),
            )
            .await
        }
        Commands::SyncPaths {
            path,
            graph,
            dry_run,
        } => {
            commands::sync_paths::run(&path, graph.as_deref(), dry_run, cli.config.as_deref())
                .await
        }
        Commands::ListTypes => {
            commands::list_types::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
