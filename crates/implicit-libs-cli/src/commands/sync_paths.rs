//! Sync-paths command implementation.

use anyhow::{anyhow, Context, Result};
use implicit_libs_core::{
    sync_tsconfig_paths, AliasSettings, GraphFile, InferenceEngine, ProjectGraph, StaticGraph,
};
use std::path::Path;

/// Runs the sync-paths command.
///
/// Without `graph_file`, libraries come from running inference on `path`.
pub async fn run(
    path: &Path,
    graph_file: Option<&Path>,
    dry_run: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let loaded = crate::config_resolver::load(path, config_path)?;
    tracing::info!("Syncing aliases in {} (config: {})", path.display(), loaded.source);

    let config = loaded.config;
    let settings = AliasSettings::from(&config.paths).dry_run(dry_run);

    let graph: Box<dyn ProjectGraph> = match graph_file {
        Some(file) => {
            tracing::info!("Reading project graph from {}", file.display());
            Box::new(GraphFile::new(file))
        }
        None => {
            let engine = InferenceEngine::builder()
                .root(path)
                .config(config)
                .build()
                .context("Failed to build inference engine")?;
            let report = engine
                .infer_workspace()
                .await
                .context("Inference failed")?;
            Box::new(StaticGraph::from_report(&report))
        }
    };

    let summary = sync_tsconfig_paths(path, graph.as_ref(), &settings).map_err(|e| {
        anyhow!(
            "Failed to sync {}\n{}",
            settings.tsconfig.display(),
            super::output::render_diagnostic(&e)
        )
    })?;

    let verb = if summary.written { "Updated" } else { "Would update" };
    println!(
        "{} {}: {} added, {} updated, {} unchanged",
        verb,
        settings.tsconfig.display(),
        summary.added,
        summary.updated,
        summary.unchanged
    );

    Ok(())
}
