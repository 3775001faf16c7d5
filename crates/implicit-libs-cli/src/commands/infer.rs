//! Infer command implementation.

use anyhow::{Context, Result};
use implicit_libs_core::InferenceEngine;
use std::path::Path;

use crate::OutputFormat;

/// Runs the infer command.
pub async fn run(
    path: &Path,
    format: OutputFormat,
    output_file: Option<String>,
    parallelism: Option<usize>,
    config_path: Option<&Path>,
) -> Result<()> {
    let loaded = crate::config_resolver::load(path, config_path)?;

    let mut builder = InferenceEngine::builder().root(path).config(loaded.config);
    if let Some(parallelism) = parallelism {
        builder = builder.parallelism(parallelism);
    }
    if let Some(output_file) = output_file {
        builder = builder.output_file(output_file);
    }

    let engine = builder.build().context("Failed to build inference engine")?;

    tracing::info!(
        "Inferring projects in {} (config: {}, parallelism: {})",
        engine.root().display(),
        loaded.source,
        engine.parallelism()
    );

    let report = engine
        .infer_workspace()
        .await
        .context("Inference failed")?;

    super::output::print(&report, format)
}
