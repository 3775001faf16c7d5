//! Shared output formatting for inference reports.

use anyhow::Result;
use implicit_libs_core::InferenceReport;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};

use crate::OutputFormat;

/// Print an inference report in the specified format.
pub fn print(report: &InferenceReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

/// Renders a diagnostic with its code and help, without colors.
pub fn render_diagnostic(diagnostic: &dyn Diagnostic) -> String {
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    let mut rendered = String::new();
    match handler.render_report(&mut rendered, diagnostic) {
        Ok(()) => rendered,
        Err(_) => diagnostic.to_string(),
    }
}

fn print_text(report: &InferenceReport) {
    for (dir, project) in report.projects() {
        let tags: Vec<String> = project.tags.iter().map(ToString::to_string).collect();
        let targets: Vec<&str> = project.targets.keys().map(String::as_str).collect();

        println!("\x1b[1m{}\x1b[0m at {}", project.name, dir);
        println!("  tags: {}", tags.join(", "));
        println!("  targets: {}", targets.join(", "));
        println!();
    }

    for warning in &report.warnings {
        println!("{}", warning.path);
        println!("  \x1b[33mwarning\x1b[0m: {}", warning.message);
        if let Some(help) = &warning.help {
            println!("  = help: {help}");
        }
        println!();
    }

    let summary_color = if report.has_warnings() {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Inferred {} project(s), {} warning(s)\x1b[0m",
        summary_color,
        report.project_count(),
        report.warnings.len()
    );
}

fn print_json(report: &InferenceReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(report: &InferenceReport) {
    for (dir, project) in report.projects() {
        let tags: Vec<String> = project.tags.iter().map(ToString::to_string).collect();
        println!("{}: {} [{}]", dir, project.name, tags.join(","));
    }
    for warning in &report.warnings {
        println!("{}: warning: {}", warning.path, warning.message);
    }
}
