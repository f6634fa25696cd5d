//! Runs one analysis from parsed CLI arguments.

use anyhow::{Context, Result};
use jsdfa_engine::AnalyzerOptions;
use tracing::info;

use crate::cli::args::CliArgs;

/// Analyze the input document and return the scope snapshot as JSON.
///
/// Diagnostics are flushed to `--log-file` when one is given; otherwise
/// they are only visible through tracing.
pub fn run(args: &CliArgs) -> Result<String> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;

    let options = AnalyzerOptions {
        order: args.order,
        enable_log: !args.no_log,
    };
    let mut analyzer = crate::analyze_estree(&json, options)
        .with_context(|| format!("{} is not an ESTree program", args.input.display()))?;

    let diagnostics = analyzer.log().entries().len();
    info!(order = args.order, diagnostics, "analysis complete");

    let snapshot = analyzer.snapshot_scopes();
    let output = if args.compact {
        serde_json::to_string(&snapshot)
    } else {
        serde_json::to_string_pretty(&snapshot)
    }
    .context("failed to serialize the scope snapshot")?;

    if let Some(path) = &args.log_file {
        analyzer
            .log_mut()
            .flush(path)
            .with_context(|| format!("failed to write diagnostics to {}", path.display()))?;
    }
    Ok(output)
}
