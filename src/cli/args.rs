use clap::Parser;
use jsdfa_common::limits::DEFAULT_ORDER;
use std::path::PathBuf;

/// CLI arguments for the jsdfa binary.
#[derive(Parser, Debug)]
#[command(
    name = "jsdfa",
    version,
    about = "Flow-sensitive data-flow analysis of JavaScript ESTree programs"
)]
pub struct CliArgs {
    /// ESTree JSON document to analyze (parsed with `loc: true`).
    pub input: PathBuf,

    /// Number of derivation passes over every scope.
    #[arg(long, default_value_t = DEFAULT_ORDER)]
    pub order: usize,

    /// Do not record analysis diagnostics.
    #[arg(long = "no-log")]
    pub no_log: bool,

    /// Write recorded diagnostics to this file after the analysis.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Print the snapshot on one line instead of pretty-printed.
    #[arg(long)]
    pub compact: bool,
}
