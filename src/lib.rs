//! jsdfa: flow-sensitive, interprocedural data-flow analysis of JavaScript
//! programs given as ESTree JSON.
//!
//! The heavy lifting happens in the workspace crates, re-exported here:
//! - [`common`]: program points, limits and the diagnostic log sink
//! - [`ast`]: the arena AST, ESTree ingestion, walker and printer
//! - [`engine`]: scopes, use-def chains, derivation and reduction
//!
//! This crate adds the command-line driver and tracing setup.

pub use jsdfa_ast as ast;
pub use jsdfa_common as common;
pub use jsdfa_engine as engine;

pub use jsdfa_ast::{AstBuilder, EstreeError};
pub use jsdfa_common::{Diagnostic, DiagnosticKind, LogSink, Loc};
pub use jsdfa_engine::{
    Analyzer, AnalyzerOptions, BuiltinCall, BuiltinHook, Derivation, EntrySnapshot, ReduceContext, ReduceRule,
    RenderedValue, ScopeSnapshot,
};

// Command-line driver
pub mod cli;

// Tracing subscriber setup (JSDFA_LOG / JSDFA_LOG_FORMAT)
pub mod tracing_config;

/// Ingest an ESTree document and run the full analysis on it.
pub fn analyze_estree(json: &serde_json::Value, options: AnalyzerOptions) -> Result<Analyzer, EstreeError> {
    let mut analyzer = Analyzer::from_estree(json, options)?;
    analyzer.analyze();
    Ok(analyzer)
}
