//! Common types and utilities for the jsdfa data-flow engine.
//!
//! This crate provides foundational types used across all jsdfa crates:
//! - Line/column positions and the program-point encoding (`Loc`)
//! - Engine limits and thresholds
//! - Analysis diagnostics and the buffered log sink

// Centralized limits and thresholds
pub mod limits;

// Position/SourceLocation types and program points
pub mod position;
pub use position::{Loc, Position, SourceLocation};

// Analysis diagnostics and the log sink
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticKind, LogSink};
