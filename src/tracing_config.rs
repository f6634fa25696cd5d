//! Tracing configuration for following an analysis.
//!
//! The engine emits `debug` spans around scope initialization, derivation
//! passes and simulated calls, and `trace` events for chain inference.
//! Output format is selected with `JSDFA_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented span hierarchy via `tracing-tree`, which mirrors the
//!   call simulation nesting
//! - `json`: one JSON object per event
//!
//! ```bash
//! JSDFA_LOG=debug JSDFA_LOG_FORMAT=tree jsdfa program.json
//! JSDFA_LOG="jsdfa_engine::function=debug,jsdfa_engine::variable=trace" jsdfa program.json
//! ```
//!
//! Nothing is installed unless `JSDFA_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Case-insensitive format name; anything unrecognised is `Text`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "tree" => LogFormat::Tree,
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    fn from_env() -> Self {
        std::env::var("JSDFA_LOG_FORMAT")
            .map(|name| LogFormat::parse(&name))
            .unwrap_or_default()
    }
}

/// Filter directives from `JSDFA_LOG`, or `RUST_LOG` when only that is set.
fn build_filter() -> EnvFilter {
    match std::env::var("JSDFA_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber, writing to stderr so the snapshot on
/// stdout stays machine-readable. Does nothing when neither `JSDFA_LOG` nor
/// `RUST_LOG` is set.
pub fn init_tracing() {
    if std::env::var_os("JSDFA_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let filter = build_filter();

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree).init();
        }
        LogFormat::Json => {
            let json = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tracing_config_tests;
