//! Analyzer configuration.

use crate::analyzer::Analyzer;
use crate::ids::StatementId;
use jsdfa_common::limits::DEFAULT_ORDER;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub struct AnalyzerOptions {
    /// Worklist passes run by [`Analyzer::analyze`].
    pub order: usize,
    /// Whether diagnostics are recorded in the log sink.
    pub enable_log: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions {
            order: DEFAULT_ORDER,
            enable_log: true,
        }
    }
}

/// Per-pass hook of the worklist fixpoint. Returns whether the statement
/// stays on the worklist for the next pass.
pub type WorklistFilter = Rc<dyn Fn(&mut Analyzer, StatementId) -> bool>;

/// Options of one scope derivation. Simulated calls inherit the options of
/// the derivation that reached them.
#[derive(Clone)]
pub struct Derivation {
    pub order: usize,
    /// `None` reduces then derives every statement and keeps it.
    pub filter: Option<WorklistFilter>,
}

impl Default for Derivation {
    fn default() -> Self {
        Derivation {
            order: DEFAULT_ORDER,
            filter: None,
        }
    }
}

impl Derivation {
    pub fn with_order(order: usize) -> Self {
        Derivation {
            order,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: WorklistFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derivation")
            .field("order", &self.order)
            .field("filter", &self.filter.as_ref().map(|_| "custom"))
            .finish()
    }
}
