//! The bounded worklist fixpoint.

use crate::analyzer::Analyzer;
use crate::ids::{ScopeId, StatementId};
use crate::options::Derivation;
use tracing::trace;

impl Analyzer {
    /// Derive the statements of `scope` for up to `derivation.order` passes.
    ///
    /// The worklist defaults to every chain entry of the scope and is
    /// visited in location order. Each pass runs the filter on every
    /// statement and keeps the ones it accepts; the default filter reduces,
    /// then derives, then keeps. Queued writes are retried after every pass.
    /// Calls simulated during the derivation inherit `derivation`.
    pub fn derivation(&mut self, scope: ScopeId, worklist: Option<Vec<StatementId>>, derivation: &Derivation) {
        let _span = tracing::debug_span!("derivation", scope = scope.0, order = derivation.order).entered();
        let previous = std::mem::replace(&mut self.active, derivation.clone());

        let mut worklist = worklist.unwrap_or_else(|| self.worklist(scope));
        worklist.sort_by_key(|statement| self.statements[statement.index()].loc);

        for pass in 0..derivation.order {
            if worklist.is_empty() {
                break;
            }
            trace!(pass, statements = worklist.len(), "derivation pass");
            let mut kept = Vec::with_capacity(worklist.len());
            for statement in worklist {
                let keep = match &derivation.filter {
                    Some(filter) => filter(&mut *self, statement),
                    None => {
                        self.reduce_statement(statement);
                        self.derive_statement(statement);
                        true
                    }
                };
                if keep {
                    kept.push(statement);
                }
            }
            worklist = kept;
            self.solve_pending(scope);
        }

        self.active = previous;
    }
}

#[cfg(test)]
#[path = "tests/worklist_tests.rs"]
mod worklist_tests;
