//! Variables and their use-def chains.
//!
//! A variable's chain is the ordered list of statements (writes and uses)
//! recorded against it, sorted by location. Reading a variable at a
//! location merges the visible writes up to that point into a fresh value
//! snapshot.

use crate::analyzer::Analyzer;
use crate::ids::{ConditionalId, ScopeId, StatementId, ValueId, VariableId};
use crate::statement::StatementKind;
use jsdfa_ast::NodeIndex;
use jsdfa_common::{DiagnosticKind, Loc};
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableKind {
    /// Declared name of a scope.
    Binding,
    /// Per-call parameter or `this` slot.
    Closure,
    /// Collects the values a function returns.
    Return,
    /// Hidden host of an unnamed value.
    Anonymous,
    /// Writes made in one scope to a variable of the enclosing scope
    /// `defined_in`.
    Modified { defined_in: ScopeId },
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub scope: Option<ScopeId>,
    pub kind: VariableKind,
    pub(crate) chain: Vec<StatementId>,
}

impl Variable {
    pub fn new(name: &str, scope: Option<ScopeId>, kind: VariableKind) -> Variable {
        Variable {
            name: name.to_string(),
            scope,
            kind,
            chain: Vec::new(),
        }
    }

    pub fn chain(&self) -> &[StatementId] {
        &self.chain
    }
}

impl Analyzer {
    /// Put `statement` on the chain of `variable` at `loc`, after every
    /// entry with an equal location. No location orders it last.
    pub fn add_node(&mut self, variable: VariableId, statement: StatementId, loc: Option<Loc>) {
        let loc = loc.unwrap_or(Loc::UNORDERED);
        let scope = self.variables[variable.index()].scope;
        {
            let entry = &mut self.statements[statement.index()];
            entry.loc = loc;
            entry.host = Some(variable);
            entry.scope = scope;
        }
        if let StatementKind::Assign { value, .. } = self.statements[statement.index()].kind {
            self.set_value_scope(value, scope);
            self.attach_value(statement, value);
        }
        let statements = &self.statements;
        let chain = &mut self.variables[variable.index()].chain;
        let position = chain.partition_point(|entry| statements[entry.index()].loc <= loc);
        chain.insert(position, statement);
    }

    /// Record a whole-value write of an existing value.
    pub fn assign_value(&mut self, variable: VariableId, value: ValueId, loc: Option<Loc>) -> StatementId {
        let statement = self.new_assignment_of(Vec::new(), value);
        self.add_node(variable, statement, loc);
        statement
    }

    /// Value of `variable` at `loc` (latest when `None`), optionally read
    /// through a member `path`.
    ///
    /// When the location lies inside a branch that tags one of the chain's
    /// writes, only writes of that branch or its enclosing branches are
    /// visible; every tagged write must also pass its branch test. Uses are
    /// skipped. The visible writes up to `loc` are merged into a fresh
    /// snapshot whose target variable is `variable`.
    pub fn inference(&mut self, variable: VariableId, loc: Option<Loc>, path: &[NodeIndex]) -> Option<ValueId> {
        let chain = self.variables[variable.index()].chain.clone();
        let owner = self.variables[variable.index()].scope;

        let active = match loc {
            Some(loc) => chain.iter().find_map(|&statement| {
                let entry = &self.statements[statement.index()];
                if !entry.is_assign() {
                    return None;
                }
                let conditional = entry.conditional?;
                if self.conditionals[conditional.index()].scope != owner? {
                    return None;
                }
                self.in_branch(conditional, loc)
            }),
            None => None,
        };

        let mut visible: Vec<StatementId> = Vec::with_capacity(chain.len());
        for statement in chain {
            if !self.statements[statement.index()].is_assign() {
                continue;
            }
            if let Some(conditional) = self.statements[statement.index()].conditional {
                if !self.test_conditional(conditional) {
                    continue;
                }
                if let Some(active) = active
                    && !self.is_branch_ancestor(conditional, active)
                {
                    continue;
                }
            }
            visible.push(statement);
        }

        let count = match loc {
            Some(loc) => visible.partition_point(|entry| self.statements[entry.index()].loc <= loc),
            None => visible.len(),
        };
        trace!(
            variable = %self.variables[variable.index()].name,
            visible = count,
            "inference"
        );
        let merged = self.merge(&visible[..count])?;
        self.values[merged.index()].target_variable = Some(variable);
        if path.is_empty() {
            Some(merged)
        } else {
            self.access(merged, path)
        }
    }

    /// Whether `branch` is `of` or one of its enclosing branches.
    fn is_branch_ancestor(&self, branch: ConditionalId, of: ConditionalId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == branch {
                return true;
            }
            current = self.conditionals[id.index()].parent;
        }
        false
    }

    /// Fold writes into one snapshot: a whole-value write replaces the
    /// running value, a member write updates it in place.
    fn merge(&mut self, writes: &[StatementId]) -> Option<ValueId> {
        let mut merged: Option<ValueId> = None;
        for &statement in writes {
            let StatementKind::Assign { ref access_path, value } = self.statements[statement.index()].kind else {
                continue;
            };
            let access_path = access_path.clone();
            if access_path.is_empty() {
                merged = Some(self.snapshot(value));
            } else if let Some(current) = merged {
                let written = self.snapshot(value);
                self.access_write(current, &access_path, written);
            }
        }
        merged
    }

    /// Move every entry of `variable`'s chain onto `target` at `loc`.
    pub(crate) fn apply_to(&mut self, variable: VariableId, target: VariableId, loc: Loc) {
        let chain = self.variables[variable.index()].chain.clone();
        for statement in chain {
            self.add_node(target, statement, Some(loc));
        }
    }

    /// Replace the binding of `variable` with a fresh variable whose only
    /// entry is the variable's latest value, placed before every real
    /// location. Later code sees the value as given.
    pub fn as_library(&mut self, variable: VariableId) -> Option<VariableId> {
        let Some(scope) = self.variables[variable.index()].scope else {
            let name = self.variables[variable.index()].name.clone();
            self.report(
                DiagnosticKind::DetachedVariable,
                format!("`{name}` cannot be injected as a library"),
                None,
            );
            return None;
        };
        let latest = self.inference(variable, None, &[])?;
        let name = self.variables[variable.index()].name.clone();
        let library = self.new_variable(&name, Some(scope), VariableKind::Binding);
        self.assign_value(library, latest, Some(Loc::LIBRARY));
        self.scopes[scope.index()].definitions.insert(name, library);
        Some(library)
    }
}

#[cfg(test)]
#[path = "tests/variable_tests.rs"]
mod variable_tests;
