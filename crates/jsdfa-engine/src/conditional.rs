//! Conditional branches.
//!
//! `if` consequents, `else` alternates and `switch` cases each become a
//! branch. A branch holds guard expressions (any of which enables it), its
//! enclosing branch, and the source span of its body. An alternate has no
//! guard of its own: it is taken exactly when none of the branches it
//! excludes is. Guards that do not reduce to a literal are assumed to hold.

use crate::analyzer::Analyzer;
use crate::ids::{ConditionalId, ScopeId};
use jsdfa_ast::NodeIndex;
use jsdfa_common::Loc;

#[derive(Clone, Debug)]
pub struct ConditionalStatement {
    pub scope: ScopeId,
    pub guards: Vec<NodeIndex>,
    pub parent: Option<ConditionalId>,
    pub children: Vec<ConditionalId>,
    pub alternate: Option<ConditionalId>,
    /// Branches that must all be untaken for this one to run.
    pub exclusive_of: Vec<ConditionalId>,
    /// Span of the branch body, exclusive on both ends.
    pub start: Loc,
    pub end: Loc,
    /// Set once the branch it alternates for tested false.
    pub pinned: bool,
}

impl Analyzer {
    pub(crate) fn new_conditional(&mut self, scope: ScopeId, parent: Option<ConditionalId>) -> ConditionalId {
        let id = self.add_conditional(ConditionalStatement {
            scope,
            guards: Vec::new(),
            parent,
            children: Vec::new(),
            alternate: None,
            exclusive_of: Vec::new(),
            start: Loc::HOISTED,
            end: Loc::HOISTED,
            pinned: false,
        });
        if let Some(parent) = parent {
            self.conditionals[parent.index()].children.push(id);
        }
        id
    }

    /// Add a disjunct to the branch guard.
    pub fn or_guard(&mut self, conditional: ConditionalId, guard: NodeIndex) {
        self.conditionals[conditional.index()].guards.push(guard);
    }

    /// Deepest branch in the tree of `conditional` whose body contains `loc`.
    pub fn in_branch(&self, conditional: ConditionalId, loc: Loc) -> Option<ConditionalId> {
        let branch = &self.conditionals[conditional.index()];
        if !(branch.start < loc && loc < branch.end) {
            return None;
        }
        branch
            .children
            .iter()
            .find_map(|&child| self.in_branch(child, loc))
            .or(Some(conditional))
    }

    /// Derive and reduce the guards of a branch and its enclosing branches.
    pub fn derive_conditional(&mut self, conditional: ConditionalId) {
        let mut current = Some(conditional);
        while let Some(id) = current {
            let scope = self.conditionals[id.index()].scope;
            let guards = self.conditionals[id.index()].guards.clone();
            for (slot, guard) in guards.into_iter().enumerate() {
                if self.node_literal(guard).is_some() {
                    continue;
                }
                let guard_scope = self.scope_of(guard).unwrap_or(scope);
                let value = self.value_from_ast(guard, Some(guard_scope));
                self.derive_value(value);
                self.reduce_value(value);
                let derived = self.derived_ast(value);
                self.conditionals[id.index()].guards[slot] = derived;
            }
            current = self.conditionals[id.index()].parent;
        }
    }

    /// Whether a branch's own condition holds, ignoring enclosing branches.
    fn own_test(&self, conditional: ConditionalId) -> bool {
        let branch = &self.conditionals[conditional.index()];
        if branch.pinned {
            return true;
        }
        if !branch.guards.is_empty() {
            return branch
                .guards
                .iter()
                .any(|&guard| self.node_literal(guard).is_none_or(|literal| literal.is_truthy()));
        }
        if !branch.exclusive_of.is_empty() {
            return branch
                .exclusive_of
                .iter()
                .all(|&excluded| !self.own_test(excluded));
        }
        false
    }

    /// Whether the branch can be taken: its own condition holds and so do
    /// those of every enclosing branch. A false consequent pins its
    /// alternate.
    pub fn test_conditional(&mut self, conditional: ConditionalId) -> bool {
        let own = self.own_test(conditional);
        let branch = &self.conditionals[conditional.index()];
        let alternate = branch.alternate;
        let parent = branch.parent;
        if !own {
            if let Some(alternate) = alternate {
                self.conditionals[alternate.index()].pinned = true;
            }
            return false;
        }
        match parent {
            Some(parent) => self.test_conditional(parent),
            None => true,
        }
    }

    /// Readable condition of a branch, `(a || b) && parent`.
    pub fn flatten_conditional(&self, conditional: ConditionalId) -> String {
        let own = self.flatten_own(conditional);
        match self.conditionals[conditional.index()].parent {
            Some(parent) => format!("{own} && {}", self.flatten_conditional(parent)),
            None => own,
        }
    }

    fn flatten_own(&self, conditional: ConditionalId) -> String {
        let branch = &self.conditionals[conditional.index()];
        if !branch.guards.is_empty() {
            let guards: Vec<String> = branch.guards.iter().map(|&guard| self.render(guard)).collect();
            return if guards.len() == 1 {
                guards.into_iter().next().unwrap_or_default()
            } else {
                format!("({})", guards.join(" || "))
            };
        }
        if !branch.exclusive_of.is_empty() {
            let negated: Vec<String> = branch
                .exclusive_of
                .iter()
                .map(|&excluded| format!("!({})", self.flatten_own(excluded)))
                .collect();
            return negated.join(" && ");
        }
        if branch.pinned { "true" } else { "false" }.to_string()
    }
}

#[cfg(test)]
#[path = "tests/conditional_tests.rs"]
mod conditional_tests;
