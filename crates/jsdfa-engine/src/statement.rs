//! Chain entries.

use crate::analyzer::Analyzer;
use crate::ids::{ConditionalId, ScopeId, StatementId, ValueId, VariableId};
use jsdfa_ast::NodeIndex;
use jsdfa_common::Loc;

#[derive(Clone, Debug)]
pub enum StatementKind {
    /// `host.path = value`; an empty path writes the whole variable.
    Assign {
        access_path: Vec<NodeIndex>,
        value: ValueId,
    },
    /// A call evaluated for its side effects.
    Use { expression: NodeIndex },
}

#[derive(Clone, Debug)]
pub struct Statement {
    pub loc: Loc,
    pub scope: Option<ScopeId>,
    pub host: Option<VariableId>,
    pub conditional: Option<ConditionalId>,
    pub kind: StatementKind,
}

impl Statement {
    pub fn is_assign(&self) -> bool {
        matches!(self.kind, StatementKind::Assign { .. })
    }

    pub fn value(&self) -> Option<ValueId> {
        match self.kind {
            StatementKind::Assign { value, .. } => Some(value),
            StatementKind::Use { .. } => None,
        }
    }
}

impl Analyzer {
    /// New unattached write of the value of `ast`.
    pub(crate) fn new_assignment(&mut self, access_path: Vec<NodeIndex>, ast: NodeIndex, scope: ScopeId) -> StatementId {
        let value = self.value_from_ast(ast, Some(scope));
        self.new_assignment_of(access_path, value)
    }

    pub(crate) fn new_assignment_of(&mut self, access_path: Vec<NodeIndex>, value: ValueId) -> StatementId {
        self.add_statement(Statement {
            loc: Loc::UNORDERED,
            scope: None,
            host: None,
            conditional: None,
            kind: StatementKind::Assign { access_path, value },
        })
    }

    /// Bind a written value to its statement: resolve computed path segments
    /// to literal keys where possible and name the value after the last
    /// segment, or after the host variable for whole-value writes.
    pub(crate) fn attach_value(&mut self, statement: StatementId, value: ValueId) {
        let host = self.statements[statement.index()].host;
        let StatementKind::Assign { access_path, .. } = &self.statements[statement.index()].kind else {
            return;
        };
        let mut access_path = access_path.clone();
        let scope = self.values[value.index()].scope;
        for segment in access_path.iter_mut() {
            if self.node_literal(*segment).is_some() {
                continue;
            }
            if let Some(resolved) = self.resolve_segment(*segment, scope) {
                *segment = resolved;
            }
        }

        let name = match access_path.last() {
            Some(&last) => self.node_literal(last).map(|key| key.property_key()),
            None => host.map(|host| self.variables[host.index()].name.clone()),
        };
        let entry = &mut self.values[value.index()];
        entry.host = Some(statement);
        entry.target_variable = host;
        if name.is_some() {
            entry.name = name;
        }
        if let StatementKind::Assign {
            access_path: ref mut path,
            ..
        } = self.statements[statement.index()].kind
        {
            *path = access_path;
        }
    }

    /// Derive one statement in place.
    pub fn derive_statement(&mut self, statement: StatementId) {
        let entry = &self.statements[statement.index()];
        let scope = entry.scope;
        let conditional = entry.conditional;
        match entry.kind {
            StatementKind::Assign { value, .. } => {
                if let Some(conditional) = conditional {
                    self.derive_conditional(conditional);
                }
                self.derive_value(value);
            }
            StatementKind::Use { expression } => {
                let value = self.value_from_ast(expression, scope);
                self.derive_value(value);
                let derived = self.derived_ast(value);
                self.set_use_expression(statement, derived);
            }
        }
    }

    /// Reduce one statement in place.
    pub fn reduce_statement(&mut self, statement: StatementId) {
        let entry = &self.statements[statement.index()];
        let scope = entry.scope;
        match entry.kind {
            StatementKind::Assign { value, .. } => self.reduce_value(value),
            StatementKind::Use { expression } => {
                let value = self.value_from_ast(expression, scope);
                self.reduce_value(value);
                let reduced = self.derived_ast(value);
                self.set_use_expression(statement, reduced);
            }
        }
    }

    fn set_use_expression(&mut self, statement: StatementId, expression: NodeIndex) {
        if let StatementKind::Use {
            expression: ref mut current,
        } = self.statements[statement.index()].kind
        {
            *current = expression;
        }
    }
}
