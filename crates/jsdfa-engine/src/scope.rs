//! Lexical scopes and name resolution.
//!
//! A scope is created for the program and for every function body. It
//! records:
//!
//! - `definitions`: names declared in the scope (`var`, function declarations);
//! - `closure`: per-call slots for parameters and `this`;
//! - `modified`: shadow chains of writes to variables of enclosing scopes,
//!   moved to the real variable after a simulated call;
//! - `pending`: writes whose target did not resolve yet, retried after every
//!   derivation pass;
//! - `anonymous`: uses with no resolvable host variable.
//!
//! Locations inside a scope are offsets from `base`, the start of the scope's
//! AST, so a function body orders its entries independently of its position
//! in the file.

use crate::analyzer::Analyzer;
use crate::ids::{ConditionalId, ScopeId, StatementId, ValueId, VariableId};
use crate::statement::{Statement, StatementKind};
use crate::variable::VariableKind;
use indexmap::IndexMap;
use jsdfa_ast::{NodeData, NodeIndex, SyntaxKind};
use jsdfa_common::{DiagnosticKind, Loc, Position};
use rustc_hash::FxHashSet;
use tracing::trace;

/// A write that could not be attached yet.
#[derive(Clone, Debug)]
pub struct PendingAssignment {
    pub target: NodeIndex,
    pub value: NodeIndex,
    pub loc: Loc,
    pub conditional: Option<ConditionalId>,
}

#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Program or function body node.
    pub ast: NodeIndex,
    pub base: Loc,
    pub return_variable: VariableId,
    pub(crate) definitions: IndexMap<String, VariableId>,
    pub(crate) closure: IndexMap<String, VariableId>,
    pub(crate) modified: IndexMap<String, VariableId>,
    pub(crate) pending: Vec<PendingAssignment>,
    pub(crate) anonymous: Vec<StatementId>,
    /// Scope of the live call that is executing this one.
    pub(crate) caller: Option<ScopeId>,
    /// Start and end of that call, in the caller's coordinates.
    pub(crate) call_loc: Loc,
    pub(crate) call_end: Loc,
}

impl Scope {
    pub fn definitions(&self) -> impl Iterator<Item = (&str, VariableId)> {
        self.definitions.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn closure(&self) -> impl Iterator<Item = (&str, VariableId)> {
        self.closure.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn modified(&self) -> impl Iterator<Item = (&str, VariableId)> {
        self.modified.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn pending(&self) -> &[PendingAssignment] {
        &self.pending
    }

    pub fn anonymous(&self) -> &[StatementId] {
        &self.anonymous
    }

    pub fn caller(&self) -> Option<ScopeId> {
        self.caller
    }
}

/// A resolved assignment or read target: a variable plus the member path
/// below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableRef {
    pub variable: VariableId,
    pub path: Vec<NodeIndex>,
}

impl Analyzer {
    pub(crate) fn new_scope(&mut self, parent: Option<ScopeId>, ast: NodeIndex) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let return_variable = self.new_variable("return", Some(id), VariableKind::Return);
        let base = self.arena.start(ast).map_or(Loc::HOISTED, Loc::from_position);
        self.scopes.push(Scope {
            parent,
            children: Vec::new(),
            ast,
            base,
            return_variable,
            definitions: IndexMap::new(),
            closure: IndexMap::new(),
            modified: IndexMap::new(),
            pending: Vec::new(),
            anonymous: Vec::new(),
            caller: None,
            call_loc: Loc::UNORDERED,
            call_end: Loc::UNORDERED,
        });
        if let Some(parent) = parent {
            self.scopes[parent.index()].children.push(id);
        }
        id
    }

    /// Declare `name` in `scope`. Declaring an existing name returns the
    /// existing variable.
    pub fn define(&mut self, scope: ScopeId, name: &str) -> VariableId {
        if let Some(&existing) = self.scopes[scope.index()].definitions.get(name) {
            return existing;
        }
        let variable = self.new_variable(name, Some(scope), VariableKind::Binding);
        self.scopes[scope.index()]
            .definitions
            .insert(name.to_string(), variable);
        variable
    }

    /// Variable bound to `name` directly in `scope`.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<VariableId> {
        let scope = &self.scopes[scope.index()];
        scope
            .definitions
            .get(name)
            .or_else(|| scope.closure.get(name))
            .copied()
    }

    /// Innermost scope, starting at `scope`, that binds `name`.
    pub fn find_defined_scope(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.lookup(id, name).is_some() {
                return Some(id);
            }
            current = self.scopes[id.index()].parent;
        }
        None
    }

    /// Whether `scope` is `ancestor` or lexically nested in it.
    pub fn in_scope(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.scopes[id.index()].parent;
        }
        false
    }

    pub fn offset_loc(&self, scope: ScopeId, position: Option<Position>) -> Option<Loc> {
        position.map(|position| Loc::from_position(position).relative_to(self.scopes[scope.index()].base))
    }

    pub(crate) fn start_loc(&self, scope: ScopeId, node: NodeIndex) -> Option<Loc> {
        self.offset_loc(scope, self.arena.start(node))
    }

    pub(crate) fn end_loc(&self, scope: ScopeId, node: NodeIndex) -> Option<Loc> {
        self.offset_loc(scope, self.arena.end(node))
    }

    /// Location of the end of the scope's own AST.
    pub fn scope_end(&self, scope: ScopeId) -> Loc {
        self.end_loc(scope, self.scopes[scope.index()].ast)
            .unwrap_or(Loc::UNORDERED)
    }

    /// Scope on the live caller chain of `scope` that was called directly
    /// from `target`.
    fn connecting_call(&self, scope: ScopeId, target: ScopeId) -> Option<ScopeId> {
        let mut seen = FxHashSet::default();
        let mut current = scope;
        while seen.insert(current) {
            let caller = self.scopes[current.index()].caller?;
            if caller == target {
                return Some(current);
            }
            current = caller;
        }
        None
    }

    /// Location, in `target`'s coordinates, of the live call through which
    /// `scope` was reached from `target`. Reads made by the callee happen
    /// here.
    pub(crate) fn call_site_in(&self, scope: ScopeId, target: ScopeId) -> Option<Loc> {
        self.connecting_call(scope, target)
            .map(|callee| self.scopes[callee.index()].call_loc)
    }

    /// End of that call; writes made by the callee take effect here.
    pub(crate) fn call_end_in(&self, scope: ScopeId, target: ScopeId) -> Option<Loc> {
        self.connecting_call(scope, target)
            .map(|callee| self.scopes[callee.index()].call_end)
    }

    /// Whether `body` is executing somewhere on the caller chain of `scope`.
    pub(crate) fn on_caller_chain(&self, scope: ScopeId, body: ScopeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == body {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.scopes[id.index()].caller;
        }
        false
    }

    /// Reset per-call state before a scope is executed again.
    pub(crate) fn clear_scope(&mut self, scope: ScopeId) {
        let definitions: Vec<VariableId> = self.scopes[scope.index()].definitions.values().copied().collect();
        for variable in definitions {
            self.variables[variable.index()].chain.clear();
        }
        let return_variable = self.scopes[scope.index()].return_variable;
        self.variables[return_variable.index()].chain.clear();
        let state = &mut self.scopes[scope.index()];
        state.closure.clear();
        state.modified.clear();
        state.pending.clear();
        state.anonymous.clear();
        state.caller = None;
        state.call_loc = Loc::UNORDERED;
        state.call_end = Loc::UNORDERED;
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Record the write `target = value` at `loc`.
    ///
    /// Writes to a variable of this scope go on its chain, writes to a
    /// variable of an enclosing scope go on a shadow chain, and writes whose
    /// target does not resolve are queued. Assigning an undeclared name
    /// declares it globally when done from the global scope and is reported
    /// otherwise. Returns the recorded statement.
    pub fn assign(&mut self, scope: ScopeId, target: NodeIndex, value: NodeIndex, loc: Loc) -> Option<StatementId> {
        self.assign_tagged(scope, target, value, loc, None)
    }

    pub(crate) fn assign_tagged(
        &mut self,
        scope: ScopeId,
        target: NodeIndex,
        value: NodeIndex,
        loc: Loc,
        conditional: Option<ConditionalId>,
    ) -> Option<StatementId> {
        let Some(resolved) = self.infer_variable(scope, target) else {
            if let Some(name) = self.arena.identifier_name(target).map(str::to_string) {
                let global = self.global_scope();
                let variable = self.define(global, &name);
                if scope != global {
                    self.report(
                        DiagnosticKind::MissingDeclaration,
                        format!("`{name}` is assigned without a declaration"),
                        Some(target),
                    );
                    return None;
                }
                let statement = self.new_assignment(Vec::new(), value, scope);
                self.statements[statement.index()].conditional = conditional;
                self.add_node(variable, statement, Some(loc));
                return Some(statement);
            }
            self.queue_pending(scope, target, value, loc, conditional);
            return None;
        };

        let VariableRef { variable, path } = resolved;
        let owner = self.variables[variable.index()].scope;
        let name = self.variables[variable.index()].name.clone();
        let host = match owner {
            Some(owner) if owner == scope => variable,
            Some(owner) if self.in_scope(scope, owner) => self.modified_shadow(scope, &name, owner),
            _ => {
                self.queue_pending(scope, target, value, loc, conditional);
                return None;
            }
        };
        let statement = self.new_assignment(path, value, scope);
        self.statements[statement.index()].conditional = conditional;
        self.add_node(host, statement, Some(loc));
        Some(statement)
    }

    /// Record `return value` at `loc`.
    pub(crate) fn assign_return(&mut self, scope: ScopeId, value: NodeIndex, loc: Loc) -> StatementId {
        let statement = self.new_assignment(Vec::new(), value, scope);
        let return_variable = self.scopes[scope.index()].return_variable;
        self.add_node(return_variable, statement, Some(loc));
        statement
    }

    fn queue_pending(
        &mut self,
        scope: ScopeId,
        target: NodeIndex,
        value: NodeIndex,
        loc: Loc,
        conditional: Option<ConditionalId>,
    ) {
        let pending = &mut self.scopes[scope.index()].pending;
        if pending.iter().any(|entry| entry.target == target && entry.loc == loc) {
            return;
        }
        pending.push(PendingAssignment {
            target,
            value,
            loc,
            conditional,
        });
        self.report(
            DiagnosticKind::UnresolvableAssignmentTarget,
            "assignment target does not resolve yet",
            Some(target),
        );
    }

    /// Retry every queued write of `scope`. Writes that still fail are
    /// queued again.
    pub(crate) fn solve_pending(&mut self, scope: ScopeId) {
        let pending = std::mem::take(&mut self.scopes[scope.index()].pending);
        if pending.is_empty() {
            return;
        }
        trace!(scope = scope.0, count = pending.len(), "retrying pending assignments");
        for entry in pending {
            self.assign_tagged(scope, entry.target, entry.value, entry.loc, entry.conditional);
        }
    }

    /// Shadow chain in `scope` for writes to `name` of the enclosing scope
    /// `defined_in`.
    fn modified_shadow(&mut self, scope: ScopeId, name: &str, defined_in: ScopeId) -> VariableId {
        if let Some(&existing) = self.scopes[scope.index()].modified.get(name) {
            return existing;
        }
        let shadow = self.new_variable(name, Some(scope), VariableKind::Modified { defined_in });
        self.scopes[scope.index()]
            .modified
            .insert(name.to_string(), shadow);
        shadow
    }

    /// Hidden variable holding an unnamed object, array, function or call
    /// result that a member access is rooted at.
    pub(crate) fn create_anonymous(&mut self, scope: ScopeId, expression: NodeIndex) -> VariableId {
        let variable = self.new_variable("<anonymous>", Some(scope), VariableKind::Anonymous);
        let statement = self.new_assignment(Vec::new(), expression, scope);
        self.add_node(variable, statement, Some(Loc::HOISTED));
        variable
    }

    // =========================================================================
    // Uses
    // =========================================================================

    /// Record that `expression` (a call) is evaluated for its effects on
    /// `target` at `loc`.
    pub fn use_expression(
        &mut self,
        scope: ScopeId,
        target: NodeIndex,
        expression: NodeIndex,
        loc: Loc,
    ) -> StatementId {
        let statement = self.add_statement(Statement {
            loc,
            scope: Some(scope),
            host: None,
            conditional: None,
            kind: StatementKind::Use { expression },
        });
        let host = match self.infer_variable(scope, target) {
            Some(VariableRef { variable, .. }) => {
                let resolved = &self.variables[variable.index()];
                let anonymous = matches!(resolved.kind, VariableKind::Anonymous);
                let owner = resolved.scope;
                let name = resolved.name.clone();
                match owner {
                    _ if anonymous => None,
                    Some(owner) if owner == scope => Some(variable),
                    Some(owner) if self.in_scope(scope, owner) => {
                        Some(self.modified_shadow(scope, &name, owner))
                    }
                    _ => None,
                }
            }
            None => None,
        };
        match host {
            Some(host) => self.add_node(host, statement, Some(loc)),
            None => self.scopes[scope.index()].anonymous.push(statement),
        }
        statement
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve the variable an expression reads or writes, plus the member
    /// path below it.
    ///
    /// Identifiers and `this` resolve through the lexical scope of the node.
    /// Member chains resolve their root; a root that is an object, array or
    /// function literal gets a hidden variable, and a call root is executed
    /// and resolves to the callee's return variable.
    pub fn infer_variable(&mut self, scope: ScopeId, expression: NodeIndex) -> Option<VariableRef> {
        let closure = self.scope_of(expression).unwrap_or(scope);

        let name = match &self.arena.get(expression)?.data {
            NodeData::Identifier { name } => Some(name.clone()),
            NodeData::ThisExpression => Some("this".to_string()),
            _ => None,
        };
        if let Some(name) = name {
            let Some(defined) = self.find_defined_scope(closure, &name) else {
                return None;
            };
            let variable = self.lookup(defined, &name)?;
            return Some(VariableRef {
                variable,
                path: Vec::new(),
            });
        }

        let mut path = Vec::new();
        let mut root = expression;
        while let Some(&NodeData::MemberExpression {
            object, property, ..
        }) = self.arena.get(root).map(|node| &node.data)
        {
            path.push(property);
            root = object;
        }
        if root == expression {
            return None;
        }
        path.reverse();

        match self.arena.kind(root)? {
            SyntaxKind::Identifier | SyntaxKind::ThisExpression => {
                let mut resolved = self.infer_variable(scope, root)?;
                resolved.path = path;
                Some(resolved)
            }
            SyntaxKind::ObjectExpression | SyntaxKind::ArrayExpression | SyntaxKind::FunctionExpression => {
                let variable = self.create_anonymous(closure, root);
                Some(VariableRef { variable, path })
            }
            SyntaxKind::CallExpression => {
                let NodeData::CallExpression { callee, .. } = self.arena.node(root).data else {
                    return None;
                };
                let loc = self.start_loc(scope, callee);
                let function = self.infer_value(scope, callee, loc)?;
                let return_variable = self.execute(function, root, scope)?;
                if self.inference(return_variable, None, &[]).is_none() {
                    self.report(
                        DiagnosticKind::UndefinedReturn,
                        "call used as a member root returned nothing",
                        Some(root),
                    );
                    return None;
                }
                Some(VariableRef {
                    variable: return_variable,
                    path,
                })
            }
            _ => None,
        }
    }

    /// Value of an expression as seen from `scope` at `loc`.
    ///
    /// A variable of another scope is read at the location of the live call
    /// that connects the two scopes; with no such call, and for hidden
    /// variables, the latest value is used.
    pub fn infer_value(&mut self, scope: ScopeId, expression: NodeIndex, loc: Option<Loc>) -> Option<ValueId> {
        let Some(VariableRef { variable, path }) = self.infer_variable(scope, expression) else {
            self.report(
                DiagnosticKind::InvalidReference,
                "expression has no host variable",
                Some(expression),
            );
            return None;
        };
        let resolved = &self.variables[variable.index()];
        let loc = match (&resolved.kind, resolved.scope) {
            (VariableKind::Anonymous, _) => None,
            (_, Some(owner)) if owner == scope => loc,
            (_, Some(owner)) => self.call_site_in(scope, owner),
            (_, None) => None,
        };
        let value = self.inference(variable, loc, &path);
        if value.is_none() {
            self.report(
                DiagnosticKind::UndefinedReference,
                "no value reaches this point",
                Some(expression),
            );
        }
        value
    }

    /// Every statement a derivation of `scope` visits: the chains of the
    /// scope's variables and shadows, the return chain and anonymous uses.
    pub(crate) fn worklist(&self, scope: ScopeId) -> Vec<StatementId> {
        let state = &self.scopes[scope.index()];
        let variables = state
            .definitions
            .values()
            .chain(state.closure.values())
            .chain(state.modified.values())
            .chain(std::iter::once(&state.return_variable));
        let mut seen = FxHashSet::default();
        let mut statements: Vec<StatementId> = Vec::new();
        for &variable in variables {
            if !seen.insert(variable) {
                continue;
            }
            statements.extend(self.variables[variable.index()].chain.iter().copied());
        }
        statements.extend(state.anonymous.iter().copied());
        statements
    }
}

#[cfg(test)]
#[path = "tests/scope_tests.rs"]
mod scope_tests;
