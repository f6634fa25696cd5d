//! Scope tree construction and scope initialization.

use crate::analyzer::Analyzer;
use crate::ids::{ConditionalId, ScopeId, StatementId};
use jsdfa_ast::{
    BinaryOperator, LiteralValue, NodeArena, NodeData, NodeIndex, SyntaxKind, Visit, Visitor, walk, walk_all,
};
use jsdfa_common::Loc;
use tracing::debug;

/// Annotates every node with its scope, declares names and normalizes
/// non-computed member properties to string keys.
struct ScopeBuilder<'a> {
    analyzer: &'a mut Analyzer,
    stack: Vec<ScopeId>,
}

impl ScopeBuilder<'_> {
    fn current(&self) -> ScopeId {
        self.stack.last().copied().unwrap_or(ScopeId(0))
    }
}

impl Visitor for ScopeBuilder<'_> {
    fn arena(&mut self) -> &mut NodeArena {
        &mut self.analyzer.arena
    }

    fn before(&mut self, node: NodeIndex) -> Visit {
        let current = self.current();
        self.analyzer.scope_of.insert(node, current);
        let analyzer = &mut *self.analyzer;

        match &analyzer.arena.node(node).data {
            NodeData::FunctionDeclaration(function) | NodeData::FunctionExpression(function) => {
                let is_declaration = analyzer.arena.node(node).kind() == SyntaxKind::FunctionDeclaration;
                let body = function.body;
                let name = function
                    .id
                    .and_then(|id| analyzer.arena.identifier_name(id))
                    .map(str::to_string);
                if is_declaration && let Some(name) = name {
                    analyzer.define(current, &name);
                }
                let scope = analyzer.new_scope(Some(current), body);
                self.stack.push(scope);
            }
            NodeData::VariableDeclarator { id, .. } => {
                if let Some(name) = analyzer.arena.identifier_name(*id).map(str::to_string) {
                    analyzer.define(current, &name);
                }
            }
            &NodeData::MemberExpression {
                object,
                property,
                computed: false,
            } => {
                if let Some(name) = analyzer.arena.identifier_name(property).map(str::to_string) {
                    let key = analyzer.alloc_literal(LiteralValue::String(name), Some(property));
                    if let Some(member) = analyzer.arena.get_mut(node) {
                        member.data = NodeData::MemberExpression {
                            object,
                            property: key,
                            computed: true,
                        };
                    }
                }
            }
            _ => {}
        }
        Visit::Descend
    }

    fn after(&mut self, node: NodeIndex, _origin: Option<NodeIndex>) -> Option<NodeIndex> {
        if self.analyzer.kind_of(node).is_some_and(SyntaxKind::is_function) {
            self.stack.pop();
        }
        None
    }
}

/// Turns the declarative shapes of one scope into chain entries. Nested
/// functions are left to their own initialization.
struct Initializer<'a> {
    analyzer: &'a mut Analyzer,
    scope: ScopeId,
    branch: Option<ConditionalId>,
}

impl Initializer<'_> {
    fn end_loc(&self, node: NodeIndex) -> Loc {
        self.analyzer
            .end_loc(self.scope, node)
            .unwrap_or(Loc::UNORDERED)
    }

    fn tag(&mut self, statement: Option<StatementId>) {
        if let (Some(statement), Some(branch)) = (statement, self.branch) {
            self.analyzer.statements[statement.index()].conditional = Some(branch);
        }
    }

    fn assign(&mut self, node: NodeIndex, target: NodeIndex, value: NodeIndex, loc: Loc) {
        let scope = self.analyzer.scope_of(node).unwrap_or(self.scope);
        let statement = self
            .analyzer
            .assign_tagged(scope, target, value, loc, self.branch);
        self.tag(statement);
    }

    /// `a = b = c` records one write per target; `a += b` writes `a + b`.
    fn assignment_chain(&mut self, node: NodeIndex) {
        let mut targets = Vec::new();
        let mut current = node;
        while let NodeData::AssignmentExpression {
            operator,
            left,
            right,
        } = self.analyzer.arena.node(current).data
        {
            targets.push((left, operator));
            current = right;
        }
        let loc = self.end_loc(node);
        let mut value = current;
        for (target, operator) in targets.into_iter().rev() {
            if let Some(binary) = operator.binary() {
                value = self.analyzer.alloc_like(
                    NodeData::BinaryExpression {
                        operator: binary,
                        left: target,
                        right: value,
                    },
                    Some(node),
                );
            }
            self.assign(node, target, value, loc);
        }
    }

    fn if_statement(&mut self, consequent: NodeIndex, alternate: Option<NodeIndex>, test: NodeIndex) {
        let analyzer = &mut *self.analyzer;
        let taken = analyzer.new_conditional(self.scope, self.branch);
        analyzer.or_guard(taken, test);
        self.enter_branch(taken, consequent);

        if let Some(alternate) = alternate {
            let otherwise = self.analyzer.new_conditional(self.scope, self.branch);
            self.analyzer.conditionals[taken.index()].alternate = Some(otherwise);
            self.analyzer.conditionals[otherwise.index()].exclusive_of = vec![taken];
            self.enter_branch(otherwise, alternate);
        }
    }

    /// Each case is a branch guarded by `discriminant == test`; `default`
    /// is taken when no case is. Fall-through is not modeled.
    fn switch_statement(&mut self, discriminant: NodeIndex, cases: Vec<NodeIndex>) {
        let mut guarded = Vec::new();
        let mut default = None;
        for case in cases {
            let NodeData::SwitchCase { test, .. } = self.analyzer.arena.node(case).data else {
                continue;
            };
            let Some(test) = test else {
                default = Some(case);
                continue;
            };
            let branch = self.analyzer.new_conditional(self.scope, self.branch);
            let guard = self.analyzer.alloc_like(
                NodeData::BinaryExpression {
                    operator: BinaryOperator::Eq,
                    left: discriminant,
                    right: test,
                },
                Some(test),
            );
            self.analyzer.or_guard(branch, guard);
            self.enter_branch(branch, case);
            guarded.push(branch);
        }
        if let Some(case) = default {
            let branch = self.analyzer.new_conditional(self.scope, self.branch);
            self.analyzer.conditionals[branch.index()].exclusive_of = guarded;
            self.enter_branch(branch, case);
        }
    }

    /// Set the span of `branch` to `body` and initialize `body` inside it.
    fn enter_branch(&mut self, branch: ConditionalId, body: NodeIndex) {
        let start = self.analyzer.start_loc(self.scope, body).unwrap_or(Loc::HOISTED);
        let end = self.end_loc(body);
        let entry = &mut self.analyzer.conditionals[branch.index()];
        entry.start = start;
        entry.end = end;

        let roots = match &self.analyzer.arena.node(body).data {
            NodeData::SwitchCase { consequent, .. } => consequent.clone(),
            _ => vec![body],
        };
        let mut nested = Initializer {
            analyzer: &mut *self.analyzer,
            scope: self.scope,
            branch: Some(branch),
        };
        walk_all(&mut nested, &roots);
    }
}

impl Visitor for Initializer<'_> {
    fn arena(&mut self) -> &mut NodeArena {
        &mut self.analyzer.arena
    }

    fn before(&mut self, node: NodeIndex) -> Visit {
        match self.analyzer.arena.node(node).data.clone() {
            NodeData::FunctionDeclaration(function) => {
                if let Some(id) = function.id {
                    self.assign(node, id, node, Loc::HOISTED);
                }
                Visit::Skip
            }
            NodeData::FunctionExpression(_) => Visit::Skip,
            NodeData::VariableDeclarator { id, init } => {
                if let Some(init) = init {
                    let loc = self.end_loc(node);
                    self.assign(node, id, init, loc);
                }
                Visit::Skip
            }
            NodeData::AssignmentExpression { .. } => {
                self.assignment_chain(node);
                Visit::Skip
            }
            NodeData::ExpressionStatement { expression } => {
                match self.analyzer.arena.node(expression).data {
                    NodeData::CallExpression { callee, .. } | NodeData::NewExpression { callee, .. } => {
                        let loc = self.end_loc(node);
                        let scope = self.analyzer.scope_of(node).unwrap_or(self.scope);
                        let statement = self.analyzer.use_expression(scope, callee, expression, loc);
                        self.tag(Some(statement));
                        Visit::Skip
                    }
                    _ => Visit::Descend,
                }
            }
            NodeData::ReturnStatement { argument } => {
                if let Some(argument) = argument {
                    let loc = self.end_loc(node);
                    let statement = self.analyzer.assign_return(self.scope, argument, loc);
                    self.tag(Some(statement));
                }
                Visit::Skip
            }
            NodeData::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.if_statement(consequent, alternate, test);
                Visit::Skip
            }
            NodeData::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.switch_statement(discriminant, cases);
                Visit::Skip
            }
            _ => Visit::Descend,
        }
    }
}

impl Analyzer {
    /// Create the scope tree below `root` and return the root scope.
    pub(crate) fn build_scope_tree(&mut self, root: NodeIndex) -> ScopeId {
        let global = self.new_scope(None, root);
        let mut builder = ScopeBuilder {
            analyzer: self,
            stack: vec![global],
        };
        walk(&mut builder, root);
        debug!(scopes = self.scopes.len(), nodes = self.arena.len(), "scope tree built");
        global
    }

    /// Record the declarations, writes, uses and returns found in the AST of
    /// `scope` on the matching chains.
    pub fn initialize(&mut self, scope: ScopeId) {
        let ast = self.scopes[scope.index()].ast;
        let _span = tracing::debug_span!("initialize", scope = scope.0).entered();
        let mut initializer = Initializer {
            analyzer: self,
            scope,
            branch: None,
        };
        walk(&mut initializer, ast);
    }
}

#[cfg(test)]
#[path = "tests/initialize_tests.rs"]
mod initialize_tests;
