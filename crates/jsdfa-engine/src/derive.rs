//! Expression derivation.
//!
//! Deriving an expression value walks its tree and records, for every
//! identifier, `this`, member access and call it can resolve, the value that
//! node stands for at its location (the node's *reference*). Nodes whose
//! reference is an object or function are substituted during the walk, so
//! their contents are not derived again. The tree is then materialized: a
//! copy with every referenced node replaced by the referenced value's AST,
//! which becomes the value's new tree.

use crate::analyzer::Analyzer;
use crate::ids::{ScopeId, ValueId};
use crate::value::ValueKind;
use jsdfa_ast::{Function, NodeArena, NodeData, NodeIndex, SyntaxKind, Visit, Visitor, walk};
use jsdfa_common::DiagnosticKind;
use jsdfa_common::limits::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};

struct DeriveVisitor<'a> {
    analyzer: &'a mut Analyzer,
    scope: ScopeId,
}

impl Visitor for DeriveVisitor<'_> {
    fn arena(&mut self) -> &mut NodeArena {
        &mut self.analyzer.arena
    }

    fn before(&mut self, node: NodeIndex) -> Visit {
        match self.analyzer.kind_of(node) {
            Some(
                SyntaxKind::FunctionExpression
                | SyntaxKind::FunctionDeclaration
                | SyntaxKind::ObjectExpression
                | SyntaxKind::ArrayExpression
                | SyntaxKind::MemberExpression,
            ) => Visit::Skip,
            _ => Visit::Descend,
        }
    }

    fn after(&mut self, node: NodeIndex, _origin: Option<NodeIndex>) -> Option<NodeIndex> {
        let analyzer = &mut *self.analyzer;
        let derived = match analyzer.kind_of(node) {
            Some(SyntaxKind::Identifier | SyntaxKind::ThisExpression | SyntaxKind::MemberExpression) => {
                let loc = analyzer.start_loc(self.scope, node);
                analyzer.infer_value(self.scope, node, loc)
            }
            Some(SyntaxKind::CallExpression | SyntaxKind::NewExpression) => {
                analyzer.call_expression_derivation(self.scope, node)
            }
            _ => None,
        };
        if let Some(value) = derived {
            analyzer.references.insert(node, value);
        }
        None
    }

    fn substitution(&mut self, node: NodeIndex) -> Option<NodeIndex> {
        if !self.analyzer.references.contains_key(&node) {
            return None;
        }
        let value = self.analyzer.get_reference(node)?;
        let entry = self.analyzer.value(value);
        matches!(entry.kind, ValueKind::Object { .. } | ValueKind::Function { .. }).then_some(entry.ast)
    }

    fn expand(&mut self, node: NodeIndex) -> NodeIndex {
        self.analyzer.expand_reference(node)
    }

    fn circular_reference(&mut self, node: NodeIndex) {
        self.analyzer
            .report(DiagnosticKind::CircularReference, "substitution refers to itself", Some(node));
    }

    fn circular_ast(&mut self, node: NodeIndex) {
        self.analyzer
            .report(DiagnosticKind::CircularAst, "node is its own ancestor", Some(node));
    }
}

/// Substitutes every referenced node, turning declarations spliced in as
/// values into function expressions.
struct SubstituteVisitor<'a> {
    analyzer: &'a mut Analyzer,
}

impl Visitor for SubstituteVisitor<'_> {
    fn arena(&mut self) -> &mut NodeArena {
        &mut self.analyzer.arena
    }

    fn before(&mut self, node: NodeIndex) -> Visit {
        match self.analyzer.kind_of(node) {
            Some(kind) if kind.is_function() => Visit::Skip,
            _ => Visit::Descend,
        }
    }

    fn after(&mut self, node: NodeIndex, origin: Option<NodeIndex>) -> Option<NodeIndex> {
        origin?;
        let analyzer = &mut *self.analyzer;
        if let NodeData::FunctionDeclaration(Function { params, body, .. }) = &analyzer.arena.node(node).data {
            let expression = NodeData::FunctionExpression(Function {
                id: None,
                params: params.clone(),
                body: *body,
            });
            return Some(analyzer.alloc_like(expression, Some(node)));
        }
        Some(node)
    }

    fn substitution(&mut self, node: NodeIndex) -> Option<NodeIndex> {
        if !self.analyzer.references.contains_key(&node) {
            return None;
        }
        let value = self.analyzer.get_reference(node)?;
        Some(self.analyzer.value(value).ast)
    }

    fn expand(&mut self, node: NodeIndex) -> NodeIndex {
        self.analyzer.expand_reference(node)
    }

    fn circular_reference(&mut self, node: NodeIndex) {
        self.analyzer
            .report(DiagnosticKind::CircularReference, "substitution refers to itself", Some(node));
    }

    fn circular_ast(&mut self, node: NodeIndex) {
        self.analyzer
            .report(DiagnosticKind::CircularAst, "node is its own ancestor", Some(node));
    }
}

impl Analyzer {
    /// Node standing in for a referenced node: objects and arrays are
    /// rebuilt at the node's location, anything else is the value's AST.
    pub(crate) fn expand_reference(&mut self, node: NodeIndex) -> NodeIndex {
        let Some(value) = self.get_reference(node) else {
            return node;
        };
        if self.values[value.index()].kind.is_object() {
            let loc = self.arena.loc(node);
            self.derived_ast_at(value, loc)
        } else {
            self.values[value.index()].ast
        }
    }

    /// Copy of `ast` with every referenced node replaced by its value.
    pub fn materialize(&mut self, ast: NodeIndex) -> NodeIndex {
        let copy = self.clone_tree(ast);
        let mut visitor = SubstituteVisitor { analyzer: self };
        walk(&mut visitor, copy)
    }

    /// Derive a value in place. Objects, arrays and functions derive their
    /// children; expressions are walked, materialized and reclassified.
    pub fn derive_value(&mut self, value: ValueId) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || self.derive_value_inner(value));
    }

    fn derive_value_inner(&mut self, value: ValueId) {
        let entry = &self.values[value.index()];
        match &entry.kind {
            ValueKind::Literal => {}
            ValueKind::Object { properties, .. } | ValueKind::Function { properties } => {
                let children: Vec<ValueId> = properties.values().copied().collect();
                for child in children {
                    self.derive_value(child);
                }
            }
            ValueKind::Array {
                elements,
                properties,
                ..
            } => {
                let children: Vec<ValueId> = elements
                    .iter()
                    .flatten()
                    .chain(properties.values())
                    .copied()
                    .collect();
                for child in children {
                    self.derive_value(child);
                }
            }
            ValueKind::Expression => {
                let ast = entry.ast;
                let scope = entry.scope.unwrap_or_else(|| self.global_scope());
                let mut visitor = DeriveVisitor { analyzer: self, scope };
                let ast = walk(&mut visitor, ast);
                let derived = self.materialize(ast);
                self.update_value(value, derived);
            }
        }
    }

    /// Value of a call or `new` expression: simulate the callee and read its
    /// return variable. A `new` whose callee returns nothing yields the
    /// constructed object.
    pub(crate) fn call_expression_derivation(&mut self, scope: ScopeId, call: NodeIndex) -> Option<ValueId> {
        let (callee, is_new) = match &self.arena.get(call)?.data {
            NodeData::CallExpression { callee, .. } => (*callee, false),
            NodeData::NewExpression { callee, .. } => (*callee, true),
            _ => return None,
        };
        let closure = self.scope_of(call).unwrap_or(scope);

        let referenced = match self.references.contains_key(&callee) {
            true => self.get_reference(callee),
            false => None,
        };
        let function = match referenced {
            Some(value) if self.values[value.index()].kind.is_function() => value,
            _ if self.kind_of(callee) == Some(SyntaxKind::FunctionExpression) => {
                self.value_from_ast(callee, Some(closure))
            }
            _ => {
                let loc = self.start_loc(scope, callee);
                let value = self.infer_value(scope, callee, loc)?;
                if !self.values[value.index()].kind.is_function() {
                    return None;
                }
                value
            }
        };

        let return_variable = self.execute(function, call, scope)?;
        let returned = self.inference(return_variable, None, &[]);
        if returned.is_some() || !is_new {
            return returned;
        }
        let body_scope = self.function_body_scope(function)?;
        let this = self.lookup(body_scope, "this")?;
        self.inference(this, None, &[])
    }
}

#[cfg(test)]
#[path = "tests/derive_tests.rs"]
mod derive_tests;
