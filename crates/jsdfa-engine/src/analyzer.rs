//! The analysis context.
//!
//! `Analyzer` owns the AST arena and every entity the analysis creates.
//! Entities refer to each other by id; node-keyed facts (owning scope,
//! derived reference, object prototype) live in side tables so AST nodes
//! stay plain data. The per-concern operations are implemented on
//! `Analyzer` in their own modules (`scope`, `variable`, `value`, ...).

use crate::conditional::ConditionalStatement;
use crate::function::BuiltinHook;
use crate::ids::{ConditionalId, RuleId, ScopeId, StatementId, ValueId, VariableId};
use crate::options::{AnalyzerOptions, Derivation};
use crate::reduce::{ReduceRule, ReduceRules};
use crate::scope::Scope;
use crate::statement::Statement;
use crate::value::{Value, ValueKind};
use crate::variable::{Variable, VariableKind};
use jsdfa_ast::{EstreeError, LiteralValue, NodeArena, NodeData, NodeIndex, SyntaxKind, render};
use jsdfa_common::{Diagnostic, DiagnosticKind, LogSink, Loc};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::debug;

pub struct Analyzer {
    pub(crate) arena: NodeArena,
    pub(crate) root: NodeIndex,

    pub(crate) scopes: Vec<Scope>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) statements: Vec<Statement>,
    pub(crate) values: Vec<Value>,
    pub(crate) conditionals: Vec<ConditionalStatement>,

    /// Innermost scope enclosing each annotated node.
    pub(crate) scope_of: FxHashMap<NodeIndex, ScopeId>,
    /// Value a node was derived to.
    pub(crate) references: FxHashMap<NodeIndex, ValueId>,
    /// Prototype carried by a rebuilt object literal.
    pub(crate) prototypes: FxHashMap<NodeIndex, ValueId>,
    /// Named and sparse properties carried by a rebuilt array literal.
    pub(crate) array_properties: FxHashMap<NodeIndex, Vec<(String, NodeIndex)>>,

    pub(crate) reduce_rules: ReduceRules,
    pub(crate) builtins: FxHashMap<String, BuiltinHook>,
    pub(crate) log: LogSink,
    pub(crate) options: AnalyzerOptions,
    /// Options of the innermost running derivation, inherited by simulated
    /// calls.
    pub(crate) active: Derivation,

    global: ScopeId,
    window: VariableId,
}

impl Analyzer {
    /// Build the scope tree of `root` and seed the global scope with the
    /// `window` object.
    pub fn new(arena: NodeArena, root: NodeIndex, options: AnalyzerOptions) -> Analyzer {
        let mut analyzer = Analyzer {
            arena,
            root,
            scopes: Vec::new(),
            variables: Vec::new(),
            statements: Vec::new(),
            values: Vec::new(),
            conditionals: Vec::new(),
            scope_of: FxHashMap::default(),
            references: FxHashMap::default(),
            prototypes: FxHashMap::default(),
            array_properties: FxHashMap::default(),
            reduce_rules: ReduceRules::with_builtins(),
            builtins: FxHashMap::default(),
            log: LogSink::new(options.enable_log),
            active: Derivation::with_order(options.order),
            options,
            global: ScopeId(0),
            window: VariableId(0),
        };
        analyzer.global = analyzer.build_scope_tree(root);
        analyzer.window = analyzer.seed_window();
        analyzer
    }

    /// Ingest an ESTree JSON document and build the analyzer for it.
    pub fn from_estree(
        json: &serde_json::Value,
        options: AnalyzerOptions,
    ) -> Result<Analyzer, EstreeError> {
        let (arena, root) = jsdfa_ast::from_estree(json)?;
        Ok(Analyzer::new(arena, root, options))
    }

    fn seed_window(&mut self) -> VariableId {
        let global = self.global;
        let window = self.define(global, "window");
        let object = self.new_object(Some(global), None);
        self.assign_value(window, object, Some(Loc::HOISTED));
        self.scopes[global.index()].closure.insert("this".to_string(), window);
        window
    }

    /// Initialize the global scope and run the top-level derivation.
    pub fn analyze(&mut self) {
        let _span = tracing::info_span!("analyze", order = self.options.order).entered();
        let global = self.global;
        self.initialize(global);
        let derivation = Derivation::with_order(self.options.order);
        self.derivation(global, None, &derivation);
        debug!(
            scopes = self.scopes.len(),
            statements = self.statements.len(),
            values = self.values.len(),
            diagnostics = self.log.entries().len(),
            "analysis finished"
        );
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn global_scope(&self) -> ScopeId {
        self.global
    }

    pub fn window(&self) -> VariableId {
        self.window
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn statement(&self, id: StatementId) -> &Statement {
        &self.statements[id.index()]
    }

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    pub fn conditional(&self, id: ConditionalId) -> &ConditionalStatement {
        &self.conditionals[id.index()]
    }

    /// Scope annotation of a node.
    pub fn scope_of(&self, node: NodeIndex) -> Option<ScopeId> {
        self.scope_of.get(&node).copied()
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut LogSink {
        &mut self.log
    }

    // =========================================================================
    // Convenience queries
    // =========================================================================

    /// Latest value of a global binding.
    pub fn value_of(&mut self, name: &str) -> Option<ValueId> {
        let variable = self.lookup(self.global, name)?;
        self.inference(variable, None, &[])
    }

    /// Literal payload of a literal value.
    pub fn literal(&self, value: ValueId) -> Option<&LiteralValue> {
        let value = &self.values[value.index()];
        match value.kind {
            ValueKind::Literal => self.arena.get(value.ast)?.literal(),
            _ => None,
        }
    }

    /// Source text of a value's derived AST.
    pub fn render_value(&mut self, value: ValueId) -> String {
        let ast = self.derived_ast(value);
        render(&self.arena, ast)
    }

    pub fn render(&self, node: NodeIndex) -> String {
        render(&self.arena, node)
    }

    // =========================================================================
    // Extension points
    // =========================================================================

    pub fn register_reduce_rule(&mut self, kind: SyntaxKind, rule: ReduceRule) -> RuleId {
        self.reduce_rules.register(kind, rule)
    }

    /// Remove one rule, or every rule for `kind` when `rule` is `None`.
    pub fn remove_reduce_rule(&mut self, kind: SyntaxKind, rule: Option<RuleId>) -> bool {
        self.reduce_rules.remove(kind, rule)
    }

    /// Attach a hook that runs after every simulated call of the function
    /// reachable through the dotted `path` (for example `lib.init`).
    pub fn register_builtin(&mut self, path: impl Into<String>, hook: BuiltinHook) {
        self.builtins.insert(path.into(), hook);
    }

    pub fn remove_builtin(&mut self, path: &str) -> bool {
        self.builtins.remove(path).is_some()
    }

    // =========================================================================
    // Internal helpers shared by the per-concern modules
    // =========================================================================

    /// Record a diagnostic about `node`.
    pub(crate) fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>, node: Option<NodeIndex>) {
        if !self.log.is_enabled() {
            return;
        }
        let mut diagnostic = Diagnostic::new(kind, message);
        if let Some(node) = node {
            diagnostic = diagnostic.with_node(self.arena.start(node), render(&self.arena, node));
        }
        self.log.push(diagnostic);
    }

    pub(crate) fn new_variable(&mut self, name: &str, scope: Option<ScopeId>, kind: VariableKind) -> VariableId {
        let id = VariableId(self.variables.len() as u32);
        self.variables.push(Variable::new(name, scope, kind));
        id
    }

    pub(crate) fn add_statement(&mut self, statement: Statement) -> StatementId {
        let id = StatementId(self.statements.len() as u32);
        self.statements.push(statement);
        id
    }

    pub(crate) fn add_value(&mut self, value: Value) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(value);
        id
    }

    pub(crate) fn add_conditional(&mut self, conditional: ConditionalStatement) -> ConditionalId {
        let id = ConditionalId(self.conditionals.len() as u32);
        self.conditionals.push(conditional);
        id
    }

    /// Allocate a node that inherits the location and annotations of `like`.
    pub(crate) fn alloc_like(&mut self, data: NodeData, like: Option<NodeIndex>) -> NodeIndex {
        let loc = like.and_then(|node| self.arena.loc(node));
        let index = self.arena.add(jsdfa_ast::Node::with_loc(data, loc));
        if let Some(like) = like
            && let Some(&scope) = self.scope_of.get(&like)
        {
            self.scope_of.insert(index, scope);
        }
        index
    }

    /// Allocate a literal node; reduction rules return these as results.
    pub fn alloc_literal(&mut self, value: LiteralValue, like: Option<NodeIndex>) -> NodeIndex {
        self.alloc_like(NodeData::Literal { value }, like)
    }

    /// Deep-copy a subtree, sharing function nodes and carrying the node
    /// annotations over to the copies.
    pub(crate) fn clone_tree(&mut self, root: NodeIndex) -> NodeIndex {
        let scope_of = &mut self.scope_of;
        let references = &mut self.references;
        let prototypes = &mut self.prototypes;
        let array_properties = &mut self.array_properties;
        self.arena.clone_subtree(
            root,
            |node| node.kind().is_function(),
            |original, copy| {
                if let Some(&scope) = scope_of.get(&original) {
                    scope_of.insert(copy, scope);
                }
                if let Some(&value) = references.get(&original) {
                    references.insert(copy, value);
                }
                if let Some(&prototype) = prototypes.get(&original) {
                    prototypes.insert(copy, prototype);
                }
                if let Some(named) = array_properties.get(&original).cloned() {
                    array_properties.insert(copy, named);
                }
            },
        )
    }

    pub(crate) fn node_literal(&self, node: NodeIndex) -> Option<&LiteralValue> {
        self.arena.get(node)?.literal()
    }

    pub(crate) fn kind_of(&self, node: NodeIndex) -> Option<SyntaxKind> {
        self.arena.kind(node)
    }

    /// Value the derivation attached to `node`, following references of
    /// the value's own AST. A loop in that chain is reported and cut.
    pub fn get_reference(&mut self, node: NodeIndex) -> Option<ValueId> {
        let mut value = *self.references.get(&node)?;
        let mut footprint = vec![node];
        loop {
            let ast = self.values[value.index()].ast;
            let Some(&next) = self.references.get(&ast) else {
                break;
            };
            if footprint.contains(&ast) {
                self.report(DiagnosticKind::CircularReference, "reference chain loops", Some(node));
                break;
            }
            footprint.push(ast);
            value = next;
        }
        Some(value)
    }

    /// Hook registered for a dotted access path.
    pub(crate) fn builtin_for(&self, path: &str) -> Option<BuiltinHook> {
        self.builtins.get(path).map(Rc::clone)
    }
}

#[cfg(test)]
#[path = "tests/analyzer_tests.rs"]
mod analyzer_tests;
