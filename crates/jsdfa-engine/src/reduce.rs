//! Pluggable reduction.
//!
//! Reduction folds expressions whose inputs are known into simpler ones:
//! `2 + 3` into `5`, `true ? a : b` into `a`. Rules are registered per node
//! kind and run in post-order, so a rule sees children that were already
//! reduced. When several rules for a kind produce a result, the last one
//! wins. The result is recorded as the node's reference and materialized
//! like a derivation result.

use crate::analyzer::Analyzer;
use crate::ids::{RuleId, ScopeId, ValueId};
use crate::value::ValueKind;
use jsdfa_ast::{
    BinaryOperator, LiteralValue, LogicalOperator, NodeArena, NodeData, NodeIndex, SyntaxKind, UnaryOperator,
    Visit, Visitor, walk,
};
use jsdfa_common::DiagnosticKind;
use jsdfa_common::limits::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// What a rule is reducing.
#[derive(Copy, Clone, Debug)]
pub struct ReduceContext {
    /// Value whose tree is being reduced.
    pub value: ValueId,
    /// Scope the value resolves names in.
    pub scope: ScopeId,
}

/// A reduction rule: given a node, return the node it reduces to.
pub type ReduceRule = Rc<dyn Fn(&mut Analyzer, &ReduceContext, NodeIndex) -> Option<NodeIndex>>;

#[derive(Default)]
pub struct ReduceRules {
    rules: FxHashMap<SyntaxKind, Vec<(RuleId, ReduceRule)>>,
    next_id: u32,
}

impl ReduceRules {
    /// Registry preloaded with the built-in folding rules.
    pub fn with_builtins() -> ReduceRules {
        let mut rules = ReduceRules::default();
        rules.register(SyntaxKind::BinaryExpression, Rc::new(reduce_binary));
        rules.register(SyntaxKind::UnaryExpression, Rc::new(reduce_unary));
        rules.register(SyntaxKind::LogicalExpression, Rc::new(reduce_logical));
        rules.register(SyntaxKind::ConditionalExpression, Rc::new(reduce_conditional));
        rules
    }

    pub fn register(&mut self, kind: SyntaxKind, rule: ReduceRule) -> RuleId {
        let id = RuleId(self.next_id);
        self.next_id += 1;
        self.rules.entry(kind).or_default().push((id, rule));
        id
    }

    /// Remove rule `id` of `kind`, or all rules of `kind` for `None`.
    pub fn remove(&mut self, kind: SyntaxKind, id: Option<RuleId>) -> bool {
        match id {
            None => self.rules.remove(&kind).is_some_and(|rules| !rules.is_empty()),
            Some(id) => {
                let Some(rules) = self.rules.get_mut(&kind) else {
                    return false;
                };
                let before = rules.len();
                rules.retain(|(rule_id, _)| *rule_id != id);
                rules.len() != before
            }
        }
    }

    /// Number of rules registered for `kind`.
    pub fn count(&self, kind: SyntaxKind) -> usize {
        self.rules.get(&kind).map_or(0, Vec::len)
    }

    fn rules_for(&self, kind: SyntaxKind) -> Vec<ReduceRule> {
        self.rules
            .get(&kind)
            .map(|rules| rules.iter().map(|(_, rule)| Rc::clone(rule)).collect())
            .unwrap_or_default()
    }
}

struct ReduceVisitor<'a> {
    analyzer: &'a mut Analyzer,
    context: ReduceContext,
}

impl Visitor for ReduceVisitor<'_> {
    fn arena(&mut self) -> &mut NodeArena {
        &mut self.analyzer.arena
    }

    fn before(&mut self, node: NodeIndex) -> Visit {
        match self.analyzer.kind_of(node) {
            Some(kind) if kind.is_function() => Visit::Skip,
            _ => Visit::Descend,
        }
    }

    fn after(&mut self, node: NodeIndex, _origin: Option<NodeIndex>) -> Option<NodeIndex> {
        let kind = self.analyzer.kind_of(node)?;
        let rules = self.analyzer.reduce_rules.rules_for(kind);
        let mut reduced = None;
        for rule in rules {
            if let Some(result) = rule(&mut *self.analyzer, &self.context, node) {
                reduced = Some(result);
            }
        }
        if let Some(result) = reduced
            && result != node
        {
            let value = self.analyzer.value_from_ast(result, Some(self.context.scope));
            self.analyzer.references.insert(node, value);
        }
        None
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
    /// Reduce a value in place. Objects and arrays reduce their children.
    pub fn reduce_value(&mut self, value: ValueId) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || self.reduce_value_inner(value));
    }

    fn reduce_value_inner(&mut self, value: ValueId) {
        let entry = &self.values[value.index()];
        match &entry.kind {
            ValueKind::Literal => {}
            ValueKind::Object { properties, .. } | ValueKind::Function { properties } => {
                let children: Vec<ValueId> = properties.values().copied().collect();
                for child in children {
                    self.reduce_value(child);
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
                    self.reduce_value(child);
                }
            }
            ValueKind::Expression => {
                let ast = entry.ast;
                let scope = entry.scope.unwrap_or_else(|| self.global_scope());
                let mut visitor = ReduceVisitor {
                    analyzer: self,
                    context: ReduceContext { value, scope },
                };
                let ast = walk(&mut visitor, ast);
                let reduced = self.materialize(ast);
                self.update_value(value, reduced);
            }
        }
    }

    /// Materialized literal of a node, if it reduces to one.
    fn literal_operand(&mut self, node: NodeIndex) -> Option<LiteralValue> {
        let materialized = self.materialize(node);
        self.node_literal(materialized).cloned()
    }
}

// =============================================================================
// Built-in rules
// =============================================================================

fn reduce_binary(analyzer: &mut Analyzer, _context: &ReduceContext, node: NodeIndex) -> Option<NodeIndex> {
    let NodeData::BinaryExpression {
        operator,
        left,
        right,
    } = analyzer.arena.node(node).data
    else {
        return None;
    };
    let left = analyzer.literal_operand(left)?;
    let right = analyzer.literal_operand(right)?;
    let folded = fold_binary(operator, &left, &right)?;
    Some(analyzer.alloc_literal(folded, Some(node)))
}

fn reduce_unary(analyzer: &mut Analyzer, _context: &ReduceContext, node: NodeIndex) -> Option<NodeIndex> {
    let NodeData::UnaryExpression { operator, argument } = analyzer.arena.node(node).data else {
        return None;
    };
    let argument = analyzer.literal_operand(argument)?;
    let folded = fold_unary(operator, &argument)?;
    Some(analyzer.alloc_literal(folded, Some(node)))
}

/// `a && b` and `a || b` with a known left operand select an operand.
/// `M || {}` with `M` holding no value yet picks the fallback, the usual
/// module-initialization idiom.
fn reduce_logical(analyzer: &mut Analyzer, context: &ReduceContext, node: NodeIndex) -> Option<NodeIndex> {
    let NodeData::LogicalExpression {
        operator,
        left,
        right,
    } = analyzer.arena.node(node).data
    else {
        return None;
    };
    let left_tree = analyzer.materialize(left);
    if let Some(literal) = analyzer.node_literal(left_tree).cloned() {
        let pick_left = match operator {
            LogicalOperator::And => !literal.is_truthy(),
            LogicalOperator::Or => literal.is_truthy(),
            LogicalOperator::Nullish => literal != LiteralValue::Null,
        };
        return Some(if pick_left {
            left_tree
        } else {
            analyzer.materialize(right)
        });
    }
    if operator != LogicalOperator::Or {
        return None;
    }
    let loc = analyzer.start_loc(context.scope, left_tree);
    let Some(resolved) = analyzer.infer_variable(context.scope, left_tree) else {
        return Some(left_tree);
    };
    let owner = analyzer.variable(resolved.variable).scope;
    let loc = match owner {
        Some(owner) if owner == context.scope => loc,
        Some(owner) => analyzer.call_site_in(context.scope, owner),
        None => None,
    };
    match analyzer.inference(resolved.variable, loc, &resolved.path) {
        Some(_) => Some(left_tree),
        None => Some(analyzer.materialize(right)),
    }
}

fn reduce_conditional(analyzer: &mut Analyzer, _context: &ReduceContext, node: NodeIndex) -> Option<NodeIndex> {
    let NodeData::ConditionalExpression {
        test,
        consequent,
        alternate,
    } = analyzer.arena.node(node).data
    else {
        return None;
    };
    let test = analyzer.literal_operand(test)?;
    let branch = if test.is_truthy() { consequent } else { alternate };
    Some(analyzer.materialize(branch))
}

/// Evaluate a binary operator on literals. Arithmetic folds numbers only;
/// comparisons follow JavaScript semantics for every literal.
pub fn fold_binary(operator: BinaryOperator, left: &LiteralValue, right: &LiteralValue) -> Option<LiteralValue> {
    use BinaryOperator as Op;

    if operator.is_comparison() {
        return compare(operator, left, right).map(LiteralValue::Boolean);
    }
    let (LiteralValue::Number(a), LiteralValue::Number(b)) = (left, right) else {
        return None;
    };
    let (a, b) = (*a, *b);
    let result = match operator {
        Op::Add => a + b,
        Op::Sub => a - b,
        Op::Mul => a * b,
        Op::Div => a / b,
        Op::Rem => a % b,
        Op::Exp => a.powf(b),
        Op::Shl => f64::from(to_int32(a).wrapping_shl(to_uint32(b) & 31)),
        Op::Shr => f64::from(to_int32(a).wrapping_shr(to_uint32(b) & 31)),
        Op::UShr => f64::from(to_uint32(a).wrapping_shr(to_uint32(b) & 31)),
        Op::BitAnd => f64::from(to_int32(a) & to_int32(b)),
        Op::BitOr => f64::from(to_int32(a) | to_int32(b)),
        Op::BitXor => f64::from(to_int32(a) ^ to_int32(b)),
        _ => return None,
    };
    Some(LiteralValue::Number(result))
}

fn compare(operator: BinaryOperator, left: &LiteralValue, right: &LiteralValue) -> Option<bool> {
    use BinaryOperator as Op;

    Some(match operator {
        Op::StrictEq => strict_equals(left, right),
        Op::StrictNotEq => !strict_equals(left, right),
        Op::Eq => loose_equals(left, right),
        Op::NotEq => !loose_equals(left, right),
        Op::Lt | Op::LtEq | Op::Gt | Op::GtEq => {
            if let (LiteralValue::String(a), LiteralValue::String(b)) = (left, right) {
                let a: Vec<u16> = a.encode_utf16().collect();
                let b: Vec<u16> = b.encode_utf16().collect();
                match operator {
                    Op::Lt => a < b,
                    Op::LtEq => a <= b,
                    Op::Gt => a > b,
                    _ => a >= b,
                }
            } else {
                let (a, b) = (left.to_number(), right.to_number());
                match operator {
                    Op::Lt => a < b,
                    Op::LtEq => a <= b,
                    Op::Gt => a > b,
                    _ => a >= b,
                }
            }
        }
        _ => return None,
    })
}

fn strict_equals(left: &LiteralValue, right: &LiteralValue) -> bool {
    match (left, right) {
        (LiteralValue::Number(a), LiteralValue::Number(b)) => a == b,
        (LiteralValue::String(a), LiteralValue::String(b)) => a == b,
        (LiteralValue::Boolean(a), LiteralValue::Boolean(b)) => a == b,
        (LiteralValue::Null, LiteralValue::Null) => true,
        _ => false,
    }
}

fn loose_equals(left: &LiteralValue, right: &LiteralValue) -> bool {
    match (left, right) {
        (LiteralValue::Null, LiteralValue::Null) => true,
        (LiteralValue::Null, _) | (_, LiteralValue::Null) => false,
        (LiteralValue::RegExp { .. }, _) | (_, LiteralValue::RegExp { .. }) => false,
        (LiteralValue::String(a), LiteralValue::String(b)) => a == b,
        _ => left.to_number() == right.to_number(),
    }
}

/// Evaluate a unary operator on a literal.
pub fn fold_unary(operator: UnaryOperator, argument: &LiteralValue) -> Option<LiteralValue> {
    Some(match operator {
        UnaryOperator::Minus => LiteralValue::Number(-argument.to_number()),
        UnaryOperator::Plus => LiteralValue::Number(argument.to_number()),
        UnaryOperator::Not => LiteralValue::Boolean(!argument.is_truthy()),
        UnaryOperator::BitNot => LiteralValue::Number(f64::from(!to_int32(argument.to_number()))),
        UnaryOperator::TypeOf => LiteralValue::String(
            match argument {
                LiteralValue::String(_) => "string",
                LiteralValue::Number(_) => "number",
                LiteralValue::Boolean(_) => "boolean",
                LiteralValue::Null | LiteralValue::RegExp { .. } => "object",
            }
            .to_string(),
        ),
        UnaryOperator::Void | UnaryOperator::Delete => return None,
    })
}

/// JavaScript `ToUint32`.
fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// JavaScript `ToInt32`.
fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

#[cfg(test)]
#[path = "tests/reduce_tests.rs"]
mod reduce_tests;
