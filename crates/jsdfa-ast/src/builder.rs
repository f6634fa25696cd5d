//! Programmatic AST construction.
//!
//! `AstBuilder` creates nodes in a fresh arena without source locations and
//! [`AstBuilder::finish`] lays the tree out with synthetic, properly nested
//! positions: every node gets a start line when it is entered in pre-order
//! and an end line when it is left, so a node's span contains exactly its
//! descendants and source order is preserved.
//!
//! ```ignore
//! let mut b = AstBuilder::new();
//! let init = b.num(1.0);
//! let decl = b.var("a", Some(init));
//! let program = b.program(vec![decl]);
//! let (arena, root) = b.finish(program);
//! ```

use crate::arena::NodeArena;
use crate::node::{
    AssignmentOperator, BinaryOperator, Function, LiteralValue, LogicalOperator, NodeData, NodeIndex,
    PropertyKind, UnaryOperator, VariableKind,
};
use jsdfa_common::{Position, SourceLocation};

#[derive(Debug, Default)]
pub struct AstBuilder {
    arena: NodeArena,
}

impl AstBuilder {
    pub fn new() -> AstBuilder {
        AstBuilder {
            arena: NodeArena::new(),
        }
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn add(&mut self, data: NodeData) -> NodeIndex {
        self.arena.alloc(data)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn ident(&mut self, name: &str) -> NodeIndex {
        self.add(NodeData::Identifier {
            name: name.to_string(),
        })
    }

    pub fn literal(&mut self, value: LiteralValue) -> NodeIndex {
        self.add(NodeData::Literal { value })
    }

    pub fn num(&mut self, value: f64) -> NodeIndex {
        self.literal(LiteralValue::Number(value))
    }

    pub fn string(&mut self, value: &str) -> NodeIndex {
        self.literal(LiteralValue::String(value.to_string()))
    }

    pub fn boolean(&mut self, value: bool) -> NodeIndex {
        self.literal(LiteralValue::Boolean(value))
    }

    pub fn null(&mut self) -> NodeIndex {
        self.literal(LiteralValue::Null)
    }

    pub fn this(&mut self) -> NodeIndex {
        self.add(NodeData::ThisExpression)
    }

    pub fn array(&mut self, elements: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::ArrayExpression {
            elements: elements.into_iter().map(Some).collect(),
        })
    }

    pub fn array_with_holes(&mut self, elements: Vec<Option<NodeIndex>>) -> NodeIndex {
        self.add(NodeData::ArrayExpression { elements })
    }

    /// Object literal with identifier keys.
    pub fn object(&mut self, properties: Vec<(&str, NodeIndex)>) -> NodeIndex {
        let properties = properties
            .into_iter()
            .map(|(key, value)| {
                let key = self.ident(key);
                self.add(NodeData::Property {
                    key,
                    value,
                    computed: false,
                    kind: PropertyKind::Init,
                })
            })
            .collect();
        self.add(NodeData::ObjectExpression { properties })
    }

    /// Non-computed member access `object.name`.
    pub fn member(&mut self, object: NodeIndex, name: &str) -> NodeIndex {
        let property = self.ident(name);
        self.add(NodeData::MemberExpression {
            object,
            property,
            computed: false,
        })
    }

    /// Computed member access `object[property]`.
    pub fn index(&mut self, object: NodeIndex, property: NodeIndex) -> NodeIndex {
        self.add(NodeData::MemberExpression {
            object,
            property,
            computed: true,
        })
    }

    /// Member chain `a.b.c` from a dotted path.
    pub fn path(&mut self, dotted: &str) -> NodeIndex {
        let mut parts = dotted.split('.');
        let root = parts.next().unwrap_or_default();
        let mut node = if root == "this" { self.this() } else { self.ident(root) };
        for part in parts {
            node = self.member(node, part);
        }
        node
    }

    pub fn call(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::CallExpression { callee, arguments })
    }

    pub fn new_expr(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::NewExpression { callee, arguments })
    }

    pub fn binary(&mut self, operator: BinaryOperator, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.add(NodeData::BinaryExpression {
            operator,
            left,
            right,
        })
    }

    pub fn logical(&mut self, operator: LogicalOperator, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.add(NodeData::LogicalExpression {
            operator,
            left,
            right,
        })
    }

    pub fn unary(&mut self, operator: UnaryOperator, argument: NodeIndex) -> NodeIndex {
        self.add(NodeData::UnaryExpression { operator, argument })
    }

    pub fn assign(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.assign_op(AssignmentOperator::Assign, left, right)
    }

    pub fn assign_op(
        &mut self,
        operator: AssignmentOperator,
        left: NodeIndex,
        right: NodeIndex,
    ) -> NodeIndex {
        self.add(NodeData::AssignmentExpression {
            operator,
            left,
            right,
        })
    }

    pub fn conditional(&mut self, test: NodeIndex, consequent: NodeIndex, alternate: NodeIndex) -> NodeIndex {
        self.add(NodeData::ConditionalExpression {
            test,
            consequent,
            alternate,
        })
    }

    pub fn sequence(&mut self, expressions: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::SequenceExpression { expressions })
    }

    fn function_parts(&mut self, name: Option<&str>, params: &[&str], body: Vec<NodeIndex>) -> Function {
        let id = name.map(|name| self.ident(name));
        let params = params.iter().map(|param| self.ident(param)).collect();
        let body = self.block(body);
        Function { id, params, body }
    }

    pub fn function_expr(&mut self, params: &[&str], body: Vec<NodeIndex>) -> NodeIndex {
        let function = self.function_parts(None, params, body);
        self.add(NodeData::FunctionExpression(function))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn function_decl(&mut self, name: &str, params: &[&str], body: Vec<NodeIndex>) -> NodeIndex {
        let function = self.function_parts(Some(name), params, body);
        self.add(NodeData::FunctionDeclaration(function))
    }

    /// `var name = init;`
    pub fn var(&mut self, name: &str, init: Option<NodeIndex>) -> NodeIndex {
        self.vars(vec![(name, init)])
    }

    pub fn vars(&mut self, declarators: Vec<(&str, Option<NodeIndex>)>) -> NodeIndex {
        let declarations = declarators
            .into_iter()
            .map(|(name, init)| {
                let id = self.ident(name);
                self.add(NodeData::VariableDeclarator { id, init })
            })
            .collect();
        self.add(NodeData::VariableDeclaration {
            kind: VariableKind::Var,
            declarations,
        })
    }

    pub fn expr_stmt(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(NodeData::ExpressionStatement { expression })
    }

    /// `left = right;` as a statement.
    pub fn assign_stmt(&mut self, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        let expression = self.assign(left, right);
        self.expr_stmt(expression)
    }

    /// `callee(arguments);` as a statement.
    pub fn call_stmt(&mut self, callee: NodeIndex, arguments: Vec<NodeIndex>) -> NodeIndex {
        let expression = self.call(callee, arguments);
        self.expr_stmt(expression)
    }

    pub fn block(&mut self, body: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::BlockStatement { body })
    }

    pub fn ret(&mut self, argument: Option<NodeIndex>) -> NodeIndex {
        self.add(NodeData::ReturnStatement { argument })
    }

    pub fn if_stmt(
        &mut self,
        test: NodeIndex,
        consequent: Vec<NodeIndex>,
        alternate: Option<Vec<NodeIndex>>,
    ) -> NodeIndex {
        let consequent = self.block(consequent);
        let alternate = alternate.map(|body| self.block(body));
        self.add(NodeData::IfStatement {
            test,
            consequent,
            alternate,
        })
    }

    pub fn switch(&mut self, discriminant: NodeIndex, cases: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::SwitchStatement {
            discriminant,
            cases,
        })
    }

    /// `case test: ...` or `default: ...` when `test` is `None`.
    pub fn case(&mut self, test: Option<NodeIndex>, consequent: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::SwitchCase { test, consequent })
    }

    pub fn break_stmt(&mut self) -> NodeIndex {
        self.add(NodeData::BreakStatement { label: None })
    }

    pub fn while_stmt(&mut self, test: NodeIndex, body: Vec<NodeIndex>) -> NodeIndex {
        let body = self.block(body);
        self.add(NodeData::WhileStatement { test, body })
    }

    pub fn program(&mut self, body: Vec<NodeIndex>) -> NodeIndex {
        self.add(NodeData::Program { body })
    }

    /// Assign synthetic locations below `root` and hand over the arena.
    pub fn finish(mut self, root: NodeIndex) -> (NodeArena, NodeIndex) {
        layout(&mut self.arena, root);
        (self.arena, root)
    }
}

/// Give every node without a location a nested span, one line per
/// enter/leave event.
fn layout(arena: &mut NodeArena, root: NodeIndex) {
    let mut line: u32 = 1;
    let mut starts: Vec<Position> = Vec::new();
    let mut stack: Vec<(NodeIndex, bool)> = vec![(root, false)];
    while let Some((index, leaving)) = stack.pop() {
        if leaving {
            let end = Position::new(line, 0);
            line += 1;
            let start = starts.pop().unwrap_or(end);
            if let Some(node) = arena.get_mut(index)
                && node.loc.is_none()
            {
                node.loc = Some(SourceLocation::new(start, end));
            }
            continue;
        }
        starts.push(Position::new(line, 0));
        line += 1;
        stack.push((index, true));
        for child in arena.children(index).into_iter().rev() {
            stack.push((child, false));
        }
    }
}

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod builder_tests;
