//! Compact JavaScript printer.
//!
//! Renders a subtree on a single line. Used for diagnostics and for the
//! serialized form of derived values, so it favours a stable, readable shape
//! over preserving the original formatting.

use crate::arena::NodeArena;
use crate::node::{Function, LiteralValue, NodeData, NodeIndex};
use jsdfa_common::limits::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};

// Expression binding powers; larger binds tighter.
const PREC_SEQUENCE: u8 = 1;
const PREC_ASSIGN: u8 = 2;
const PREC_CONDITIONAL: u8 = 3;
const PREC_UNARY: u8 = 15;
const PREC_POSTFIX: u8 = 16;
const PREC_NEW: u8 = 17;
const PREC_CALL: u8 = 18;
const PREC_PRIMARY: u8 = 19;

/// Render `node` as JavaScript source.
pub fn render(arena: &NodeArena, node: NodeIndex) -> String {
    let mut printer = Printer::new(arena);
    printer.emit(node);
    printer.finish()
}

pub(crate) fn is_identifier_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub struct Printer<'a> {
    arena: &'a NodeArena,
    out: String,
}

impl<'a> Printer<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        Printer {
            arena,
            out: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Emit a statement or expression.
    pub fn emit(&mut self, node: NodeIndex) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || self.emit_node(node));
    }

    fn emit_expr(&mut self, node: NodeIndex, min_prec: u8) {
        let prec = self.precedence(node);
        if prec < min_prec {
            self.write("(");
            self.emit(node);
            self.write(")");
        } else {
            self.emit(node);
        }
    }

    fn precedence(&self, node: NodeIndex) -> u8 {
        let Some(node) = self.arena.get(node) else {
            return PREC_PRIMARY;
        };
        match &node.data {
            NodeData::SequenceExpression { .. } => PREC_SEQUENCE,
            NodeData::AssignmentExpression { .. } | NodeData::FunctionExpression(_) => PREC_ASSIGN,
            NodeData::ConditionalExpression { .. } => PREC_CONDITIONAL,
            NodeData::LogicalExpression { operator, .. } => operator.precedence(),
            NodeData::BinaryExpression { operator, .. } => operator.precedence(),
            NodeData::UnaryExpression { .. } => PREC_UNARY,
            NodeData::UpdateExpression { prefix, .. } => {
                if *prefix {
                    PREC_UNARY
                } else {
                    PREC_POSTFIX
                }
            }
            NodeData::NewExpression { .. } => PREC_NEW,
            NodeData::CallExpression { .. } | NodeData::MemberExpression { .. } => PREC_CALL,
            NodeData::Literal {
                value: LiteralValue::Number(n),
            } if *n < 0.0 => PREC_UNARY,
            _ => PREC_PRIMARY,
        }
    }

    fn emit_list(&mut self, items: &[NodeIndex], separator: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(separator);
            }
            self.emit_expr(*item, PREC_ASSIGN);
        }
    }

    fn emit_statements(&mut self, body: &[NodeIndex]) {
        for (i, statement) in body.iter().enumerate() {
            if i > 0 {
                self.write(" ");
            }
            self.emit(*statement);
        }
    }

    fn emit_block_like(&mut self, body: &[NodeIndex]) {
        if body.is_empty() {
            self.write("{}");
        } else {
            self.write("{ ");
            self.emit_statements(body);
            self.write(" }");
        }
    }

    fn emit_function(&mut self, function: &Function) {
        self.write("function");
        if let Some(id) = function.id {
            self.write(" ");
            self.emit(id);
        }
        self.write("(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit(*param);
        }
        self.write(") ");
        self.emit(function.body);
    }

    fn emit_property_key(&mut self, key: NodeIndex, computed: bool) {
        if computed {
            self.write("[");
            self.emit_expr(key, PREC_ASSIGN);
            self.write("]");
            return;
        }
        let arena = self.arena;
        if let Some(LiteralValue::String(name)) = arena.get(key).and_then(|n| n.literal())
            && is_identifier_name(name)
        {
            self.write(name);
            return;
        }
        self.emit(key);
    }

    fn emit_node(&mut self, index: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(index) else {
            self.write("/* missing */");
            return;
        };
        match &node.data {
            NodeData::Program { body } => self.emit_statements(body),
            NodeData::Identifier { name } => self.write(name),
            NodeData::Literal { value } => self.write(&value.to_string()),
            NodeData::ThisExpression => self.write("this"),
            NodeData::ArrayExpression { elements } => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    if let Some(element) = element {
                        self.emit_expr(*element, PREC_ASSIGN);
                    }
                }
                if matches!(elements.last(), Some(None)) {
                    self.write(",");
                }
                self.write("]");
            }
            NodeData::ObjectExpression { properties } => {
                if properties.is_empty() {
                    self.write("{}");
                } else {
                    self.write("{ ");
                    for (i, property) in properties.iter().enumerate() {
                        if i > 0 {
                            self.write(", ");
                        }
                        self.emit(*property);
                    }
                    self.write(" }");
                }
            }
            NodeData::Property {
                key,
                value,
                computed,
                kind,
            } => {
                match kind.as_str() {
                    "init" => {}
                    other => {
                        self.write(other);
                        self.write(" ");
                    }
                }
                self.emit_property_key(*key, *computed);
                self.write(": ");
                self.emit_expr(*value, PREC_ASSIGN);
            }
            NodeData::FunctionExpression(function) | NodeData::FunctionDeclaration(function) => {
                self.emit_function(function)
            }
            NodeData::UnaryExpression { operator, argument } => {
                let text = operator.as_str();
                self.write(text);
                if text.chars().all(char::is_alphabetic) {
                    self.write(" ");
                }
                self.emit_expr(*argument, PREC_UNARY);
            }
            NodeData::UpdateExpression {
                operator,
                argument,
                prefix,
            } => {
                if *prefix {
                    self.write(operator.as_str());
                    self.emit_expr(*argument, PREC_UNARY);
                } else {
                    self.emit_expr(*argument, PREC_POSTFIX);
                    self.write(operator.as_str());
                }
            }
            NodeData::BinaryExpression {
                operator,
                left,
                right,
            } => {
                let prec = operator.precedence();
                self.emit_expr(*left, prec);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.emit_expr(*right, prec + 1);
            }
            NodeData::LogicalExpression {
                operator,
                left,
                right,
            } => {
                let prec = operator.precedence();
                self.emit_expr(*left, prec);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.emit_expr(*right, prec + 1);
            }
            NodeData::AssignmentExpression {
                operator,
                left,
                right,
            } => {
                self.emit_expr(*left, PREC_CALL);
                self.write(" ");
                self.write(operator.as_str());
                self.write(" ");
                self.emit_expr(*right, PREC_ASSIGN);
            }
            NodeData::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                self.emit_expr(*test, PREC_CONDITIONAL + 1);
                self.write(" ? ");
                self.emit_expr(*consequent, PREC_ASSIGN);
                self.write(" : ");
                self.emit_expr(*alternate, PREC_ASSIGN);
            }
            NodeData::CallExpression { callee, arguments } => {
                self.emit_expr(*callee, PREC_CALL);
                self.write("(");
                self.emit_list(arguments, ", ");
                self.write(")");
            }
            NodeData::NewExpression { callee, arguments } => {
                self.write("new ");
                self.emit_expr(*callee, PREC_NEW + 1);
                self.write("(");
                self.emit_list(arguments, ", ");
                self.write(")");
            }
            NodeData::MemberExpression {
                object,
                property,
                computed,
            } => {
                self.emit_expr(*object, PREC_CALL);
                let name = match arena.get(*property).map(|p| &p.data) {
                    Some(NodeData::Identifier { name }) if !computed => Some(name.as_str()),
                    Some(NodeData::Literal {
                        value: LiteralValue::String(name),
                    }) if is_identifier_name(name) => Some(name.as_str()),
                    _ => None,
                };
                match name {
                    Some(name) => {
                        self.write(".");
                        self.write(name);
                    }
                    None => {
                        self.write("[");
                        self.emit_expr(*property, PREC_SEQUENCE);
                        self.write("]");
                    }
                }
            }
            NodeData::SequenceExpression { expressions } => {
                for (i, expression) in expressions.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_expr(*expression, PREC_ASSIGN);
                }
            }
            NodeData::VariableDeclaration { kind, declarations } => {
                self.write(kind.as_str());
                self.write(" ");
                self.emit_list(declarations, ", ");
                self.write(";");
            }
            NodeData::VariableDeclarator { id, init } => {
                self.emit(*id);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expr(*init, PREC_ASSIGN);
                }
            }
            NodeData::ExpressionStatement { expression } => {
                let needs_parens = matches!(
                    arena.get(*expression).map(|e| &e.data),
                    Some(NodeData::ObjectExpression { .. } | NodeData::FunctionExpression(_))
                );
                if needs_parens {
                    self.write("(");
                    self.emit(*expression);
                    self.write(")");
                } else {
                    self.emit(*expression);
                }
                self.write(";");
            }
            NodeData::BlockStatement { body } => self.emit_block_like(body),
            NodeData::EmptyStatement => self.write(";"),
            NodeData::ReturnStatement { argument } => {
                self.write("return");
                if let Some(argument) = argument {
                    self.write(" ");
                    self.emit(*argument);
                }
                self.write(";");
            }
            NodeData::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                self.write("if (");
                self.emit(*test);
                self.write(") ");
                self.emit(*consequent);
                if let Some(alternate) = alternate {
                    self.write(" else ");
                    self.emit(*alternate);
                }
            }
            NodeData::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.write("switch (");
                self.emit(*discriminant);
                self.write(") ");
                self.emit_block_like(cases);
            }
            NodeData::SwitchCase { test, consequent } => {
                match test {
                    Some(test) => {
                        self.write("case ");
                        self.emit(*test);
                        self.write(":");
                    }
                    None => self.write("default:"),
                }
                if !consequent.is_empty() {
                    self.write(" ");
                    self.emit_statements(consequent);
                }
            }
            NodeData::WhileStatement { test, body } => {
                self.write("while (");
                self.emit(*test);
                self.write(") ");
                self.emit(*body);
            }
            NodeData::DoWhileStatement { body, test } => {
                self.write("do ");
                self.emit(*body);
                self.write(" while (");
                self.emit(*test);
                self.write(");");
            }
            NodeData::ForStatement {
                init,
                test,
                update,
                body,
            } => {
                self.write("for (");
                if let Some(init) = init {
                    self.emit(*init);
                    if !self.out.ends_with(';') {
                        self.write(";");
                    }
                } else {
                    self.write(";");
                }
                if let Some(test) = test {
                    self.write(" ");
                    self.emit(*test);
                }
                self.write(";");
                if let Some(update) = update {
                    self.write(" ");
                    self.emit(*update);
                }
                self.write(") ");
                self.emit(*body);
            }
            NodeData::ForInStatement { left, right, body } => {
                self.write("for (");
                self.emit(*left);
                if self.out.ends_with(';') {
                    self.out.pop();
                }
                self.write(" in ");
                self.emit(*right);
                self.write(") ");
                self.emit(*body);
            }
            NodeData::BreakStatement { label } | NodeData::ContinueStatement { label } => {
                let keyword = if matches!(node.data, NodeData::BreakStatement { .. }) {
                    "break"
                } else {
                    "continue"
                };
                self.write(keyword);
                if let Some(label) = label {
                    self.write(" ");
                    self.emit(*label);
                }
                self.write(";");
            }
            NodeData::ThrowStatement { argument } => {
                self.write("throw ");
                self.emit(*argument);
                self.write(";");
            }
            NodeData::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                self.write("try ");
                self.emit(*block);
                if let Some(handler) = handler {
                    self.write(" ");
                    self.emit(*handler);
                }
                if let Some(finalizer) = finalizer {
                    self.write(" finally ");
                    self.emit(*finalizer);
                }
            }
            NodeData::CatchClause { param, body } => {
                self.write("catch ");
                if let Some(param) = param {
                    self.write("(");
                    self.emit(*param);
                    self.write(") ");
                }
                self.emit(*body);
            }
            NodeData::LabeledStatement { label, body } => {
                self.emit(*label);
                self.write(": ");
                self.emit(*body);
            }
            NodeData::Other { kind, .. } => {
                self.write("/* ");
                self.write(kind);
                self.write(" */");
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/printer_tests.rs"]
mod printer_tests;
