//! ESTree JSON ingestion.
//!
//! Converts the JSON document produced by an external ESTree parser (esprima,
//! acorn, espree with `loc: true`) into a [`NodeArena`]. Unknown node types are
//! kept as [`NodeData::Other`] with every nested node found in their fields.
//! Arrow functions are ingested as function expressions; an expression body
//! becomes a block holding a single return statement.

use crate::arena::NodeArena;
use crate::node::{
    AssignmentOperator, BinaryOperator, Function, LiteralValue, LogicalOperator, Node, NodeData,
    NodeIndex, PropertyKind, UnaryOperator, UpdateOperator, VariableKind,
};
use jsdfa_common::limits::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};
use jsdfa_common::{Position, SourceLocation};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, trace};

/// Error produced when the input does not have the ESTree shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EstreeError {
    /// A value in node position is not an object with a string `type`.
    NotANode { found: String },
    /// A required field is absent or `null`.
    MissingField { node_type: String, field: &'static str },
    /// A field has the wrong JSON shape.
    InvalidField { node_type: String, field: &'static str },
    /// An operator string the engine does not know.
    UnknownOperator { node_type: String, operator: String },
}

impl fmt::Display for EstreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstreeError::NotANode { found } => write!(f, "expected an ESTree node, found {found}"),
            EstreeError::MissingField { node_type, field } => {
                write!(f, "{node_type} is missing required field `{field}`")
            }
            EstreeError::InvalidField { node_type, field } => {
                write!(f, "{node_type} has a malformed `{field}` field")
            }
            EstreeError::UnknownOperator { node_type, operator } => {
                write!(f, "{node_type} uses unknown operator `{operator}`")
            }
        }
    }
}

impl std::error::Error for EstreeError {}

/// Convert an ESTree document into an arena. Returns the arena and the index
/// of the root node.
pub fn from_estree(json: &Value) -> Result<(NodeArena, NodeIndex), EstreeError> {
    let mut reader = EstreeReader {
        arena: NodeArena::new(),
    };
    let root = reader.node(json)?;
    debug!(nodes = reader.arena.len(), "ingested ESTree document");
    Ok((reader.arena, root))
}

struct EstreeReader {
    arena: NodeArena,
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object without `type`".to_string(),
    }
}

fn is_node(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

fn parse_position(value: &Value) -> Option<Position> {
    let line = value.get("line")?.as_u64()?;
    let column = value.get("column")?.as_u64()?;
    Some(Position::new(
        u32::try_from(line).ok()?,
        u32::try_from(column).ok()?,
    ))
}

fn parse_loc(object: &Map<String, Value>) -> Option<SourceLocation> {
    let loc = object.get("loc")?;
    Some(SourceLocation::new(
        parse_position(loc.get("start")?)?,
        parse_position(loc.get("end")?)?,
    ))
}

impl EstreeReader {
    fn node(&mut self, value: &Value) -> Result<NodeIndex, EstreeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || self.node_inner(value))
    }

    fn node_inner(&mut self, value: &Value) -> Result<NodeIndex, EstreeError> {
        let Some(object) = value.as_object() else {
            return Err(EstreeError::NotANode {
                found: describe(value),
            });
        };
        let Some(node_type) = object.get("type").and_then(Value::as_str) else {
            return Err(EstreeError::NotANode {
                found: describe(value),
            });
        };
        let loc = parse_loc(object);
        let data = self.convert(node_type, object, loc)?;
        Ok(self.arena.add(Node::with_loc(data, loc)))
    }

    fn child(
        &mut self,
        object: &Map<String, Value>,
        node_type: &str,
        field: &'static str,
    ) -> Result<NodeIndex, EstreeError> {
        match object.get(field) {
            None | Some(Value::Null) => Err(EstreeError::MissingField {
                node_type: node_type.to_string(),
                field,
            }),
            Some(value) => self.node(value),
        }
    }

    fn opt_child(
        &mut self,
        object: &Map<String, Value>,
        field: &'static str,
    ) -> Result<Option<NodeIndex>, EstreeError> {
        match object.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self.node(value).map(Some),
        }
    }

    fn list(
        &mut self,
        object: &Map<String, Value>,
        node_type: &str,
        field: &'static str,
    ) -> Result<Vec<NodeIndex>, EstreeError> {
        let items = match object.get(field) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(EstreeError::InvalidField {
                    node_type: node_type.to_string(),
                    field,
                });
            }
        };
        items.iter().map(|item| self.node(item)).collect()
    }

    fn operator<T>(
        object: &Map<String, Value>,
        node_type: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, EstreeError> {
        let text = object
            .get("operator")
            .and_then(Value::as_str)
            .ok_or_else(|| EstreeError::MissingField {
                node_type: node_type.to_string(),
                field: "operator",
            })?;
        parse(text).ok_or_else(|| EstreeError::UnknownOperator {
            node_type: node_type.to_string(),
            operator: text.to_string(),
        })
    }

    fn flag(object: &Map<String, Value>, field: &str) -> bool {
        object.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    fn function(
        &mut self,
        object: &Map<String, Value>,
        node_type: &str,
        loc: Option<SourceLocation>,
    ) -> Result<Function, EstreeError> {
        let id = self.opt_child(object, "id")?;
        let params = self.list(object, node_type, "params")?;
        let body = self.child(object, node_type, "body")?;
        let body = if Self::flag(object, "expression") || !self.is_block(body) {
            // Arrow function with an expression body.
            let body_loc = self.arena.loc(body).or(loc);
            let ret = self.arena.add(Node::with_loc(
                NodeData::ReturnStatement {
                    argument: Some(body),
                },
                body_loc,
            ));
            self.arena.add(Node::with_loc(
                NodeData::BlockStatement { body: vec![ret] },
                body_loc,
            ))
        } else {
            body
        };
        Ok(Function { id, params, body })
    }

    fn is_block(&self, index: NodeIndex) -> bool {
        matches!(
            self.arena.get(index).map(|node| &node.data),
            Some(NodeData::BlockStatement { .. })
        )
    }

    fn literal(object: &Map<String, Value>, node_type: &str) -> Result<LiteralValue, EstreeError> {
        if let Some(regex) = object.get("regex") {
            let pattern = regex.get("pattern").and_then(Value::as_str);
            let flags = regex.get("flags").and_then(Value::as_str).unwrap_or("");
            return match pattern {
                Some(pattern) => Ok(LiteralValue::RegExp {
                    pattern: pattern.to_string(),
                    flags: flags.to_string(),
                }),
                None => Err(EstreeError::InvalidField {
                    node_type: node_type.to_string(),
                    field: "regex",
                }),
            };
        }
        match object.get("value") {
            None | Some(Value::Null) => Ok(LiteralValue::Null),
            Some(Value::Bool(b)) => Ok(LiteralValue::Boolean(*b)),
            Some(Value::String(s)) => Ok(LiteralValue::String(s.clone())),
            Some(Value::Number(n)) => n.as_f64().map(LiteralValue::Number).ok_or_else(|| {
                EstreeError::InvalidField {
                    node_type: node_type.to_string(),
                    field: "value",
                }
            }),
            Some(_) => Err(EstreeError::InvalidField {
                node_type: node_type.to_string(),
                field: "value",
            }),
        }
    }

    fn convert(
        &mut self,
        node_type: &str,
        o: &Map<String, Value>,
        loc: Option<SourceLocation>,
    ) -> Result<NodeData, EstreeError> {
        let t = node_type;
        Ok(match node_type {
            "Program" => NodeData::Program {
                body: self.list(o, t, "body")?,
            },
            "Identifier" => NodeData::Identifier {
                name: o
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| EstreeError::MissingField {
                        node_type: t.to_string(),
                        field: "name",
                    })?
                    .to_string(),
            },
            "Literal" => NodeData::Literal {
                value: Self::literal(o, t)?,
            },
            "ThisExpression" => NodeData::ThisExpression,
            "ArrayExpression" => {
                let mut elements = Vec::new();
                if let Some(Value::Array(items)) = o.get("elements") {
                    for item in items {
                        elements.push(if item.is_null() {
                            None
                        } else {
                            Some(self.node(item)?)
                        });
                    }
                }
                NodeData::ArrayExpression { elements }
            }
            "ObjectExpression" => NodeData::ObjectExpression {
                properties: self.list(o, t, "properties")?,
            },
            "Property" => NodeData::Property {
                key: self.child(o, t, "key")?,
                value: self.child(o, t, "value")?,
                computed: Self::flag(o, "computed"),
                kind: o
                    .get("kind")
                    .and_then(Value::as_str)
                    .and_then(PropertyKind::parse)
                    .unwrap_or(PropertyKind::Init),
            },
            "FunctionExpression" | "ArrowFunctionExpression" => {
                NodeData::FunctionExpression(self.function(o, t, loc)?)
            }
            "FunctionDeclaration" => NodeData::FunctionDeclaration(self.function(o, t, loc)?),
            "UnaryExpression" => NodeData::UnaryExpression {
                operator: Self::operator(o, t, UnaryOperator::parse)?,
                argument: self.child(o, t, "argument")?,
            },
            "UpdateExpression" => NodeData::UpdateExpression {
                operator: Self::operator(o, t, UpdateOperator::parse)?,
                argument: self.child(o, t, "argument")?,
                prefix: Self::flag(o, "prefix"),
            },
            "BinaryExpression" => NodeData::BinaryExpression {
                operator: Self::operator(o, t, BinaryOperator::parse)?,
                left: self.child(o, t, "left")?,
                right: self.child(o, t, "right")?,
            },
            "LogicalExpression" => NodeData::LogicalExpression {
                operator: Self::operator(o, t, LogicalOperator::parse)?,
                left: self.child(o, t, "left")?,
                right: self.child(o, t, "right")?,
            },
            "AssignmentExpression" => NodeData::AssignmentExpression {
                operator: Self::operator(o, t, AssignmentOperator::parse)?,
                left: self.child(o, t, "left")?,
                right: self.child(o, t, "right")?,
            },
            "ConditionalExpression" => NodeData::ConditionalExpression {
                test: self.child(o, t, "test")?,
                consequent: self.child(o, t, "consequent")?,
                alternate: self.child(o, t, "alternate")?,
            },
            "CallExpression" => NodeData::CallExpression {
                callee: self.child(o, t, "callee")?,
                arguments: self.list(o, t, "arguments")?,
            },
            "NewExpression" => NodeData::NewExpression {
                callee: self.child(o, t, "callee")?,
                arguments: self.list(o, t, "arguments")?,
            },
            "MemberExpression" => NodeData::MemberExpression {
                object: self.child(o, t, "object")?,
                property: self.child(o, t, "property")?,
                computed: Self::flag(o, "computed"),
            },
            "SequenceExpression" => NodeData::SequenceExpression {
                expressions: self.list(o, t, "expressions")?,
            },
            "VariableDeclaration" => NodeData::VariableDeclaration {
                kind: o
                    .get("kind")
                    .and_then(Value::as_str)
                    .and_then(VariableKind::parse)
                    .unwrap_or(VariableKind::Var),
                declarations: self.list(o, t, "declarations")?,
            },
            "VariableDeclarator" => NodeData::VariableDeclarator {
                id: self.child(o, t, "id")?,
                init: self.opt_child(o, "init")?,
            },
            "ExpressionStatement" => NodeData::ExpressionStatement {
                expression: self.child(o, t, "expression")?,
            },
            "BlockStatement" => NodeData::BlockStatement {
                body: self.list(o, t, "body")?,
            },
            "EmptyStatement" => NodeData::EmptyStatement,
            "ReturnStatement" => NodeData::ReturnStatement {
                argument: self.opt_child(o, "argument")?,
            },
            "IfStatement" => NodeData::IfStatement {
                test: self.child(o, t, "test")?,
                consequent: self.child(o, t, "consequent")?,
                alternate: self.opt_child(o, "alternate")?,
            },
            "SwitchStatement" => NodeData::SwitchStatement {
                discriminant: self.child(o, t, "discriminant")?,
                cases: self.list(o, t, "cases")?,
            },
            "SwitchCase" => NodeData::SwitchCase {
                test: self.opt_child(o, "test")?,
                consequent: self.list(o, t, "consequent")?,
            },
            "WhileStatement" => NodeData::WhileStatement {
                test: self.child(o, t, "test")?,
                body: self.child(o, t, "body")?,
            },
            "DoWhileStatement" => NodeData::DoWhileStatement {
                body: self.child(o, t, "body")?,
                test: self.child(o, t, "test")?,
            },
            "ForStatement" => NodeData::ForStatement {
                init: self.opt_child(o, "init")?,
                test: self.opt_child(o, "test")?,
                update: self.opt_child(o, "update")?,
                body: self.child(o, t, "body")?,
            },
            "ForInStatement" => NodeData::ForInStatement {
                left: self.child(o, t, "left")?,
                right: self.child(o, t, "right")?,
                body: self.child(o, t, "body")?,
            },
            "BreakStatement" => NodeData::BreakStatement {
                label: self.opt_child(o, "label")?,
            },
            "ContinueStatement" => NodeData::ContinueStatement {
                label: self.opt_child(o, "label")?,
            },
            "ThrowStatement" => NodeData::ThrowStatement {
                argument: self.child(o, t, "argument")?,
            },
            "TryStatement" => NodeData::TryStatement {
                block: self.child(o, t, "block")?,
                handler: self.opt_child(o, "handler")?,
                finalizer: self.opt_child(o, "finalizer")?,
            },
            "CatchClause" => NodeData::CatchClause {
                param: self.opt_child(o, "param")?,
                body: self.child(o, t, "body")?,
            },
            "LabeledStatement" => NodeData::LabeledStatement {
                label: self.child(o, t, "label")?,
                body: self.child(o, t, "body")?,
            },
            other => {
                trace!(kind = other, "keeping unsupported node as opaque");
                let mut children = Vec::new();
                for (key, value) in o {
                    if key == "loc" || key == "range" {
                        continue;
                    }
                    match value {
                        Value::Object(_) if is_node(value) => children.push(self.node(value)?),
                        Value::Array(items) => {
                            for item in items.iter().filter(|item| is_node(item)) {
                                children.push(self.node(item)?);
                            }
                        }
                        _ => {}
                    }
                }
                NodeData::Other {
                    kind: other.to_string(),
                    children,
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/estree_tests.rs"]
mod estree_tests;
