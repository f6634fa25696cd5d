//! AST node definitions.
//!
//! Nodes are stored in a [`NodeArena`](crate::NodeArena) and reference their
//! children by [`NodeIndex`]. The payload enum is closed over the ESTree kinds
//! the engine understands; anything else is kept as [`NodeData::Other`] with
//! its child nodes discovered structurally at ingestion time.

use jsdfa_common::{Position, SourceLocation};
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Index of a node in its arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeIndex(pub u32);

// =============================================================================
// Literals
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    RegExp { pattern: String, flags: String },
}

impl LiteralValue {
    /// JavaScript truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            LiteralValue::String(s) => !s.is_empty(),
            LiteralValue::Number(n) => *n != 0.0 && !n.is_nan(),
            LiteralValue::Boolean(b) => *b,
            LiteralValue::Null => false,
            LiteralValue::RegExp { .. } => true,
        }
    }

    /// JavaScript `ToNumber`.
    pub fn to_number(&self) -> f64 {
        match self {
            LiteralValue::Number(n) => *n,
            LiteralValue::Boolean(b) => f64::from(u8::from(*b)),
            LiteralValue::Null => 0.0,
            LiteralValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else if let Some(hex) = trimmed.strip_prefix("0x").or(trimmed.strip_prefix("0X")) {
                    i64::from_str_radix(hex, 16).map_or(f64::NAN, |v| v as f64)
                } else {
                    match trimmed {
                        "Infinity" | "+Infinity" => f64::INFINITY,
                        "-Infinity" => f64::NEG_INFINITY,
                        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
                    }
                }
            }
            LiteralValue::RegExp { .. } => f64::NAN,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The property key this literal names when used in a member access.
    pub fn property_key(&self) -> String {
        match self {
            LiteralValue::String(s) => s.clone(),
            LiteralValue::Number(n) => format_number(*n),
            LiteralValue::Boolean(b) => b.to_string(),
            LiteralValue::Null => "null".to_string(),
            LiteralValue::RegExp { pattern, flags } => format!("/{pattern}/{flags}"),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "{s:?}"),
            LiteralValue::Number(n) => f.write_str(&format_number(*n)),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
            LiteralValue::Null => f.write_str("null"),
            LiteralValue::RegExp { pattern, flags } => write!(f, "/{pattern}/{flags}"),
        }
    }
}

/// Format a number the way JavaScript's `String(n)` does for the common cases.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

// =============================================================================
// Operators
// =============================================================================

macro_rules! operator_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }

            pub fn parse(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operator_enum!(BinaryOperator {
    Eq => "==",
    NotEq => "!=",
    StrictEq => "===",
    StrictNotEq => "!==",
    Lt => "<",
    LtEq => "<=",
    Gt => ">",
    GtEq => ">=",
    Shl => "<<",
    Shr => ">>",
    UShr => ">>>",
    Add => "+",
    Sub => "-",
    Mul => "*",
    Div => "/",
    Rem => "%",
    Exp => "**",
    BitOr => "|",
    BitXor => "^",
    BitAnd => "&",
    In => "in",
    InstanceOf => "instanceof",
});

impl BinaryOperator {
    /// Binding power used by the printer; larger binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::BitOr => 6,
            BinaryOperator::BitXor => 7,
            BinaryOperator::BitAnd => 8,
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::StrictEq
            | BinaryOperator::StrictNotEq => 9,
            BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq
            | BinaryOperator::In
            | BinaryOperator::InstanceOf => 10,
            BinaryOperator::Shl | BinaryOperator::Shr | BinaryOperator::UShr => 11,
            BinaryOperator::Add | BinaryOperator::Sub => 12,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => 13,
            BinaryOperator::Exp => 14,
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Mul
                | BinaryOperator::Div
                | BinaryOperator::Rem
                | BinaryOperator::Exp
                | BinaryOperator::Shl
                | BinaryOperator::Shr
                | BinaryOperator::UShr
                | BinaryOperator::BitOr
                | BinaryOperator::BitXor
                | BinaryOperator::BitAnd
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::NotEq
                | BinaryOperator::StrictEq
                | BinaryOperator::StrictNotEq
                | BinaryOperator::Lt
                | BinaryOperator::LtEq
                | BinaryOperator::Gt
                | BinaryOperator::GtEq
        )
    }
}

operator_enum!(LogicalOperator {
    And => "&&",
    Or => "||",
    Nullish => "??",
});

impl LogicalOperator {
    pub fn precedence(self) -> u8 {
        match self {
            LogicalOperator::Nullish | LogicalOperator::Or => 4,
            LogicalOperator::And => 5,
        }
    }
}

operator_enum!(UnaryOperator {
    Minus => "-",
    Plus => "+",
    Not => "!",
    BitNot => "~",
    TypeOf => "typeof",
    Void => "void",
    Delete => "delete",
});

operator_enum!(UpdateOperator {
    Increment => "++",
    Decrement => "--",
});

operator_enum!(AssignmentOperator {
    Assign => "=",
    AddAssign => "+=",
    SubAssign => "-=",
    MulAssign => "*=",
    DivAssign => "/=",
    RemAssign => "%=",
    ExpAssign => "**=",
    ShlAssign => "<<=",
    ShrAssign => ">>=",
    UShrAssign => ">>>=",
    BitOrAssign => "|=",
    BitXorAssign => "^=",
    BitAndAssign => "&=",
});

impl AssignmentOperator {
    /// The binary operator a compound assignment applies, `None` for `=`.
    pub fn binary(self) -> Option<BinaryOperator> {
        Some(match self {
            AssignmentOperator::Assign => return None,
            AssignmentOperator::AddAssign => BinaryOperator::Add,
            AssignmentOperator::SubAssign => BinaryOperator::Sub,
            AssignmentOperator::MulAssign => BinaryOperator::Mul,
            AssignmentOperator::DivAssign => BinaryOperator::Div,
            AssignmentOperator::RemAssign => BinaryOperator::Rem,
            AssignmentOperator::ExpAssign => BinaryOperator::Exp,
            AssignmentOperator::ShlAssign => BinaryOperator::Shl,
            AssignmentOperator::ShrAssign => BinaryOperator::Shr,
            AssignmentOperator::UShrAssign => BinaryOperator::UShr,
            AssignmentOperator::BitOrAssign => BinaryOperator::BitOr,
            AssignmentOperator::BitXorAssign => BinaryOperator::BitXor,
            AssignmentOperator::BitAndAssign => BinaryOperator::BitAnd,
        })
    }
}

operator_enum!(VariableKind {
    Var => "var",
    Let => "let",
    Const => "const",
});

operator_enum!(PropertyKind {
    Init => "init",
    Get => "get",
    Set => "set",
});

// =============================================================================
// Nodes
// =============================================================================

/// Shared payload of function declarations and expressions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Function {
    pub id: Option<NodeIndex>,
    pub params: Vec<NodeIndex>,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum NodeData {
    Program { body: Vec<NodeIndex> },

    // Expressions
    Identifier { name: String },
    Literal { value: LiteralValue },
    ThisExpression,
    ArrayExpression { elements: Vec<Option<NodeIndex>> },
    ObjectExpression { properties: Vec<NodeIndex> },
    Property { key: NodeIndex, value: NodeIndex, computed: bool, kind: PropertyKind },
    FunctionExpression(Function),
    UnaryExpression { operator: UnaryOperator, argument: NodeIndex },
    UpdateExpression { operator: UpdateOperator, argument: NodeIndex, prefix: bool },
    BinaryExpression { operator: BinaryOperator, left: NodeIndex, right: NodeIndex },
    LogicalExpression { operator: LogicalOperator, left: NodeIndex, right: NodeIndex },
    AssignmentExpression { operator: AssignmentOperator, left: NodeIndex, right: NodeIndex },
    ConditionalExpression { test: NodeIndex, consequent: NodeIndex, alternate: NodeIndex },
    CallExpression { callee: NodeIndex, arguments: Vec<NodeIndex> },
    NewExpression { callee: NodeIndex, arguments: Vec<NodeIndex> },
    MemberExpression { object: NodeIndex, property: NodeIndex, computed: bool },
    SequenceExpression { expressions: Vec<NodeIndex> },

    // Declarations
    FunctionDeclaration(Function),
    VariableDeclaration { kind: VariableKind, declarations: Vec<NodeIndex> },
    VariableDeclarator { id: NodeIndex, init: Option<NodeIndex> },

    // Statements
    ExpressionStatement { expression: NodeIndex },
    BlockStatement { body: Vec<NodeIndex> },
    EmptyStatement,
    ReturnStatement { argument: Option<NodeIndex> },
    IfStatement { test: NodeIndex, consequent: NodeIndex, alternate: Option<NodeIndex> },
    SwitchStatement { discriminant: NodeIndex, cases: Vec<NodeIndex> },
    SwitchCase { test: Option<NodeIndex>, consequent: Vec<NodeIndex> },
    WhileStatement { test: NodeIndex, body: NodeIndex },
    DoWhileStatement { body: NodeIndex, test: NodeIndex },
    ForStatement {
        init: Option<NodeIndex>,
        test: Option<NodeIndex>,
        update: Option<NodeIndex>,
        body: NodeIndex,
    },
    ForInStatement { left: NodeIndex, right: NodeIndex, body: NodeIndex },
    BreakStatement { label: Option<NodeIndex> },
    ContinueStatement { label: Option<NodeIndex> },
    ThrowStatement { argument: NodeIndex },
    TryStatement { block: NodeIndex, handler: Option<NodeIndex>, finalizer: Option<NodeIndex> },
    CatchClause { param: Option<NodeIndex>, body: NodeIndex },
    LabeledStatement { label: NodeIndex, body: NodeIndex },

    /// A kind the engine does not model.
    Other { kind: String, children: Vec<NodeIndex> },
}

/// Discriminant of [`NodeData`], used to key per-kind tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SyntaxKind {
    Program,
    Identifier,
    Literal,
    ThisExpression,
    ArrayExpression,
    ObjectExpression,
    Property,
    FunctionExpression,
    UnaryExpression,
    UpdateExpression,
    BinaryExpression,
    LogicalExpression,
    AssignmentExpression,
    ConditionalExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    SequenceExpression,
    FunctionDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    ExpressionStatement,
    BlockStatement,
    EmptyStatement,
    ReturnStatement,
    IfStatement,
    SwitchStatement,
    SwitchCase,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForInStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    TryStatement,
    CatchClause,
    LabeledStatement,
    Other,
}

impl SyntaxKind {
    pub fn is_function(self) -> bool {
        matches!(self, SyntaxKind::FunctionExpression | SyntaxKind::FunctionDeclaration)
    }
}

impl NodeData {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeData::Program { .. } => SyntaxKind::Program,
            NodeData::Identifier { .. } => SyntaxKind::Identifier,
            NodeData::Literal { .. } => SyntaxKind::Literal,
            NodeData::ThisExpression => SyntaxKind::ThisExpression,
            NodeData::ArrayExpression { .. } => SyntaxKind::ArrayExpression,
            NodeData::ObjectExpression { .. } => SyntaxKind::ObjectExpression,
            NodeData::Property { .. } => SyntaxKind::Property,
            NodeData::FunctionExpression(_) => SyntaxKind::FunctionExpression,
            NodeData::UnaryExpression { .. } => SyntaxKind::UnaryExpression,
            NodeData::UpdateExpression { .. } => SyntaxKind::UpdateExpression,
            NodeData::BinaryExpression { .. } => SyntaxKind::BinaryExpression,
            NodeData::LogicalExpression { .. } => SyntaxKind::LogicalExpression,
            NodeData::AssignmentExpression { .. } => SyntaxKind::AssignmentExpression,
            NodeData::ConditionalExpression { .. } => SyntaxKind::ConditionalExpression,
            NodeData::CallExpression { .. } => SyntaxKind::CallExpression,
            NodeData::NewExpression { .. } => SyntaxKind::NewExpression,
            NodeData::MemberExpression { .. } => SyntaxKind::MemberExpression,
            NodeData::SequenceExpression { .. } => SyntaxKind::SequenceExpression,
            NodeData::FunctionDeclaration(_) => SyntaxKind::FunctionDeclaration,
            NodeData::VariableDeclaration { .. } => SyntaxKind::VariableDeclaration,
            NodeData::VariableDeclarator { .. } => SyntaxKind::VariableDeclarator,
            NodeData::ExpressionStatement { .. } => SyntaxKind::ExpressionStatement,
            NodeData::BlockStatement { .. } => SyntaxKind::BlockStatement,
            NodeData::EmptyStatement => SyntaxKind::EmptyStatement,
            NodeData::ReturnStatement { .. } => SyntaxKind::ReturnStatement,
            NodeData::IfStatement { .. } => SyntaxKind::IfStatement,
            NodeData::SwitchStatement { .. } => SyntaxKind::SwitchStatement,
            NodeData::SwitchCase { .. } => SyntaxKind::SwitchCase,
            NodeData::WhileStatement { .. } => SyntaxKind::WhileStatement,
            NodeData::DoWhileStatement { .. } => SyntaxKind::DoWhileStatement,
            NodeData::ForStatement { .. } => SyntaxKind::ForStatement,
            NodeData::ForInStatement { .. } => SyntaxKind::ForInStatement,
            NodeData::BreakStatement { .. } => SyntaxKind::BreakStatement,
            NodeData::ContinueStatement { .. } => SyntaxKind::ContinueStatement,
            NodeData::ThrowStatement { .. } => SyntaxKind::ThrowStatement,
            NodeData::TryStatement { .. } => SyntaxKind::TryStatement,
            NodeData::CatchClause { .. } => SyntaxKind::CatchClause,
            NodeData::LabeledStatement { .. } => SyntaxKind::LabeledStatement,
            NodeData::Other { .. } => SyntaxKind::Other,
        }
    }

    /// Child nodes in source order.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out: SmallVec<[NodeIndex; 4]> = SmallVec::new();
        match self {
            NodeData::Program { body }
            | NodeData::BlockStatement { body }
            | NodeData::ObjectExpression { properties: body }
            | NodeData::SequenceExpression { expressions: body }
            | NodeData::VariableDeclaration { declarations: body, .. }
            | NodeData::SwitchCase { test: None, consequent: body }
            | NodeData::Other { children: body, .. } => out.extend(body.iter().copied()),
            NodeData::SwitchCase { test: Some(test), consequent } => {
                out.push(*test);
                out.extend(consequent.iter().copied());
            }
            NodeData::Identifier { .. }
            | NodeData::Literal { .. }
            | NodeData::ThisExpression
            | NodeData::EmptyStatement => {}
            NodeData::ArrayExpression { elements } => out.extend(elements.iter().flatten().copied()),
            NodeData::Property { key, value, .. } => out.extend([*key, *value]),
            NodeData::FunctionExpression(function) | NodeData::FunctionDeclaration(function) => {
                out.extend(function.id);
                out.extend(function.params.iter().copied());
                out.push(function.body);
            }
            NodeData::UnaryExpression { argument, .. }
            | NodeData::UpdateExpression { argument, .. }
            | NodeData::ThrowStatement { argument }
            | NodeData::ExpressionStatement { expression: argument } => out.push(*argument),
            NodeData::BinaryExpression { left, right, .. }
            | NodeData::LogicalExpression { left, right, .. }
            | NodeData::AssignmentExpression { left, right, .. }
            | NodeData::MemberExpression { object: left, property: right, .. }
            | NodeData::WhileStatement { test: left, body: right }
            | NodeData::DoWhileStatement { body: left, test: right }
            | NodeData::LabeledStatement { label: left, body: right } => out.extend([*left, *right]),
            NodeData::ConditionalExpression { test, consequent, alternate } => {
                out.extend([*test, *consequent, *alternate]);
            }
            NodeData::CallExpression { callee, arguments } | NodeData::NewExpression { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments.iter().copied());
            }
            NodeData::VariableDeclarator { id, init } => {
                out.push(*id);
                out.extend(*init);
            }
            NodeData::ReturnStatement { argument }
            | NodeData::BreakStatement { label: argument }
            | NodeData::ContinueStatement { label: argument } => out.extend(*argument),
            NodeData::IfStatement { test, consequent, alternate } => {
                out.extend([*test, *consequent]);
                out.extend(*alternate);
            }
            NodeData::SwitchStatement { discriminant, cases } => {
                out.push(*discriminant);
                out.extend(cases.iter().copied());
            }
            NodeData::ForStatement { init, test, update, body } => {
                out.extend(*init);
                out.extend(*test);
                out.extend(*update);
                out.push(*body);
            }
            NodeData::ForInStatement { left, right, body } => out.extend([*left, *right, *body]),
            NodeData::TryStatement { block, handler, finalizer } => {
                out.push(*block);
                out.extend(*handler);
                out.extend(*finalizer);
            }
            NodeData::CatchClause { param, body } => {
                out.extend(*param);
                out.push(*body);
            }
        }
        out
    }

    /// Mutable child slots, in the same order as [`NodeData::children`].
    pub fn child_slots_mut(&mut self) -> SmallVec<[&mut NodeIndex; 4]> {
        let mut out: SmallVec<[&mut NodeIndex; 4]> = SmallVec::new();
        match self {
            NodeData::Program { body }
            | NodeData::BlockStatement { body }
            | NodeData::ObjectExpression { properties: body }
            | NodeData::SequenceExpression { expressions: body }
            | NodeData::VariableDeclaration { declarations: body, .. }
            | NodeData::SwitchCase { test: None, consequent: body }
            | NodeData::Other { children: body, .. } => out.extend(body.iter_mut()),
            NodeData::SwitchCase { test: Some(test), consequent } => {
                out.push(test);
                out.extend(consequent.iter_mut());
            }
            NodeData::Identifier { .. }
            | NodeData::Literal { .. }
            | NodeData::ThisExpression
            | NodeData::EmptyStatement => {}
            NodeData::ArrayExpression { elements } => out.extend(elements.iter_mut().flatten()),
            NodeData::Property { key, value, .. } => {
                out.push(key);
                out.push(value);
            }
            NodeData::FunctionExpression(function) | NodeData::FunctionDeclaration(function) => {
                out.extend(function.id.as_mut());
                out.extend(function.params.iter_mut());
                out.push(&mut function.body);
            }
            NodeData::UnaryExpression { argument, .. }
            | NodeData::UpdateExpression { argument, .. }
            | NodeData::ThrowStatement { argument }
            | NodeData::ExpressionStatement { expression: argument } => out.push(argument),
            NodeData::BinaryExpression { left, right, .. }
            | NodeData::LogicalExpression { left, right, .. }
            | NodeData::AssignmentExpression { left, right, .. }
            | NodeData::MemberExpression { object: left, property: right, .. }
            | NodeData::WhileStatement { test: left, body: right }
            | NodeData::DoWhileStatement { body: left, test: right }
            | NodeData::LabeledStatement { label: left, body: right } => {
                out.push(left);
                out.push(right);
            }
            NodeData::ConditionalExpression { test, consequent, alternate } => {
                out.push(test);
                out.push(consequent);
                out.push(alternate);
            }
            NodeData::CallExpression { callee, arguments } | NodeData::NewExpression { callee, arguments } => {
                out.push(callee);
                out.extend(arguments.iter_mut());
            }
            NodeData::VariableDeclarator { id, init } => {
                out.push(id);
                out.extend(init.as_mut());
            }
            NodeData::ReturnStatement { argument }
            | NodeData::BreakStatement { label: argument }
            | NodeData::ContinueStatement { label: argument } => out.extend(argument.as_mut()),
            NodeData::IfStatement { test, consequent, alternate } => {
                out.push(test);
                out.push(consequent);
                out.extend(alternate.as_mut());
            }
            NodeData::SwitchStatement { discriminant, cases } => {
                out.push(discriminant);
                out.extend(cases.iter_mut());
            }
            NodeData::ForStatement { init, test, update, body } => {
                out.extend(init.as_mut());
                out.extend(test.as_mut());
                out.extend(update.as_mut());
                out.push(body);
            }
            NodeData::ForInStatement { left, right, body } => {
                out.push(left);
                out.push(right);
                out.push(body);
            }
            NodeData::TryStatement { block, handler, finalizer } => {
                out.push(block);
                out.extend(handler.as_mut());
                out.extend(finalizer.as_mut());
            }
            NodeData::CatchClause { param, body } => {
                out.extend(param.as_mut());
                out.push(body);
            }
        }
        out
    }
}

/// An AST node: payload plus optional source location.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub data: NodeData,
    pub loc: Option<SourceLocation>,
}

impl Node {
    pub fn new(data: NodeData) -> Node {
        Node { data, loc: None }
    }

    pub fn with_loc(data: NodeData, loc: Option<SourceLocation>) -> Node {
        Node { data, loc }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind()
    }

    pub fn start(&self) -> Option<Position> {
        self.loc.map(|loc| loc.start)
    }

    pub fn end(&self) -> Option<Position> {
        self.loc.map(|loc| loc.end)
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Identifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn literal(&self) -> Option<&LiteralValue> {
        match &self.data {
            NodeData::Literal { value } => Some(value),
            _ => None,
        }
    }

    pub fn function(&self) -> Option<&Function> {
        match &self.data {
            NodeData::FunctionExpression(function) | NodeData::FunctionDeclaration(function) => {
                Some(function)
            }
            _ => None,
        }
    }
}
