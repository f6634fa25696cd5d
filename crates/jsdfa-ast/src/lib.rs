//! Arena-backed ESTree AST for the jsdfa data-flow engine.
//!
//! - `node`: node payloads (`NodeData`), kinds and operators
//! - `arena`: `NodeArena` storage, structural child access, subtree cloning
//! - `estree`: ingestion of ESTree JSON produced by an external parser
//! - `builder`: programmatic construction with synthetic source positions
//! - `walk`: non-recursive traversal with replacement and substitution
//! - `printer`: compact JavaScript rendering for diagnostics and snapshots

pub mod node;
pub use node::{
    AssignmentOperator, BinaryOperator, Function, LiteralValue, LogicalOperator, Node, NodeData,
    NodeIndex, PropertyKind, SyntaxKind, UnaryOperator, UpdateOperator, VariableKind,
};

pub mod arena;
pub use arena::NodeArena;

pub mod estree;
pub use estree::{EstreeError, from_estree};

pub mod builder;
pub use builder::AstBuilder;

pub mod walk;
pub use walk::{Visit, Visitor, walk, walk_all};

pub mod printer;
pub use printer::{Printer, render};
