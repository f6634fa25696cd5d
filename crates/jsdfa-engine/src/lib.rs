//! Flow-sensitive, interprocedural data-flow engine for JavaScript ASTs.
//!
//! The [`Analyzer`] owns the AST arena and every analysis entity (scopes,
//! variables, statements, values, conditional branches), all addressed by
//! integer ids. Analysis proceeds in three phases:
//!
//! 1. **Scope tree**: built once when the analyzer is created.
//! 2. **Initialization**: declarative AST shapes become use-def chain entries.
//! 3. **Derivation**: a bounded worklist fixpoint derives and reduces every
//!    chain entry, simulating calls along the way.
//!
//! ```ignore
//! let mut analyzer = Analyzer::from_estree(&json, AnalyzerOptions::default())?;
//! analyzer.analyze();
//! let snapshot = analyzer.snapshot_scopes();
//! ```

pub mod ids;
pub use ids::{ConditionalId, RuleId, ScopeId, StatementId, ValueId, VariableId};

pub mod options;
pub use options::{AnalyzerOptions, Derivation, WorklistFilter};

pub mod analyzer;
pub use analyzer::Analyzer;

pub mod scope;
pub use scope::{Scope, VariableRef};

mod initialize;

pub mod variable;
pub use variable::{Variable, VariableKind};

pub mod statement;
pub use statement::{Statement, StatementKind};

pub mod value;
pub use value::{Value, ValueKind};

pub mod conditional;
pub use conditional::ConditionalStatement;

mod derive;

pub mod reduce;
pub use reduce::{ReduceContext, ReduceRule, ReduceRules};

pub mod function;
pub use function::{BuiltinCall, BuiltinHook};

mod worklist;

pub mod serialize;
pub use serialize::{EntrySnapshot, RenderedValue, ScopeSnapshot};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
