//! Serializable view of the scope tree.
//!
//! A snapshot lists, for every scope, the chain of each declared variable
//! and of the return variable, with values rendered as source text. Objects
//! and arrays are expanded into JSON objects and arrays so nested state can
//! be inspected directly.

use crate::analyzer::Analyzer;
use crate::ids::{ScopeId, StatementId, ValueId};
use crate::statement::StatementKind;
use crate::value::ValueKind;
use indexmap::IndexMap;
use jsdfa_common::Loc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScopeSnapshot {
    pub definitions: IndexMap<String, Vec<EntrySnapshot>>,
    #[serde(rename = "return", skip_serializing_if = "Vec::is_empty")]
    pub returns: Vec<EntrySnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ScopeSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntrySnapshot {
    Assign {
        value: RenderedValue,
        #[serde(rename = "accessPath", skip_serializing_if = "Option::is_none")]
        access_path: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        conditional: Option<String>,
        loc: Loc,
    },
    Use {
        expression: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        conditional: Option<String>,
        loc: Loc,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderedValue {
    Code(String),
    Object(IndexMap<String, RenderedValue>),
    Array(Vec<Option<RenderedValue>>),
}

impl RenderedValue {
    pub fn as_code(&self) -> Option<&str> {
        match self {
            RenderedValue::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&RenderedValue> {
        match self {
            RenderedValue::Object(properties) => properties.get(key),
            _ => None,
        }
    }
}

impl Analyzer {
    /// Snapshot of the whole scope tree.
    pub fn snapshot_scopes(&mut self) -> ScopeSnapshot {
        let global = self.global_scope();
        self.snapshot_scope(global)
    }

    pub fn snapshot_scope(&mut self, scope: ScopeId) -> ScopeSnapshot {
        let variables: Vec<(String, Vec<StatementId>)> = self.scopes[scope.index()]
            .definitions
            .iter()
            .map(|(name, &variable)| (name.clone(), self.variables[variable.index()].chain.clone()))
            .collect();
        let mut definitions = IndexMap::with_capacity(variables.len());
        for (name, chain) in variables {
            let entries = chain.into_iter().map(|statement| self.snapshot_entry(statement)).collect();
            definitions.insert(name, entries);
        }

        let return_variable = self.scopes[scope.index()].return_variable;
        let returns = self.variables[return_variable.index()]
            .chain
            .clone()
            .into_iter()
            .map(|statement| self.snapshot_entry(statement))
            .collect();

        let children = self.scopes[scope.index()]
            .children
            .clone()
            .into_iter()
            .map(|child| self.snapshot_scope(child))
            .collect();

        ScopeSnapshot {
            definitions,
            returns,
            children,
        }
    }

    fn snapshot_entry(&mut self, statement: StatementId) -> EntrySnapshot {
        let entry = self.statements[statement.index()].clone();
        let conditional = entry.conditional.map(|id| self.flatten_conditional(id));
        match entry.kind {
            StatementKind::Assign { access_path, value } => {
                let access_path = (!access_path.is_empty()).then(|| {
                    access_path
                        .iter()
                        .map(|&segment| match self.node_literal(segment) {
                            Some(literal) => literal.property_key(),
                            None => self.render(segment),
                        })
                        .collect::<Vec<_>>()
                        .join(".")
                });
                EntrySnapshot::Assign {
                    value: self.rendered_value(value),
                    access_path,
                    conditional,
                    loc: entry.loc,
                }
            }
            StatementKind::Use { expression } => EntrySnapshot::Use {
                expression: self.render(expression),
                conditional,
                loc: entry.loc,
            },
        }
    }

    /// Render a value, expanding objects and arrays.
    pub fn rendered_value(&mut self, value: ValueId) -> RenderedValue {
        match &self.values[value.index()].kind {
            ValueKind::Object { properties, .. } => {
                let properties: Vec<(String, ValueId)> = properties.iter().map(|(k, &v)| (k.clone(), v)).collect();
                let mut rendered = IndexMap::with_capacity(properties.len());
                for (key, child) in properties {
                    rendered.insert(key, self.rendered_value(child));
                }
                RenderedValue::Object(rendered)
            }
            ValueKind::Array { elements, .. } => {
                let elements = elements.clone();
                RenderedValue::Array(
                    elements
                        .into_iter()
                        .map(|element| element.map(|child| self.rendered_value(child)))
                        .collect(),
                )
            }
            ValueKind::Literal | ValueKind::Function { .. } | ValueKind::Expression => {
                RenderedValue::Code(self.render_value(value))
            }
        }
    }

    /// The scope tree as pretty-printed JSON.
    pub fn snapshot_json(&mut self) -> serde_json::Result<String> {
        let snapshot = self.snapshot_scopes();
        serde_json::to_string_pretty(&snapshot)
    }
}

#[cfg(test)]
#[path = "tests/serialize_tests.rs"]
mod serialize_tests;
