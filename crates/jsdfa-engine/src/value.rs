//! Abstract values.
//!
//! A value is built from an AST and classified by the AST's shape. Object
//! literals and arrays keep one child value per property or element, so
//! member writes can update them in place; functions keep properties
//! written onto them (`F.prototype`, `F.x`). Every other expression keeps
//! its own copy of the AST, which derivation rewrites.
//!
//! Values never share mutable structure with chain entries: reading a
//! variable produces a snapshot rebuilt from the derived AST of the writes.

use crate::analyzer::Analyzer;
use crate::ids::{ScopeId, StatementId, ValueId, VariableId};
use indexmap::IndexMap;
use jsdfa_ast::{LiteralValue, NodeData, NodeIndex, PropertyKind};
use jsdfa_common::SourceLocation;
use jsdfa_common::limits::{MAX_ARRAY_GAP, STACK_RED_ZONE, STACK_SEGMENT_SIZE};

/// Prototype chains longer than this are treated as cyclic.
const MAX_PROTOTYPE_DEPTH: usize = 64;

#[derive(Clone, Debug)]
pub enum ValueKind {
    Literal,
    Object {
        properties: IndexMap<String, ValueId>,
        prototype: Option<ValueId>,
        /// Scope annotation restored on rebuilt literals.
        rebuild_scope: Option<ScopeId>,
    },
    Array {
        elements: Vec<Option<ValueId>>,
        properties: IndexMap<String, ValueId>,
        rebuild_scope: Option<ScopeId>,
    },
    Function {
        properties: IndexMap<String, ValueId>,
    },
    /// Any other expression; `Value::ast` is the value's own tree.
    Expression,
}

impl ValueKind {
    pub fn is_function(&self) -> bool {
        matches!(self, ValueKind::Function { .. })
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ValueKind::Object { .. } | ValueKind::Array { .. })
    }

    /// Own properties in insertion order. Array elements are not included.
    pub fn properties(&self) -> Option<&IndexMap<String, ValueId>> {
        match self {
            ValueKind::Object { properties, .. }
            | ValueKind::Array { properties, .. }
            | ValueKind::Function { properties } => Some(properties),
            ValueKind::Literal | ValueKind::Expression => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Value {
    pub kind: ValueKind,
    pub ast: NodeIndex,
    /// Scope the value's expressions are resolved in.
    pub scope: Option<ScopeId>,
    /// Object or array this value is a property or element of.
    pub parent: Option<ValueId>,
    /// Property key under `parent`, or the name of the variable written.
    pub name: Option<String>,
    pub host: Option<StatementId>,
    pub target_variable: Option<VariableId>,
}

impl Analyzer {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Value of an AST. Expression trees are copied so derivation never
    /// touches the original.
    pub fn value_from_ast(&mut self, ast: NodeIndex, scope: Option<ScopeId>) -> ValueId {
        let value = self.add_value(Value {
            kind: ValueKind::Expression,
            ast,
            scope,
            parent: None,
            name: None,
            host: None,
            target_variable: None,
        });
        self.populate(value, ast, true);
        value
    }

    /// Fresh empty object, optionally positioned like `like`.
    pub(crate) fn new_object(&mut self, scope: Option<ScopeId>, like: Option<NodeIndex>) -> ValueId {
        let ast = self.alloc_like(
            NodeData::ObjectExpression {
                properties: Vec::new(),
            },
            like,
        );
        self.value_from_ast(ast, scope)
    }

    /// Reclassify `value` by the shape of `ast`, rebuilding its children.
    pub(crate) fn update_value(&mut self, value: ValueId, ast: NodeIndex) {
        self.populate(value, ast, false);
    }

    fn populate(&mut self, value: ValueId, ast: NodeIndex, copy_expression: bool) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            self.populate_inner(value, ast, copy_expression);
        });
    }

    fn populate_inner(&mut self, value: ValueId, ast: NodeIndex, copy_expression: bool) {
        let scope = self.values[value.index()].scope;
        let Some(node) = self.arena.get(ast) else {
            return;
        };
        let (kind, ast) = match &node.data {
            NodeData::Literal { .. } => (ValueKind::Literal, ast),
            NodeData::FunctionExpression(_) | NodeData::FunctionDeclaration(_) => (
                ValueKind::Function {
                    properties: IndexMap::new(),
                },
                ast,
            ),
            NodeData::ObjectExpression { properties } => {
                let properties = properties.clone();
                self.values[value.index()].ast = ast;
                self.values[value.index()].kind = ValueKind::Object {
                    properties: IndexMap::new(),
                    prototype: self.prototypes.get(&ast).copied(),
                    rebuild_scope: self.scope_of(ast),
                };
                for property in properties {
                    let Some((key, child_ast)) = self.property_entry(property) else {
                        continue;
                    };
                    let child = self.value_from_ast(child_ast, scope);
                    self.set(value, &key, child);
                }
                return;
            }
            NodeData::ArrayExpression { elements } => {
                let elements = elements.clone();
                self.values[value.index()].ast = ast;
                self.values[value.index()].kind = ValueKind::Array {
                    elements: Vec::with_capacity(elements.len()),
                    properties: IndexMap::new(),
                    rebuild_scope: self.scope_of(ast),
                };
                for (index, element) in elements.into_iter().enumerate() {
                    match element {
                        Some(element) => {
                            let child = self.value_from_ast(element, scope);
                            self.set(value, &index.to_string(), child);
                        }
                        None => {
                            if let ValueKind::Array { elements, .. } = &mut self.values[value.index()].kind {
                                elements.push(None);
                            }
                        }
                    }
                }
                if let Some(named) = self.array_properties.get(&ast).cloned() {
                    for (key, child_ast) in named {
                        let child = self.value_from_ast(child_ast, scope);
                        self.set(value, &key, child);
                    }
                }
                return;
            }
            _ => {
                let ast = if copy_expression { self.clone_tree(ast) } else { ast };
                (ValueKind::Expression, ast)
            }
        };
        let entry = &mut self.values[value.index()];
        entry.kind = kind;
        entry.ast = ast;
    }

    /// Key and value node of an object literal property. Computed keys
    /// that are not literals have no static key.
    fn property_entry(&self, property: NodeIndex) -> Option<(String, NodeIndex)> {
        let NodeData::Property {
            key,
            value,
            computed,
            kind,
        } = &self.arena.get(property)?.data
        else {
            return None;
        };
        if *kind != PropertyKind::Init {
            return None;
        }
        let key_node = self.arena.get(*key)?;
        let key = match (key_node.identifier_name(), key_node.literal()) {
            (Some(name), _) if !computed => name.to_string(),
            (_, Some(literal)) => literal.property_key(),
            _ => return None,
        };
        Some((key, *value))
    }

    /// Set the resolution scope of a value and everything below it.
    pub(crate) fn set_value_scope(&mut self, value: ValueId, scope: Option<ScopeId>) {
        let mut stack = vec![value];
        let mut visited = 0usize;
        while let Some(current) = stack.pop() {
            visited += 1;
            if visited > self.values.len() {
                break;
            }
            let entry = &mut self.values[current.index()];
            entry.scope = scope;
            if let ValueKind::Array { elements, .. } = &entry.kind {
                stack.extend(elements.iter().flatten().copied());
            }
            if let Some(properties) = entry.kind.properties() {
                stack.extend(properties.values().copied());
            }
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Property `key` of `value`, following the prototype chain of objects.
    pub fn get(&self, value: ValueId, key: &str) -> Option<ValueId> {
        let mut current = value;
        for _ in 0..MAX_PROTOTYPE_DEPTH {
            match &self.values[current.index()].kind {
                ValueKind::Array {
                    elements,
                    properties,
                    ..
                } => {
                    if let Some(index) = array_index(key)
                        && let Some(&Some(element)) = elements.get(index)
                    {
                        return Some(element);
                    }
                    return properties.get(key).copied();
                }
                ValueKind::Object {
                    properties,
                    prototype,
                    ..
                } => {
                    if let Some(&found) = properties.get(key) {
                        return Some(found);
                    }
                    current = (*prototype)?;
                }
                ValueKind::Function { properties } => return properties.get(key).copied(),
                ValueKind::Literal | ValueKind::Expression => return None,
            }
        }
        None
    }

    /// Store `child` under `key`. Literals and plain expressions have no
    /// properties; the write is dropped and `false` returned.
    pub fn set(&mut self, value: ValueId, key: &str, child: ValueId) -> bool {
        match &mut self.values[value.index()].kind {
            ValueKind::Array {
                elements,
                properties,
                ..
            } => match array_index(key) {
                Some(index) if index <= elements.len() + MAX_ARRAY_GAP => {
                    if elements.len() <= index {
                        elements.resize(index + 1, None);
                    }
                    elements[index] = Some(child);
                    properties.shift_remove(key);
                }
                _ => {
                    properties.insert(key.to_string(), child);
                }
            },
            ValueKind::Object { properties, .. } | ValueKind::Function { properties } => {
                properties.insert(key.to_string(), child);
            }
            ValueKind::Literal | ValueKind::Expression => return false,
        }
        let entry = &mut self.values[child.index()];
        entry.parent = Some(value);
        entry.name = Some(key.to_string());
        true
    }

    pub fn prototype(&self, value: ValueId) -> Option<ValueId> {
        match self.values[value.index()].kind {
            ValueKind::Object { prototype, .. } => prototype,
            _ => None,
        }
    }

    pub(crate) fn set_prototype(&mut self, value: ValueId, prototype: Option<ValueId>) {
        if let ValueKind::Object { prototype: slot, .. } = &mut self.values[value.index()].kind {
            *slot = prototype;
        }
    }

    /// Derive and reduce a computed path segment to a literal key node.
    pub(crate) fn resolve_segment(&mut self, segment: NodeIndex, scope: Option<ScopeId>) -> Option<NodeIndex> {
        if self.node_literal(segment).is_some() {
            return Some(segment);
        }
        let scope = self.scope_of(segment).or(scope);
        let value = self.value_from_ast(segment, scope);
        self.derive_value(value);
        self.reduce_value(value);
        let derived = self.derived_ast(value);
        self.node_literal(derived).map(|_| derived)
    }

    fn segment_keys(&mut self, value: ValueId, path: &[NodeIndex]) -> Option<Vec<String>> {
        let scope = self.values[value.index()].scope;
        let mut keys = Vec::with_capacity(path.len());
        for &segment in path {
            let resolved = self.resolve_segment(segment, scope)?;
            keys.push(self.node_literal(resolved)?.property_key());
        }
        Some(keys)
    }

    /// Read `value` through a member path.
    pub fn access(&mut self, value: ValueId, path: &[NodeIndex]) -> Option<ValueId> {
        let keys = self.segment_keys(value, path)?;
        let mut current = value;
        for key in &keys {
            current = self.get(current, key)?;
        }
        Some(current)
    }

    /// Write `written` at the end of a member path below `value`. A missing
    /// `prototype` along the way is created as an empty object.
    pub fn access_write(&mut self, value: ValueId, path: &[NodeIndex], written: ValueId) -> bool {
        let Some(keys) = self.segment_keys(value, path) else {
            return false;
        };
        let Some((last, prefix)) = keys.split_last() else {
            return false;
        };
        let mut current = value;
        for key in prefix {
            if key == "prototype" && self.get(current, key).is_none() && self.can_hold_properties(current) {
                let scope = self.values[current.index()].scope;
                let prototype = self.new_object(scope, None);
                self.set(current, key, prototype);
            }
            let Some(next) = self.get(current, key) else {
                return false;
            };
            current = next;
        }
        self.set(current, last, written)
    }

    fn can_hold_properties(&self, value: ValueId) -> bool {
        self.values[value.index()].kind.properties().is_some()
    }

    /// Dotted access path of a value (`lib.init`), from the names along its
    /// parent chain.
    pub fn access_path_name(&self, value: ValueId) -> Option<String> {
        let mut names: Vec<&str> = Vec::new();
        let mut current = Some(value);
        while let Some(id) = current {
            if names.len() >= MAX_PROTOTYPE_DEPTH {
                break;
            }
            let Some(name) = self.values[id.index()].name.as_deref() else {
                break;
            };
            names.push(name);
            current = self.values[id.index()].parent;
        }
        if names.is_empty() {
            return None;
        }
        names.reverse();
        Some(names.join("."))
    }

    // =========================================================================
    // Derived ASTs
    // =========================================================================

    /// AST standing for the value's current knowledge. Objects and arrays
    /// are rebuilt from their children.
    pub fn derived_ast(&mut self, value: ValueId) -> NodeIndex {
        let loc = self.arena.loc(self.values[value.index()].ast);
        self.derived_ast_at(value, loc)
    }

    /// Like [`Analyzer::derived_ast`], placing rebuilt literals at `loc`.
    pub(crate) fn derived_ast_at(&mut self, value: ValueId, loc: Option<SourceLocation>) -> NodeIndex {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || self.rebuild(value, loc))
    }

    fn rebuild(&mut self, value: ValueId, loc: Option<SourceLocation>) -> NodeIndex {
        let entry = &self.values[value.index()];
        match &entry.kind {
            ValueKind::Literal | ValueKind::Function { .. } | ValueKind::Expression => entry.ast,
            ValueKind::Object {
                properties,
                prototype,
                rebuild_scope,
            } => {
                let properties: Vec<(String, ValueId)> = properties.iter().map(|(k, &v)| (k.clone(), v)).collect();
                let prototype = *prototype;
                let rebuild_scope = *rebuild_scope;
                let mut nodes = Vec::with_capacity(properties.len());
                for (key, child) in properties {
                    let key = self.arena.add(jsdfa_ast::Node::with_loc(
                        NodeData::Literal {
                            value: LiteralValue::String(key),
                        },
                        loc,
                    ));
                    let child = self.derived_ast(child);
                    nodes.push(self.arena.add(jsdfa_ast::Node::with_loc(
                        NodeData::Property {
                            key,
                            value: child,
                            computed: false,
                            kind: PropertyKind::Init,
                        },
                        loc,
                    )));
                }
                let object = self.arena.add(jsdfa_ast::Node::with_loc(
                    NodeData::ObjectExpression { properties: nodes },
                    loc,
                ));
                if let Some(scope) = rebuild_scope {
                    self.scope_of.insert(object, scope);
                }
                if let Some(prototype) = prototype {
                    self.prototypes.insert(object, prototype);
                }
                object
            }
            ValueKind::Array {
                elements,
                properties,
                rebuild_scope,
            } => {
                let elements = elements.clone();
                let properties: Vec<(String, ValueId)> = properties.iter().map(|(k, &v)| (k.clone(), v)).collect();
                let rebuild_scope = *rebuild_scope;
                let elements = elements
                    .into_iter()
                    .map(|element| element.map(|child| self.derived_ast(child)))
                    .collect();
                let named: Vec<(String, NodeIndex)> = properties
                    .into_iter()
                    .map(|(key, child)| (key, self.derived_ast(child)))
                    .collect();
                let array = self.arena.add(jsdfa_ast::Node::with_loc(
                    NodeData::ArrayExpression { elements },
                    loc,
                ));
                if let Some(scope) = rebuild_scope {
                    self.scope_of.insert(array, scope);
                }
                if !named.is_empty() {
                    self.array_properties.insert(array, named);
                }
                array
            }
        }
    }

    /// Independent copy of a value, rebuilt from its derived AST. The copy
    /// keeps the original's name and scope.
    pub fn snapshot(&mut self, value: ValueId) -> ValueId {
        let derived = self.derived_ast(value);
        let scope = self.values[value.index()].scope;
        let copy = self.value_from_ast(derived, scope);
        self.values[copy.index()].name = self.values[value.index()].name.clone();
        if let ValueKind::Function { properties } = &self.values[value.index()].kind
            && !properties.is_empty()
        {
            let properties: Vec<(String, ValueId)> = properties.iter().map(|(k, &v)| (k.clone(), v)).collect();
            for (key, child) in properties {
                let child = self.snapshot(child);
                self.set(copy, &key, child);
            }
        }
        copy
    }
}

/// Canonical array index form of a property key. Indices stop below
/// `2^32 - 1`; larger numeric keys are ordinary property names.
fn array_index(key: &str) -> Option<usize> {
    let index: u32 = key.parse().ok()?;
    (index != u32::MAX && index.to_string() == key).then_some(index as usize)
}

#[cfg(test)]
#[path = "tests/value_tests.rs"]
mod value_tests;
