//! Simulated function calls.
//!
//! Executing a function value re-runs its body scope for one call site:
//! the scope is cleared, parameters and `this` are bound to the values the
//! caller passes, the body is initialized and derived with the options of
//! the running derivation, and writes the body made to outer variables are
//! moved onto those variables at the location of the call.

use crate::analyzer::Analyzer;
use crate::ids::{ScopeId, ValueId, VariableId};
use crate::statement::StatementKind;
use crate::variable::VariableKind;
use jsdfa_ast::{Function, NodeData, NodeIndex, SyntaxKind};
use jsdfa_common::limits::{STACK_RED_ZONE, STACK_SEGMENT_SIZE};
use jsdfa_common::{DiagnosticKind, Loc};
use std::rc::Rc;
use tracing::{debug, trace};

/// A simulated call, as seen by a builtin hook.
#[derive(Copy, Clone, Debug)]
pub struct BuiltinCall {
    /// Function value being called.
    pub function: ValueId,
    /// The call or `new` expression.
    pub call: NodeIndex,
    /// Scope the call was made from.
    pub caller: ScopeId,
    /// Body scope of the callee, fully derived for this call.
    pub scope: ScopeId,
}

/// Hook run after the body of a matching function was derived for a call.
pub type BuiltinHook = Rc<dyn Fn(&mut Analyzer, &BuiltinCall)>;

/// Parameter or `this` bound to a variable the caller owns; member writes
/// made through it inside the callee are copied back.
struct PassedIn {
    name: String,
    variable: VariableId,
}

impl Analyzer {
    /// Body scope of a function value.
    pub fn function_body_scope(&self, function: ValueId) -> Option<ScopeId> {
        let ast = self.values[function.index()].ast;
        let body = self.arena.get(ast)?.function()?.body;
        self.scope_of(body)
    }

    /// Simulate `call` of `function` from `caller`. Returns the callee's
    /// return variable, or `None` when the callee cannot be executed or is
    /// already executing on the caller chain.
    pub fn execute(&mut self, function: ValueId, call: NodeIndex, caller: ScopeId) -> Option<VariableId> {
        if !self.values[function.index()].kind.is_function() {
            return None;
        }
        let ast = self.values[function.index()].ast;
        let declaration = self.arena.get(ast)?.function()?.clone();
        let body = self.scope_of(declaration.body)?;
        if self.on_caller_chain(caller, body) {
            self.report(
                DiagnosticKind::RecursiveCall,
                "callee is already executing",
                Some(call),
            );
            return None;
        }
        stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT_SIZE, || {
            self.execute_body(function, &declaration, body, call, caller)
        })
    }

    fn execute_body(
        &mut self,
        function: ValueId,
        declaration: &Function,
        body: ScopeId,
        call: NodeIndex,
        caller: ScopeId,
    ) -> Option<VariableId> {
        let path = self.access_path_name(function);
        let _span = tracing::debug_span!(
            "execute",
            function = path.as_deref().unwrap_or("<anonymous>"),
            scope = body.0
        )
        .entered();

        let is_new = self.kind_of(call) == Some(SyntaxKind::NewExpression);
        let this = self.this_binding(function, is_new, call, caller);

        self.clear_scope(body);
        let passed = self.bind_closure(body, declaration, call, this, caller);
        let call_loc = self.start_loc(caller, call).unwrap_or(Loc::UNORDERED);
        let call_end = self.end_loc(caller, call).unwrap_or(Loc::UNORDERED);
        {
            let scope = &mut self.scopes[body.index()];
            scope.caller = Some(caller);
            scope.call_loc = call_loc;
            scope.call_end = call_end;
        }

        self.initialize(body);
        let derivation = self.active.clone();
        self.derivation(body, None, &derivation);

        if let Some(path) = path
            && let Some(hook) = self.builtin_for(&path)
        {
            debug!(path = %path, "running builtin hook");
            hook(&mut *self, &BuiltinCall {
                function,
                call,
                caller,
                scope: body,
            });
        }

        self.apply_modify(body, &passed);
        Some(self.scopes[body.index()].return_variable)
    }

    /// Value `this` is bound to: a fresh object inheriting from the
    /// callee's `prototype` for `new`, else a snapshot of the object the
    /// function was read from, else `window`.
    fn this_binding(&mut self, function: ValueId, is_new: bool, call: NodeIndex, caller: ScopeId) -> ValueId {
        if is_new {
            let object = self.new_object(Some(caller), Some(call));
            let prototype = self.get(function, "prototype");
            self.set_prototype(object, prototype);
            return object;
        }
        let owner = self.values[function.index()].parent;
        let source = match owner {
            Some(owner) => Some(owner),
            None => {
                let window = self.window();
                self.inference(window, None, &[])
            }
        };
        match source {
            Some(source) => {
                let target = self.values[source.index()].target_variable;
                let copy = self.snapshot(source);
                self.values[copy.index()].target_variable = target;
                copy
            }
            None => self.new_object(Some(caller), Some(call)),
        }
    }

    /// Bind `this` and the parameters of `declaration` in `body`. Arguments
    /// are read in the caller at the location of the argument.
    fn bind_closure(
        &mut self,
        body: ScopeId,
        declaration: &Function,
        call: NodeIndex,
        this: ValueId,
        caller: ScopeId,
    ) -> Vec<PassedIn> {
        let mut passed = Vec::new();

        let this_variable = self.new_variable("this", Some(body), VariableKind::Closure);
        self.scopes[body.index()]
            .closure
            .insert("this".to_string(), this_variable);
        let this_target = self.values[this.index()].target_variable;
        self.assign_value(this_variable, this, Some(Loc::HOISTED));
        if let Some(variable) = this_target {
            passed.push(PassedIn {
                name: "this".to_string(),
                variable,
            });
        }

        let arguments = match self.arena.get(call).map(|node| &node.data) {
            Some(NodeData::CallExpression { arguments, .. } | NodeData::NewExpression { arguments, .. }) => {
                arguments.clone()
            }
            _ => Vec::new(),
        };
        for (index, &param) in declaration.params.iter().enumerate() {
            let Some(name) = self.arena.identifier_name(param).map(str::to_string) else {
                continue;
            };
            let variable = self.new_variable(&name, Some(body), VariableKind::Closure);
            self.scopes[body.index()]
                .closure
                .insert(name.clone(), variable);
            let Some(&argument) = arguments.get(index) else {
                continue;
            };

            let inferred = match self.kind_of(argument) {
                Some(
                    SyntaxKind::Identifier
                    | SyntaxKind::ThisExpression
                    | SyntaxKind::MemberExpression
                    | SyntaxKind::CallExpression
                    | SyntaxKind::NewExpression,
                ) => {
                    let loc = self.start_loc(caller, argument);
                    self.infer_value(caller, argument, loc)
                }
                _ => None,
            };
            match inferred {
                Some(value) => {
                    let target = self.values[value.index()].target_variable;
                    self.assign_value(variable, value, Some(Loc::HOISTED));
                    if let Some(target) = target {
                        passed.push(PassedIn {
                            name,
                            variable: target,
                        });
                    }
                }
                None => {
                    let argument_scope = self.scope_of(argument).unwrap_or(caller);
                    let statement = self.new_assignment(Vec::new(), argument, argument_scope);
                    self.add_node(variable, statement, Some(Loc::HOISTED));
                }
            }
        }
        trace!(scope = body.0, passed = passed.len(), "closure bound");
        passed
    }

    /// Move the body's writes to outer variables onto those variables, at
    /// the end of the call in the defining scope (or the end of that scope
    /// when no live call connects them). Member writes made through
    /// passed-in parameters and `this` are copied to the caller's variable.
    fn apply_modify(&mut self, body: ScopeId, passed: &[PassedIn]) {
        let shadows: Vec<(String, VariableId)> = self.scopes[body.index()]
            .modified
            .iter()
            .map(|(name, &shadow)| (name.clone(), shadow))
            .collect();
        for (name, shadow) in shadows {
            let VariableKind::Modified { defined_in } = self.variables[shadow.index()].kind else {
                continue;
            };
            let Some(target) = self.lookup(defined_in, &name) else {
                continue;
            };
            let loc = self
                .call_end_in(body, defined_in)
                .unwrap_or_else(|| self.scope_end(defined_in));
            self.apply_to(shadow, target, loc);
        }

        for entry in passed {
            let Some(closure) = self.scopes[body.index()].closure.get(&entry.name).copied() else {
                continue;
            };
            let Some(owner) = self.variables[entry.variable.index()].scope else {
                let name = self.variables[entry.variable.index()].name.clone();
                self.report(
                    DiagnosticKind::DetachedVariable,
                    format!("`{name}` has no scope to receive writes"),
                    None,
                );
                continue;
            };
            let loc = self
                .call_end_in(body, owner)
                .unwrap_or_else(|| self.scope_end(owner));
            let chain = self.variables[closure.index()].chain.clone();
            for statement in chain.into_iter().skip(1) {
                let is_member_write = matches!(
                    &self.statements[statement.index()].kind,
                    StatementKind::Assign { access_path, .. } if !access_path.is_empty()
                );
                if !is_member_write {
                    break;
                }
                self.add_node(entry.variable, statement, Some(loc));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/function_tests.rs"]
mod function_tests;
