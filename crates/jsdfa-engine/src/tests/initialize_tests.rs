use super::*;
use crate::fixtures::{analyzed, chain_of, first_child, global, global_number, initialized};
use jsdfa_ast::AssignmentOperator;

#[test]
fn test_function_declaration_is_hoisted() {
    // var r = f; function f() {}
    let mut analyzer = analyzed(1, |b| {
        let read = b.ident("f");
        let r = b.var("r", Some(read));
        let f = b.function_decl("f", &[], Vec::new());
        vec![r, f]
    });
    let chain = chain_of(&analyzer, "f");
    assert_eq!(chain.len(), 1);
    assert_eq!(analyzer.statement(chain[0]).loc, Loc::HOISTED);

    let r = analyzer.value_of("r").expect("r");
    assert!(analyzer.value(r).kind.is_function());
}

#[test]
fn test_declarations_record_writes_in_order() {
    let analyzer = initialized(|b| {
        let one = b.num(1.0);
        let decl = b.vars(vec![("a", Some(one)), ("b", None)]);
        let target = b.ident("a");
        let two = b.num(2.0);
        let write = b.assign_stmt(target, two);
        vec![decl, write]
    });
    let chain = chain_of(&analyzer, "a");
    assert_eq!(chain.len(), 2);
    assert!(analyzer.statement(chain[0]).loc < analyzer.statement(chain[1]).loc);
    assert!(chain_of(&analyzer, "b").is_empty());
}

#[test]
fn test_chained_assignment_writes_every_target() {
    // var a, b; a = b = 3;
    let mut analyzer = analyzed(1, |b| {
        let decl = b.vars(vec![("a", None), ("b", None)]);
        let inner_target = b.ident("b");
        let three = b.num(3.0);
        let inner = b.assign(inner_target, three);
        let outer_target = b.ident("a");
        vec![decl, b.assign_stmt(outer_target, inner)]
    });
    assert_eq!(global_number(&mut analyzer, "a"), Some(3.0));
    assert_eq!(global_number(&mut analyzer, "b"), Some(3.0));
}

#[test]
fn test_compound_assignment_folds_on_second_pass() {
    // var n = 1; n += 2;
    let mut analyzer = analyzed(2, |b| {
        let one = b.num(1.0);
        let decl = b.var("n", Some(one));
        let target = b.ident("n");
        let two = b.num(2.0);
        let update = b.assign_op(AssignmentOperator::AddAssign, target, two);
        vec![decl, b.expr_stmt(update)]
    });
    assert_eq!(global_number(&mut analyzer, "n"), Some(3.0));
}

#[test]
fn test_nested_scope_initialized_separately() {
    // function f() { var inner = 1; return inner; }
    let mut analyzer = initialized(|b| {
        let one = b.num(1.0);
        let inner = b.var("inner", Some(one));
        let read = b.ident("inner");
        let ret = b.ret(Some(read));
        vec![b.function_decl("f", &[], vec![inner, ret])]
    });
    let body = first_child(&analyzer, analyzer.global_scope());
    let inner = analyzer.lookup(body, "inner").expect("declared by the scope tree");
    let return_variable = analyzer.scope(body).return_variable;
    assert!(analyzer.variable(inner).chain().is_empty());
    assert!(analyzer.variable(return_variable).chain().is_empty());

    analyzer.initialize(body);
    assert_eq!(analyzer.variable(inner).chain().len(), 1);
    assert_eq!(analyzer.variable(return_variable).chain().len(), 1);
}

#[test]
fn test_call_statement_recorded_as_use() {
    // function f() {} f();
    let analyzer = initialized(|b| {
        let f = b.function_decl("f", &[], Vec::new());
        let callee = b.ident("f");
        vec![f, b.call_stmt(callee, Vec::new())]
    });
    let f = global(&analyzer, "f");
    let chain = analyzer.variable(f).chain();
    assert_eq!(chain.len(), 2);
    assert!(matches!(analyzer.statement(chain[1]).kind, crate::statement::StatementKind::Use { .. }));
}

#[test]
fn test_if_else_branches_exclude_each_other() {
    // var a; if (c) { a = 1; } else { a = 2; }
    let analyzer = initialized(|b| {
        let decl = b.var("a", None);
        let target = b.ident("a");
        let one = b.num(1.0);
        let taken = b.assign_stmt(target, one);
        let target = b.ident("a");
        let two = b.num(2.0);
        let otherwise = b.assign_stmt(target, two);
        let c = b.ident("c");
        vec![decl, b.if_stmt(c, vec![taken], Some(vec![otherwise]))]
    });
    let chain = chain_of(&analyzer, "a");
    let consequent = analyzer.statement(chain[0]).conditional.expect("consequent");
    let alternate = analyzer.statement(chain[1]).conditional.expect("alternate");

    assert_eq!(analyzer.conditional(consequent).guards.len(), 1);
    assert_eq!(analyzer.conditional(consequent).alternate, Some(alternate));
    assert!(analyzer.conditional(alternate).guards.is_empty());
    assert_eq!(analyzer.conditional(alternate).exclusive_of, vec![consequent]);
}

#[test]
fn test_switch_default_excludes_every_case() {
    // var a; switch (k) { case 1: a = 1; break; case 2: a = 2; break; default: a = 3; }
    let analyzer = initialized(|b| {
        let decl = b.var("a", None);
        let mut cases = Vec::new();
        for (test, written) in [(Some(1.0), 1.0), (Some(2.0), 2.0), (None, 3.0)] {
            let target = b.ident("a");
            let written = b.num(written);
            let write = b.assign_stmt(target, written);
            let exit = b.break_stmt();
            let test = test.map(|n| b.num(n));
            cases.push(b.case(test, vec![write, exit]));
        }
        let k = b.ident("k");
        vec![decl, b.switch(k, cases)]
    });
    let chain = chain_of(&analyzer, "a");
    assert_eq!(chain.len(), 3);
    let branches: Vec<ConditionalId> = chain
        .iter()
        .map(|&statement| analyzer.statement(statement).conditional.expect("case branch"))
        .collect();

    for &case in &branches[..2] {
        let guards = &analyzer.conditional(case).guards;
        assert_eq!(guards.len(), 1);
        assert!(analyzer.render(guards[0]).starts_with("k == "));
    }
    let default = analyzer.conditional(branches[2]);
    assert!(default.guards.is_empty());
    assert_eq!(default.exclusive_of, branches[..2].to_vec());
}
