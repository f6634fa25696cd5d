use super::*;
use crate::fixtures::{analyzed, analyzer, chain_of, first_child, global_number, initialized};
use jsdfa_ast::LiteralValue;

#[test]
fn test_scope_per_function_body() {
    let analyzer = analyzer(1, |b| {
        let one = b.num(1.0);
        let inner = b.var("a", Some(one));
        let f = b.function_decl("f", &[], vec![inner]);
        let expr = b.function_expr(&[], Vec::new());
        let g = b.var("g", Some(expr));
        vec![f, g]
    });
    let global = analyzer.global_scope();
    assert_eq!(analyzer.scope(global).children.len(), 2);

    let body = first_child(&analyzer, global);
    assert_eq!(analyzer.scope(body).parent, Some(global));
    assert!(analyzer.lookup(global, "f").is_some());
    assert!(analyzer.lookup(global, "g").is_some());
    assert!(analyzer.lookup(global, "a").is_none());
    assert!(analyzer.lookup(body, "a").is_some());
    assert_eq!(analyzer.find_defined_scope(body, "g"), Some(global));
    assert_eq!(analyzer.find_defined_scope(body, "nowhere"), None);
    assert!(analyzer.in_scope(body, global));
    assert!(!analyzer.in_scope(global, body));
}

#[test]
fn test_define_returns_existing_variable() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let global = analyzer.global_scope();
    let first = analyzer.define(global, "x");
    let second = analyzer.define(global, "x");
    assert_eq!(first, second);
    assert_eq!(analyzer.scope(global).definitions().filter(|(name, _)| *name == "x").count(), 1);
}

#[test]
fn test_member_property_becomes_string_key() {
    let mut member = None;
    let analyzer = analyzer(1, |b| {
        let target = b.path("a.b");
        member = Some(target);
        let one = b.num(1.0);
        vec![b.assign_stmt(target, one)]
    });
    let member = member.expect("member node");
    let NodeData::MemberExpression {
        property, computed, ..
    } = analyzer.arena().node(member).data
    else {
        panic!("expected member expression");
    };
    assert!(computed);
    assert_eq!(
        analyzer.arena().node(property).literal(),
        Some(&LiteralValue::String("b".to_string()))
    );
}

#[test]
fn test_undeclared_global_assignment_declares() {
    let mut analyzer = analyzed(1, |b| {
        let target = b.ident("x");
        let five = b.num(5.0);
        vec![b.assign_stmt(target, five)]
    });
    assert_eq!(global_number(&mut analyzer, "x"), Some(5.0));
    assert_eq!(analyzer.log().count(DiagnosticKind::MissingDeclaration), 0);
}

#[test]
fn test_unresolvable_target_is_queued() {
    let analyzer = analyzed(1, |b| {
        let callee = b.ident("make");
        let call = b.call(callee, Vec::new());
        let target = b.member(call, "x");
        let one = b.num(1.0);
        vec![b.assign_stmt(target, one)]
    });
    let global = analyzer.global_scope();
    assert_eq!(analyzer.scope(global).pending().len(), 1);
    assert!(analyzer.log().count(DiagnosticKind::UnresolvableAssignmentTarget) >= 1);
}

#[test]
fn test_chained_unresolvable_targets_are_both_queued() {
    // make().x = make().y = 1;
    let analyzer = analyzed(2, |b| {
        let callee = b.ident("make");
        let call = b.call(callee, Vec::new());
        let outer = b.member(call, "x");
        let callee = b.ident("make");
        let call = b.call(callee, Vec::new());
        let inner = b.member(call, "y");
        let one = b.num(1.0);
        let chained = b.assign(inner, one);
        let write = b.assign(outer, chained);
        vec![b.expr_stmt(write)]
    });
    let global = analyzer.global_scope();
    let pending = analyzer.scope(global).pending();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].loc, pending[1].loc);
    assert_ne!(pending[0].target, pending[1].target);
}

#[test]
fn test_call_on_variable_is_hosted_by_it() {
    let analyzer = initialized(|b| {
        let object = b.object(Vec::new());
        let decl = b.var("o", Some(object));
        let callee = b.path("o.run");
        let call = b.call_stmt(callee, Vec::new());
        vec![decl, call]
    });
    let chain = chain_of(&analyzer, "o");
    assert_eq!(chain.len(), 2);
    assert!(analyzer.statement(chain[0]).is_assign());
    assert!(matches!(analyzer.statement(chain[1]).kind, StatementKind::Use { .. }));
    assert!(analyzer.statement(chain[0]).loc < analyzer.statement(chain[1]).loc);
}

#[test]
fn test_call_without_host_is_anonymous() {
    let analyzer = initialized(|b| {
        let callee = b.function_expr(&[], Vec::new());
        vec![b.call_stmt(callee, Vec::new())]
    });
    let global = analyzer.global_scope();
    assert_eq!(analyzer.scope(global).anonymous().len(), 1);
}

#[test]
fn test_worklist_covers_every_chain() {
    let analyzer = initialized(|b| {
        let one = b.num(1.0);
        let decl = b.var("a", Some(one));
        let target = b.ident("a");
        let two = b.num(2.0);
        let write = b.assign_stmt(target, two);
        vec![decl, write]
    });
    let global = analyzer.global_scope();
    let worklist = analyzer.worklist(global);
    // window, plus the two writes to `a`
    assert_eq!(worklist.len(), 3);
    let window = analyzer.window();
    assert!(worklist.contains(&analyzer.variable(window).chain()[0]));
}

#[test]
fn test_outer_variable_read_at_call_site() {
    let mut analyzer = analyzed(1, |b| {
        let one = b.num(1.0);
        let decl = b.var("a", Some(one));
        let read = b.ident("a");
        let ret = b.ret(Some(read));
        let f = b.function_decl("f", &[], vec![ret]);
        let callee = b.ident("f");
        let first = b.call(callee, Vec::new());
        let r1 = b.var("r1", Some(first));
        let target = b.ident("a");
        let two = b.num(2.0);
        let write = b.assign_stmt(target, two);
        let callee = b.ident("f");
        let second = b.call(callee, Vec::new());
        let r2 = b.var("r2", Some(second));
        vec![decl, f, r1, write, r2]
    });
    assert_eq!(global_number(&mut analyzer, "r1"), Some(1.0));
    assert_eq!(global_number(&mut analyzer, "r2"), Some(2.0));
}

#[test]
fn test_clear_scope_resets_call_state() {
    let mut analyzer = analyzed(1, |b| {
        let x = b.ident("x");
        let ret = b.ret(Some(x));
        let f = b.function_decl("f", &["x"], vec![ret]);
        let callee = b.ident("f");
        let one = b.num(1.0);
        let call = b.call(callee, vec![one]);
        vec![f, b.var("r", Some(call))]
    });
    let body = first_child(&analyzer, analyzer.global_scope());
    let return_variable = analyzer.scope(body).return_variable;
    assert_eq!(analyzer.variable(return_variable).chain().len(), 1);
    assert_eq!(analyzer.scope(body).closure().count(), 2);

    analyzer.clear_scope(body);
    assert!(analyzer.variable(return_variable).chain().is_empty());
    assert_eq!(analyzer.scope(body).closure().count(), 0);
    assert_eq!(analyzer.scope(body).caller(), None);
}
