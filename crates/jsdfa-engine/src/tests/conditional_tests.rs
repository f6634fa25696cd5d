use super::*;
use crate::fixtures::{analyzed, chain_of, global_number, initialized};
use jsdfa_ast::{AstBuilder, BinaryOperator, LiteralValue, NodeData};

/// `var a = 0; if (test) { a = 1; } else { a = 2; }`
fn if_else(b: &mut AstBuilder, test: NodeIndex, alternate: bool) -> Vec<NodeIndex> {
    let zero = b.num(0.0);
    let decl = b.var("a", Some(zero));
    let target = b.ident("a");
    let one = b.num(1.0);
    let taken = b.assign_stmt(target, one);
    let otherwise = alternate.then(|| {
        let target = b.ident("a");
        let two = b.num(2.0);
        b.assign_stmt(target, two)
    });
    let branch = b.if_stmt(test, vec![taken], otherwise.map(|write| vec![write]));
    vec![decl, branch]
}

fn branch_of(analyzer: &Analyzer, name: &str, entry: usize) -> ConditionalId {
    let chain = chain_of(analyzer, name);
    analyzer.statement(chain[entry]).conditional.expect("write inside a branch")
}

#[test]
fn test_true_guard_takes_consequent() {
    let mut analyzer = analyzed(1, |b| {
        let test = b.boolean(true);
        if_else(b, test, true)
    });
    assert_eq!(global_number(&mut analyzer, "a"), Some(1.0));
}

#[test]
fn test_false_guard_pins_alternate() {
    let mut analyzer = analyzed(1, |b| {
        let test = b.boolean(false);
        if_else(b, test, true)
    });
    assert_eq!(global_number(&mut analyzer, "a"), Some(2.0));
    let alternate = branch_of(&analyzer, "a", 2);
    assert!(analyzer.conditional(alternate).pinned);
    let consequent = branch_of(&analyzer, "a", 1);
    assert_eq!(analyzer.conditional(consequent).alternate, Some(alternate));
}

#[test]
fn test_guard_folded_from_comparison() {
    let mut analyzer = analyzed(1, |b| {
        let one = b.num(1.0);
        let two = b.num(2.0);
        let test = b.binary(BinaryOperator::Lt, one, two);
        if_else(b, test, true)
    });
    assert_eq!(global_number(&mut analyzer, "a"), Some(1.0));
}

#[test]
fn test_unknown_guard_is_assumed_to_hold() {
    let mut analyzer = analyzed(1, |b| {
        let test = b.ident("unknown");
        if_else(b, test, false)
    });
    assert_eq!(global_number(&mut analyzer, "a"), Some(1.0));
}

#[test]
fn test_enclosing_branch_must_hold() {
    // var a = 0; if (true) { if (false) { a = 1; } }
    let mut analyzer = analyzed(1, |b| {
        let zero = b.num(0.0);
        let decl = b.var("a", Some(zero));
        let target = b.ident("a");
        let one = b.num(1.0);
        let write = b.assign_stmt(target, one);
        let inner_test = b.boolean(false);
        let inner = b.if_stmt(inner_test, vec![write], None);
        let outer_test = b.boolean(true);
        let outer = b.if_stmt(outer_test, vec![inner], None);
        vec![decl, outer]
    });
    assert_eq!(global_number(&mut analyzer, "a"), Some(0.0));
}

/// `var a; if (x) { if (y) { a = 1; } } else { a = 2; }`, initialized only.
fn nested_branches() -> Analyzer {
    initialized(|b| {
        let decl = b.var("a", None);
        let target = b.ident("a");
        let one = b.num(1.0);
        let write = b.assign_stmt(target, one);
        let y = b.ident("y");
        let inner = b.if_stmt(y, vec![write], None);
        let target = b.ident("a");
        let two = b.num(2.0);
        let otherwise = b.assign_stmt(target, two);
        let x = b.ident("x");
        let outer = b.if_stmt(x, vec![inner], Some(vec![otherwise]));
        vec![decl, outer]
    })
}

#[test]
fn test_flatten_joins_enclosing_guards() {
    let analyzer = nested_branches();
    let inner = branch_of(&analyzer, "a", 0);
    assert_eq!(analyzer.flatten_conditional(inner), "y && x");
    let alternate = branch_of(&analyzer, "a", 1);
    assert_eq!(analyzer.flatten_conditional(alternate), "!(x)");
}

#[test]
fn test_flatten_disjunctive_guards() {
    let mut analyzer = nested_branches();
    let inner = branch_of(&analyzer, "a", 0);
    let z = analyzer.alloc_like(
        NodeData::Identifier {
            name: "z".to_string(),
        },
        None,
    );
    analyzer.or_guard(inner, z);
    assert_eq!(analyzer.flatten_conditional(inner), "(y || z) && x");
}

#[test]
fn test_in_branch_finds_deepest_branch() {
    let analyzer = nested_branches();
    let inner = branch_of(&analyzer, "a", 0);
    let outer = analyzer.conditional(inner).parent.expect("enclosing branch");
    let write = chain_of(&analyzer, "a")[0];
    let loc = analyzer.statement(write).loc;

    assert_eq!(analyzer.in_branch(outer, loc), Some(inner));
    assert_eq!(analyzer.in_branch(outer, Loc::HOISTED), None);
    assert_eq!(analyzer.in_branch(inner, Loc::UNORDERED), None);
}

/// `var k = <k>; var r; switch (k) { case 1: r = "one"; break;
/// case 2: r = "two"; break; default: r = "other"; }`
fn switch_on(k: f64) -> Analyzer {
    analyzed(1, |b| {
        let value = b.num(k);
        let decl = b.vars(vec![("k", Some(value)), ("r", None)]);
        let mut cases = Vec::new();
        for (test, text) in [(Some(1.0), "one"), (Some(2.0), "two"), (None, "other")] {
            let target = b.ident("r");
            let written = b.string(text);
            let write = b.assign_stmt(target, written);
            let exit = b.break_stmt();
            let test = test.map(|n| b.num(n));
            cases.push(b.case(test, vec![write, exit]));
        }
        let discriminant = b.ident("k");
        let switch = b.switch(discriminant, cases);
        vec![decl, switch]
    })
}

fn string_of(analyzer: &mut Analyzer, name: &str) -> Option<String> {
    let value = analyzer.value_of(name)?;
    analyzer.literal(value).and_then(LiteralValue::as_str).map(str::to_string)
}

#[test]
fn test_switch_selects_matching_case() {
    let mut analyzer = switch_on(2.0);
    assert_eq!(string_of(&mut analyzer, "r").as_deref(), Some("two"));
}

#[test]
fn test_switch_default_when_no_case_matches() {
    let mut analyzer = switch_on(3.0);
    assert_eq!(string_of(&mut analyzer, "r").as_deref(), Some("other"));
}
