use super::*;
use crate::fixtures::{chain_of, global_source, initialized};
use jsdfa_ast::{AstBuilder, BinaryOperator, NodeIndex};
use std::cell::Cell;
use std::rc::Rc;

/// `var a = 2 + 2; var b = 3 + 3;`
fn two_sums(b: &mut AstBuilder) -> Vec<NodeIndex> {
    let two = b.num(2.0);
    let other = b.num(2.0);
    let four = b.binary(BinaryOperator::Add, two, other);
    let three = b.num(3.0);
    let other = b.num(3.0);
    let six = b.binary(BinaryOperator::Add, three, other);
    vec![b.var("a", Some(four)), b.var("b", Some(six))]
}

fn counting_filter(visits: &Rc<Cell<usize>>, keep: bool) -> Derivation {
    let visits = Rc::clone(visits);
    Derivation::with_order(3).with_filter(Rc::new(move |_: &mut Analyzer, _: StatementId| {
        visits.set(visits.get() + 1);
        keep
    }))
}

#[test]
fn test_order_bounds_the_passes() {
    let mut analyzer = initialized(two_sums);
    let global = analyzer.global_scope();
    let statements = analyzer.worklist(global).len();

    let visits = Rc::new(Cell::new(0));
    analyzer.derivation(global, None, &counting_filter(&visits, true));
    assert_eq!(visits.get(), statements * 3);
}

#[test]
fn test_rejected_statements_leave_the_worklist() {
    let mut analyzer = initialized(two_sums);
    let global = analyzer.global_scope();
    let statements = analyzer.worklist(global).len();

    let visits = Rc::new(Cell::new(0));
    analyzer.derivation(global, None, &counting_filter(&visits, false));
    assert_eq!(visits.get(), statements);
}

#[test]
fn test_explicit_worklist_touches_only_listed_statements() {
    let mut analyzer = initialized(two_sums);
    let global = analyzer.global_scope();
    let only_b = chain_of(&analyzer, "b");

    analyzer.derivation(global, Some(only_b), &Derivation::with_order(1));
    assert_eq!(global_source(&mut analyzer, "a"), "2 + 2");
    assert_eq!(global_source(&mut analyzer, "b"), "6");
}

#[test]
fn test_empty_worklist_is_a_no_op() {
    let mut analyzer = initialized(two_sums);
    let global = analyzer.global_scope();
    analyzer.derivation(global, Some(Vec::new()), &Derivation::with_order(4));
    assert_eq!(global_source(&mut analyzer, "a"), "2 + 2");
}

#[test]
fn test_active_derivation_restored_afterwards() {
    let mut analyzer = initialized(two_sums);
    let global = analyzer.global_scope();
    let visits = Rc::new(Cell::new(0));
    analyzer.derivation(global, None, &counting_filter(&visits, true));

    assert_eq!(analyzer.active.order, analyzer.options().order);
    assert!(analyzer.active.filter.is_none());
}
