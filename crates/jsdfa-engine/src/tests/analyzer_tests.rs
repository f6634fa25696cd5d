use super::*;
use crate::fixtures::{analyzed, analyzer, global_number};
use crate::function::BuiltinCall;
use crate::reduce::ReduceContext;
use jsdfa_ast::BinaryOperator;
use std::cell::Cell;

#[test]
fn test_new_seeds_window_as_global_this() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let global = analyzer.global_scope();
    let window = analyzer.window();

    assert_eq!(analyzer.lookup(global, "window"), Some(window));
    assert_eq!(analyzer.lookup(global, "this"), Some(window));
    let value = analyzer.value_of("window").expect("window value");
    assert!(matches!(analyzer.value(value).kind, ValueKind::Object { .. }));
}

#[test]
fn test_constant_expression_folds_in_one_pass() {
    let mut analyzer = analyzed(1, |b| {
        let two = b.num(2.0);
        let three = b.num(3.0);
        let sum = b.binary(BinaryOperator::Add, two, three);
        vec![b.var("x", Some(sum))]
    });
    assert_eq!(global_number(&mut analyzer, "x"), Some(5.0));
    assert!(analyzer.log().entries().is_empty());
}

#[test]
fn test_value_of_undeclared_name() {
    let mut analyzer = analyzed(1, |b| {
        let one = b.num(1.0);
        vec![b.var("a", Some(one))]
    });
    assert_eq!(analyzer.value_of("missing"), None);
}

#[test]
fn test_registered_rule_rewrites_nodes() {
    let mut analyzer = analyzer(1, |b| {
        let magic = b.ident("magic");
        vec![b.var("x", Some(magic))]
    });
    let rule: ReduceRule = Rc::new(|analyzer: &mut Analyzer, _context: &ReduceContext, node: NodeIndex| {
        let is_magic = analyzer.arena().identifier_name(node) == Some("magic");
        is_magic.then(|| analyzer.alloc_literal(LiteralValue::Number(42.0), Some(node)))
    });
    let id = analyzer.register_reduce_rule(SyntaxKind::Identifier, rule);
    analyzer.analyze();

    assert_eq!(global_number(&mut analyzer, "x"), Some(42.0));
    assert!(analyzer.remove_reduce_rule(SyntaxKind::Identifier, Some(id)));
    assert!(!analyzer.remove_reduce_rule(SyntaxKind::Identifier, Some(id)));
}

#[test]
fn test_last_matching_rule_wins() {
    let mut analyzer = analyzer(1, |b| {
        let magic = b.ident("magic");
        vec![b.var("x", Some(magic))]
    });
    for replacement in [1.0, 2.0] {
        analyzer.register_reduce_rule(
            SyntaxKind::Identifier,
            Rc::new(move |analyzer: &mut Analyzer, _context: &ReduceContext, node: NodeIndex| {
                Some(analyzer.alloc_literal(LiteralValue::Number(replacement), Some(node)))
            }),
        );
    }
    analyzer.analyze();
    assert_eq!(global_number(&mut analyzer, "x"), Some(2.0));
}

#[test]
fn test_builtin_hook_runs_for_matching_path() {
    let mut analyzer = analyzer(1, |b| {
        let one = b.num(1.0);
        let ret = b.ret(Some(one));
        let init = b.function_expr(&[], vec![ret]);
        let lib = b.object(vec![("init", init)]);
        let decl = b.var("lib", Some(lib));
        let callee = b.path("lib.init");
        let call = b.call_stmt(callee, Vec::new());
        vec![decl, call]
    });
    let hits = Rc::new(Cell::new(0usize));
    let seen = Rc::clone(&hits);
    analyzer.register_builtin(
        "lib.init",
        Rc::new(move |analyzer: &mut Analyzer, call: &BuiltinCall| {
            assert_eq!(analyzer.scope(call.scope).parent, Some(call.caller));
            seen.set(seen.get() + 1);
        }),
    );
    analyzer.analyze();

    assert_eq!(hits.get(), 1);
    assert!(analyzer.remove_builtin("lib.init"));
    assert!(!analyzer.remove_builtin("lib.init"));
}

#[test]
fn test_reference_chain_is_followed_and_loops_reported() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let start = analyzer.alloc_literal(LiteralValue::Number(0.0), None);
    let first_ast = analyzer.alloc_literal(LiteralValue::Number(1.0), None);
    let second_ast = analyzer.alloc_literal(LiteralValue::Number(2.0), None);
    let first = analyzer.value_from_ast(first_ast, None);
    let second = analyzer.value_from_ast(second_ast, None);

    analyzer.references.insert(start, first);
    analyzer.references.insert(first_ast, second);
    assert_eq!(analyzer.get_reference(start), Some(second));
    assert_eq!(analyzer.log().count(DiagnosticKind::CircularReference), 0);

    analyzer.references.insert(second_ast, first);
    assert_eq!(analyzer.get_reference(start), Some(first));
    assert_eq!(analyzer.log().count(DiagnosticKind::CircularReference), 1);
}

#[test]
fn test_disabled_log_records_nothing() {
    let mut b = jsdfa_ast::AstBuilder::new();
    let target = b.ident("undeclared");
    let one = b.num(1.0);
    let write = b.assign_stmt(target, one);
    let f = b.function_decl("f", &[], vec![write]);
    let callee = b.ident("f");
    let call = b.call_stmt(callee, Vec::new());
    let program = b.program(vec![f, call]);
    let (arena, root) = b.finish(program);

    let mut analyzer = Analyzer::new(
        arena,
        root,
        AnalyzerOptions {
            order: 1,
            enable_log: false,
        },
    );
    analyzer.analyze();
    assert!(analyzer.log().entries().is_empty());
    assert!(analyzer.lookup(analyzer.global_scope(), "undeclared").is_some());
}

#[test]
fn test_missing_declaration_reported_when_enabled() {
    let analyzer = analyzed(1, |b| {
        let target = b.ident("undeclared");
        let one = b.num(1.0);
        let write = b.assign_stmt(target, one);
        let f = b.function_decl("f", &[], vec![write]);
        let callee = b.ident("f");
        let call = b.call_stmt(callee, Vec::new());
        vec![f, call]
    });
    assert_eq!(analyzer.log().count(DiagnosticKind::MissingDeclaration), 1);
}
