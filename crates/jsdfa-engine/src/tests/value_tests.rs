use super::*;
use crate::fixtures::{analyzed, analyzer, global, global_number, initialized, number};
use jsdfa_ast::BinaryOperator;

fn literal(analyzer: &mut Analyzer, value: f64) -> ValueId {
    let ast = analyzer.alloc_literal(LiteralValue::Number(value), None);
    analyzer.value_from_ast(ast, None)
}

fn key(analyzer: &mut Analyzer, name: &str) -> NodeIndex {
    analyzer.alloc_literal(LiteralValue::String(name.to_string()), None)
}

#[test]
fn test_kind_follows_ast_shape() {
    let mut analyzer = initialized(|b| {
        let one = b.num(1.0);
        let three = b.num(3.0);
        let array = b.array_with_holes(vec![Some(one), None, Some(three)]);
        let object = b.object(vec![("list", array)]);
        let function = b.function_expr(&[], Vec::new());
        let y = b.ident("y");
        let two = b.num(2.0);
        let sum = b.binary(BinaryOperator::Add, y, two);
        let four = b.num(4.0);
        vec![
            b.var("o", Some(object)),
            b.var("f", Some(function)),
            b.var("e", Some(sum)),
            b.var("n", Some(four)),
        ]
    });

    let o = analyzer.value_of("o").expect("o");
    let list = analyzer.get(o, "list").expect("list");
    let ValueKind::Array { elements, .. } = &analyzer.value(list).kind else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 3);
    assert!(elements[1].is_none());
    let third = analyzer.get(list, "2").expect("third element");
    assert_eq!(number(&analyzer, third), Some(3.0));

    let f = analyzer.value_of("f").expect("f");
    assert!(analyzer.value(f).kind.is_function());
    let e = analyzer.value_of("e").expect("e");
    assert!(matches!(analyzer.value(e).kind, ValueKind::Expression));
    let n = analyzer.value_of("n").expect("n");
    assert!(matches!(analyzer.value(n).kind, ValueKind::Literal));
}

#[test]
fn test_expression_values_own_their_tree() {
    let mut init = None;
    let mut analyzer = initialized(|b| {
        let y = b.ident("y");
        let two = b.num(2.0);
        let sum = b.binary(BinaryOperator::Add, y, two);
        init = Some(sum);
        vec![b.var("e", Some(sum))]
    });
    let init = init.expect("initializer");
    let chain = analyzer.variable(global(&analyzer, "e")).chain().to_vec();
    let value = analyzer.statement(chain[0]).value().expect("assigned value");

    assert_ne!(analyzer.value(value).ast, init);
    assert_eq!(analyzer.render_value(value), "y + 2");
}

#[test]
fn test_get_follows_prototype_chain() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let proto = analyzer.new_object(None, None);
    let child = analyzer.new_object(None, None);
    let method = literal(&mut analyzer, 7.0);
    assert!(analyzer.set(proto, "m", method));
    analyzer.set_prototype(child, Some(proto));

    assert_eq!(analyzer.prototype(child), Some(proto));
    assert_eq!(analyzer.get(child, "m"), Some(method));
    assert_eq!(analyzer.get(child, "missing"), None);

    let own = literal(&mut analyzer, 8.0);
    analyzer.set(child, "m", own);
    assert_eq!(analyzer.get(child, "m"), Some(own));
}

#[test]
fn test_cyclic_prototype_chain_terminates() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let a = analyzer.new_object(None, None);
    let b = analyzer.new_object(None, None);
    analyzer.set_prototype(a, Some(b));
    analyzer.set_prototype(b, Some(a));
    assert_eq!(analyzer.get(a, "missing"), None);
}

#[test]
fn test_set_names_and_parents_child() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let object = analyzer.new_object(None, None);
    let child = literal(&mut analyzer, 1.0);
    assert!(analyzer.set(object, "x", child));
    assert_eq!(analyzer.value(child).parent, Some(object));
    assert_eq!(analyzer.value(child).name.as_deref(), Some("x"));

    let scalar = literal(&mut analyzer, 2.0);
    assert!(!analyzer.set(scalar, "x", child));
}

#[test]
fn test_array_index_keys() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let ast = analyzer.alloc_like(NodeData::ArrayExpression { elements: Vec::new() }, None);
    let array = analyzer.value_from_ast(ast, None);
    let element = literal(&mut analyzer, 1.0);
    let property = literal(&mut analyzer, 2.0);

    analyzer.set(array, "3", element);
    analyzer.set(array, "03", property);
    let ValueKind::Array {
        elements,
        properties,
        ..
    } = &analyzer.value(array).kind
    else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 4);
    assert_eq!(elements[3], Some(element));
    assert_eq!(properties.get("03"), Some(&property));
    assert_eq!(analyzer.get(array, "0"), None);
}

#[test]
fn test_access_write_creates_missing_prototype() {
    let mut analyzer = initialized(|b| vec![b.function_decl("F", &[], Vec::new())]);
    let function = analyzer.value_of("F").expect("F");
    let method = literal(&mut analyzer, 1.0);
    let path = [key(&mut analyzer, "prototype"), key(&mut analyzer, "m")];

    assert!(analyzer.access_write(function, &path, method));
    let prototype = analyzer.get(function, "prototype").expect("prototype object");
    assert!(matches!(analyzer.value(prototype).kind, ValueKind::Object { .. }));
    assert_eq!(analyzer.access(function, &path), Some(method));
}

#[test]
fn test_access_write_through_missing_property_fails() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let object = analyzer.new_object(None, None);
    let written = literal(&mut analyzer, 1.0);
    let path = [key(&mut analyzer, "absent"), key(&mut analyzer, "x")];
    assert!(!analyzer.access_write(object, &path, written));
}

#[test]
fn test_access_path_name_joins_parents() {
    let mut analyzer = initialized(|b| {
        let init = b.function_expr(&[], Vec::new());
        let lib = b.object(vec![("init", init)]);
        vec![b.var("lib", Some(lib))]
    });
    let lib = analyzer.value_of("lib").expect("lib");
    let init = analyzer.get(lib, "init").expect("init");
    assert_eq!(analyzer.access_path_name(init).as_deref(), Some("lib.init"));
    assert_eq!(analyzer.access_path_name(lib).as_deref(), Some("lib"));
}

#[test]
fn test_snapshot_deep_copies_function_properties() {
    let mut analyzer = initialized(|b| vec![b.function_decl("F", &[], Vec::new())]);
    let function = analyzer.value_of("F").expect("F");
    let method = literal(&mut analyzer, 1.0);
    let path = [key(&mut analyzer, "prototype"), key(&mut analyzer, "m")];
    analyzer.access_write(function, &path, method);

    let copy = analyzer.snapshot(function);
    assert_ne!(copy, function);
    assert_eq!(analyzer.value(copy).name.as_deref(), Some("F"));
    let original = analyzer.get(function, "prototype").expect("original prototype");
    let copied = analyzer.get(copy, "prototype").expect("copied prototype");
    assert_ne!(original, copied);
    let m = analyzer.get(copied, "m").expect("copied method");
    assert_eq!(number(&analyzer, m), Some(1.0));
}

#[test]
fn test_derived_ast_rebuilds_objects() {
    let mut analyzer = initialized(|b| {
        let one = b.num(1.0);
        let object = b.object(vec![("a", one)]);
        vec![b.var("o", Some(object))]
    });
    let o = analyzer.value_of("o").expect("o");
    let two = literal(&mut analyzer, 2.0);
    analyzer.set(o, "b", two);

    let ast = analyzer.derived_ast(o);
    assert_eq!(analyzer.render(ast), "{ a: 1, b: 2 }");
}

#[test]
fn test_array_index_is_canonical() {
    assert_eq!(array_index("0"), Some(0));
    assert_eq!(array_index("12"), Some(12));
    assert_eq!(array_index("012"), None);
    assert_eq!(array_index("-1"), None);
    assert_eq!(array_index("x"), None);
    assert_eq!(array_index("4294967294"), Some(4_294_967_294));
    assert_eq!(array_index("4294967295"), None);
    assert_eq!(array_index("18446744073709551615"), None);
}

fn empty_array(analyzer: &mut Analyzer) -> ValueId {
    let ast = analyzer.alloc_like(NodeData::ArrayExpression { elements: Vec::new() }, None);
    analyzer.value_from_ast(ast, None)
}

#[test]
fn test_far_array_writes_stay_sparse() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let array = empty_array(&mut analyzer);
    let far = literal(&mut analyzer, 1.0);
    let huge = literal(&mut analyzer, 2.0);
    let near = literal(&mut analyzer, 3.0);

    assert!(analyzer.set(array, "1000000000000", far));
    assert!(analyzer.set(array, "4294967294", huge));
    assert!(analyzer.set(array, "2", near));
    let ValueKind::Array {
        elements,
        properties,
        ..
    } = &analyzer.value(array).kind
    else {
        panic!("expected array");
    };
    assert_eq!(elements.len(), 3);
    assert_eq!(properties.len(), 2);
    assert_eq!(analyzer.get(array, "1000000000000"), Some(far));
    assert_eq!(analyzer.get(array, "4294967294"), Some(huge));
    assert_eq!(analyzer.get(array, "2"), Some(near));
}

#[test]
fn test_huge_index_write_in_program() {
    // var a = []; a[1e12] = 1; var seen = a[1e12];
    let mut analyzer = analyzed(1, |b| {
        let array = b.array(Vec::new());
        let a = b.var("a", Some(array));
        let object = b.ident("a");
        let index = b.num(1e12);
        let target = b.index(object, index);
        let one = b.num(1.0);
        let write = b.assign_stmt(target, one);
        let object = b.ident("a");
        let index = b.num(1e12);
        let read = b.index(object, index);
        vec![a, write, b.var("seen", Some(read))]
    });
    assert_eq!(global_number(&mut analyzer, "seen"), Some(1.0));
}

#[test]
fn test_snapshot_keeps_array_properties() {
    let mut analyzer = analyzer(1, |_| Vec::new());
    let array = empty_array(&mut analyzer);
    let element = literal(&mut analyzer, 1.0);
    let named = literal(&mut analyzer, 2.0);
    analyzer.set(array, "0", element);
    analyzer.set(array, "foo", named);

    let copy = analyzer.snapshot(array);
    let copied = analyzer.get(copy, "foo").expect("named property survives the copy");
    assert_ne!(copied, named);
    assert_eq!(number(&analyzer, copied), Some(2.0));
    let first = analyzer.get(copy, "0").expect("element survives the copy");
    assert_eq!(number(&analyzer, first), Some(1.0));
}

#[test]
fn test_copied_array_keeps_named_property() {
    // var a = []; a.foo = 1; var b = a;
    let mut analyzer = analyzed(2, |b| {
        let array = b.array(Vec::new());
        let a = b.var("a", Some(array));
        let target = b.path("a.foo");
        let one = b.num(1.0);
        let write = b.assign_stmt(target, one);
        let source = b.ident("a");
        vec![a, write, b.var("b", Some(source))]
    });
    let copy = analyzer.value_of("b").expect("b");
    let foo = analyzer.get(copy, "foo").expect("b.foo");
    assert_eq!(number(&analyzer, foo), Some(1.0));
}

#[test]
fn test_derived_ast_reproduces_literal_shapes() {
    // [1, , { a: "s" }] and 7
    let mut analyzer = analyzer(1, |_| Vec::new());
    let one = analyzer.alloc_literal(LiteralValue::Number(1.0), None);
    let text = analyzer.alloc_literal(LiteralValue::String("s".to_string()), None);
    let key = key(&mut analyzer, "a");
    let property = analyzer.alloc_like(
        NodeData::Property {
            key,
            value: text,
            computed: false,
            kind: PropertyKind::Init,
        },
        None,
    );
    let object = analyzer.alloc_like(NodeData::ObjectExpression { properties: vec![property] }, None);
    let array = analyzer.alloc_like(
        NodeData::ArrayExpression {
            elements: vec![Some(one), None, Some(object)],
        },
        None,
    );
    let seven = analyzer.alloc_literal(LiteralValue::Number(7.0), None);

    for ast in [seven, object, array] {
        let value = analyzer.value_from_ast(ast, None);
        let derived = analyzer.derived_ast(value);
        assert!(analyzer.arena().same_shape(ast, derived), "{}", analyzer.render(ast));
    }
}
