use super::*;
use serde_json::json;

fn loc(l1: u32, c1: u32, l2: u32, c2: u32) -> serde_json::Value {
    json!({"start": {"line": l1, "column": c1}, "end": {"line": l2, "column": c2}})
}

#[test]
fn test_ingest_variable_declaration() {
    let program = json!({
        "type": "Program",
        "loc": loc(1, 0, 1, 10),
        "body": [{
            "type": "VariableDeclaration",
            "kind": "var",
            "loc": loc(1, 0, 1, 10),
            "declarations": [{
                "type": "VariableDeclarator",
                "loc": loc(1, 4, 1, 9),
                "id": {"type": "Identifier", "name": "a", "loc": loc(1, 4, 1, 5)},
                "init": {"type": "Literal", "value": 1, "raw": "1", "loc": loc(1, 8, 1, 9)}
            }]
        }]
    });

    let (arena, root) = from_estree(&program).expect("valid program");
    let NodeData::Program { body } = &arena.node(root).data else {
        panic!("expected program");
    };
    assert_eq!(body.len(), 1);
    let NodeData::VariableDeclaration { declarations, .. } = &arena.node(body[0]).data else {
        panic!("expected declaration");
    };
    let NodeData::VariableDeclarator { id, init } = &arena.node(declarations[0]).data else {
        panic!("expected declarator");
    };
    assert_eq!(arena.identifier_name(*id), Some("a"));
    let init = init.expect("initializer");
    assert_eq!(arena.node(init).literal(), Some(&LiteralValue::Number(1.0)));
    assert_eq!(arena.start(init), Some(Position::new(1, 8)));
}

#[test]
fn test_arrow_expression_body_becomes_return() {
    let arrow = json!({
        "type": "ArrowFunctionExpression",
        "params": [{"type": "Identifier", "name": "x"}],
        "expression": true,
        "body": {"type": "Identifier", "name": "x", "loc": loc(1, 6, 1, 7)}
    });
    let (arena, root) = from_estree(&arrow).expect("valid arrow");
    let function = arena.node(root).function().expect("function");
    let NodeData::BlockStatement { body } = &arena.node(function.body).data else {
        panic!("expected block body");
    };
    assert_eq!(arena.kind(body[0]), Some(crate::node::SyntaxKind::ReturnStatement));
}

#[test]
fn test_unknown_kinds_keep_children() {
    let node = json!({
        "type": "TemplateLiteral",
        "quasis": [{"type": "TemplateElement", "value": {"raw": "a"}}],
        "expressions": [{"type": "Identifier", "name": "b"}]
    });
    let (arena, root) = from_estree(&node).expect("valid node");
    let NodeData::Other { kind, children } = &arena.node(root).data else {
        panic!("expected opaque node");
    };
    assert_eq!(kind, "TemplateLiteral");
    assert_eq!(children.len(), 2);
}

#[test]
fn test_regex_literal() {
    let node = json!({"type": "Literal", "regex": {"pattern": "a+", "flags": "g"}, "value": {}});
    let (arena, root) = from_estree(&node).expect("valid literal");
    assert_eq!(
        arena.node(root).literal(),
        Some(&LiteralValue::RegExp {
            pattern: "a+".to_string(),
            flags: "g".to_string()
        })
    );
}

#[test]
fn test_malformed_input_is_reported() {
    let missing = json!({"type": "ExpressionStatement"});
    assert_eq!(
        from_estree(&missing).unwrap_err(),
        EstreeError::MissingField {
            node_type: "ExpressionStatement".to_string(),
            field: "expression"
        }
    );

    let bad_operator = json!({
        "type": "BinaryExpression",
        "operator": "<=>",
        "left": {"type": "Identifier", "name": "a"},
        "right": {"type": "Identifier", "name": "b"}
    });
    assert!(matches!(
        from_estree(&bad_operator),
        Err(EstreeError::UnknownOperator { .. })
    ));

    let not_a_node = json!([1, 2]);
    let err = from_estree(&not_a_node).unwrap_err();
    assert_eq!(err.to_string(), "expected an ESTree node, found an array");
}
