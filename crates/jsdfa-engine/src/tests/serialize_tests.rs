use super::*;
use crate::fixtures::analyzed;

/// `var a = 1; var o = { x: 2 }; o.y = 3;`
fn declarations() -> Analyzer {
    analyzed(1, |b| {
        let one = b.num(1.0);
        let a = b.var("a", Some(one));
        let two = b.num(2.0);
        let object = b.object(vec![("x", two)]);
        let o = b.var("o", Some(object));
        let target = b.path("o.y");
        let three = b.num(3.0);
        vec![a, o, b.assign_stmt(target, three)]
    })
}

#[test]
fn test_snapshot_lists_global_definitions() {
    let mut analyzer = declarations();
    let snapshot = analyzer.snapshot_scopes();
    for name in ["a", "o", "window"] {
        assert!(snapshot.definitions.contains_key(name), "missing `{name}`");
    }
    assert!(snapshot.returns.is_empty());
    assert!(snapshot.children.is_empty());

    let a = &snapshot.definitions["a"];
    assert_eq!(a.len(), 1);
    let EntrySnapshot::Assign {
        value,
        access_path,
        conditional,
        ..
    } = &a[0]
    else {
        panic!("expected a write");
    };
    assert_eq!(value, &RenderedValue::Code("1".to_string()));
    assert_eq!(access_path, &None);
    assert_eq!(conditional, &None);
}

#[test]
fn test_objects_are_expanded() {
    let mut analyzer = declarations();
    let snapshot = analyzer.snapshot_scopes();
    let o = &snapshot.definitions["o"];
    assert_eq!(o.len(), 2);

    let EntrySnapshot::Assign { value, .. } = &o[0] else {
        panic!("expected a write");
    };
    assert_eq!(value.get("x").and_then(RenderedValue::as_code), Some("2"));

    let EntrySnapshot::Assign { value, access_path, .. } = &o[1] else {
        panic!("expected a member write");
    };
    assert_eq!(access_path.as_deref(), Some("y"));
    assert_eq!(value.as_code(), Some("3"));
}

#[test]
fn test_function_scope_lists_returns() {
    // function f() { return 1; } f();
    let mut analyzer = analyzed(1, |b| {
        let one = b.num(1.0);
        let ret = b.ret(Some(one));
        let f = b.function_decl("f", &[], vec![ret]);
        let callee = b.ident("f");
        vec![f, b.call_stmt(callee, Vec::new())]
    });
    let snapshot = analyzer.snapshot_scopes();
    assert_eq!(snapshot.children.len(), 1);
    let body = &snapshot.children[0];
    assert_eq!(body.returns.len(), 1);
    let EntrySnapshot::Assign { value, .. } = &body.returns[0] else {
        panic!("expected a return write");
    };
    assert_eq!(value.as_code(), Some("1"));
}

#[test]
fn test_use_inside_branch_records_condition() {
    // var g = function () {}; if (c) { g(); }
    let mut analyzer = analyzed(1, |b| {
        let function = b.function_expr(&[], Vec::new());
        let g = b.var("g", Some(function));
        let callee = b.ident("g");
        let call = b.call_stmt(callee, Vec::new());
        let c = b.ident("c");
        vec![g, b.if_stmt(c, vec![call], None)]
    });
    let snapshot = analyzer.snapshot_scopes();
    let uses: Vec<&EntrySnapshot> = snapshot.definitions["g"]
        .iter()
        .filter(|entry| matches!(entry, EntrySnapshot::Use { .. }))
        .collect();
    assert_eq!(uses.len(), 1);
    let EntrySnapshot::Use { conditional, .. } = uses[0] else {
        unreachable!();
    };
    assert_eq!(conditional.as_deref(), Some("c"));
}

#[test]
fn test_json_shape() {
    let mut analyzer = declarations();
    let json = analyzer.snapshot_json().expect("snapshot serializes");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    let a = &parsed["definitions"]["a"][0];
    assert_eq!(a["kind"], "assign");
    assert_eq!(a["value"], "1");
    assert!(a["loc"].is_i64());
    assert!(a.get("accessPath").is_none());
    assert!(parsed.get("return").is_none());

    let member = &parsed["definitions"]["o"][1];
    assert_eq!(member["accessPath"], "y");
    assert_eq!(parsed["definitions"]["o"][0]["value"]["x"], "2");
}
