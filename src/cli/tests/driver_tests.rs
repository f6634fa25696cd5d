use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::args::CliArgs;
use super::driver::run;

fn loc(l1: u32, c1: u32, l2: u32, c2: u32) -> serde_json::Value {
    json!({"start": {"line": l1, "column": c1}, "end": {"line": l2, "column": c2}})
}

/// `var a = 1;` on line 1, `x.y = 2;` on line 2 (`x` is undeclared).
fn program() -> serde_json::Value {
    json!({
        "type": "Program",
        "loc": loc(1, 0, 2, 8),
        "body": [
            {
                "type": "VariableDeclaration",
                "kind": "var",
                "loc": loc(1, 0, 1, 10),
                "declarations": [{
                    "type": "VariableDeclarator",
                    "loc": loc(1, 4, 1, 9),
                    "id": {"type": "Identifier", "name": "a", "loc": loc(1, 4, 1, 5)},
                    "init": {"type": "Literal", "value": 1, "raw": "1", "loc": loc(1, 8, 1, 9)}
                }]
            },
            {
                "type": "ExpressionStatement",
                "loc": loc(2, 0, 2, 8),
                "expression": {
                    "type": "AssignmentExpression",
                    "operator": "=",
                    "loc": loc(2, 0, 2, 7),
                    "left": {
                        "type": "MemberExpression",
                        "computed": false,
                        "loc": loc(2, 0, 2, 3),
                        "object": {"type": "Identifier", "name": "x", "loc": loc(2, 0, 2, 1)},
                        "property": {"type": "Identifier", "name": "y", "loc": loc(2, 2, 2, 3)}
                    },
                    "right": {"type": "Literal", "value": 2, "raw": "2", "loc": loc(2, 6, 2, 7)}
                }
            }
        ]
    })
}

fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write input");
    path
}

fn args(input: &Path) -> CliArgs {
    CliArgs {
        input: input.to_path_buf(),
        order: 1,
        no_log: false,
        log_file: None,
        compact: false,
    }
}

#[test]
fn prints_scope_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "program.json", &program().to_string());

    let output = run(&args(&input)).expect("analysis succeeds");
    let snapshot: serde_json::Value = serde_json::from_str(&output).expect("snapshot is JSON");
    assert_eq!(snapshot["definitions"]["a"][0]["kind"], "assign");
    assert_eq!(snapshot["definitions"]["a"][0]["value"], "1");
    assert!(output.contains('\n'));
}

#[test]
fn compact_output_is_one_line() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "program.json", &program().to_string());
    let mut args = args(&input);
    args.compact = true;

    let output = run(&args).expect("analysis succeeds");
    assert!(!output.contains('\n'));
}

#[test]
fn diagnostics_flushed_to_log_file() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "program.json", &program().to_string());
    let log_file = dir.path().join("diagnostics.log");
    let mut args = args(&input);
    args.log_file = Some(log_file.clone());

    run(&args).expect("analysis succeeds");
    let log = std::fs::read_to_string(&log_file).expect("log file written");
    assert!(!log.is_empty());
}

#[test]
fn disabled_log_writes_empty_file() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "program.json", &program().to_string());
    let log_file = dir.path().join("diagnostics.log");
    let mut args = args(&input);
    args.no_log = true;
    args.log_file = Some(log_file.clone());

    run(&args).expect("analysis succeeds");
    let log = std::fs::read_to_string(&log_file).expect("log file written");
    assert!(log.is_empty());
}

#[test]
fn missing_input_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let error = run(&args(&dir.path().join("absent.json"))).expect_err("missing file");
    assert!(error.to_string().contains("failed to read"));
}

#[test]
fn malformed_estree_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let input = write_input(&dir, "bad.json", r#"{"body": []}"#);
    let error = run(&args(&input)).expect_err("not an ESTree node");
    assert!(error.to_string().contains("is not an ESTree program"));
}
