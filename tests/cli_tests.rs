//! CLI regression tests, driven through the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn exprgate() -> Command {
    Command::cargo_bin("exprgate").expect("binary should build")
}

#[test]
fn check_admits_a_plain_expression() {
    exprgate()
        .args(["check", "1 + 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn check_rejects_a_lambda_with_exit_code_one() {
    exprgate()
        .args(["check", "lambda x: x"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not allowed"));
}

#[test]
fn check_reports_json_verdicts() {
    exprgate()
        .args(["check", "--json", "x = 1"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"ok\":false"))
        .stdout(predicate::str::contains("not_an_expression"));

    exprgate()
        .args(["check", "--json", "x == 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ok\":true"));
}

#[test]
fn check_reads_from_a_file() {
    let dir = std::env::temp_dir();
    let path = dir.join("exprgate_cli_test_input.txt");
    std::fs::write(&path, "stats['errors'] == 0").unwrap();

    exprgate()
        .args(["check", "--file"])
        .arg(&path)
        .assert()
        .success();

    std::fs::remove_file(&path).ok();
}

#[test]
fn check_without_input_is_a_usage_error() {
    exprgate().arg("check").assert().failure().code(2);
}

#[test]
fn check_honors_a_custom_depth_limit() {
    exprgate()
        .args(["check", "--max-depth", "2", "(((1)))"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nesting"));
}

#[test]
fn ast_dumps_the_syntax_tree_as_json() {
    exprgate()
        .args(["ast", "1 + 2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BinOp"))
        .stdout(predicate::str::contains("Add"));
}

#[test]
fn ast_reports_syntax_errors() {
    exprgate().args(["ast", "1 +"]).assert().failure().code(1);
}
