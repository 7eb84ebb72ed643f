//! Error Recovery Integration Tests
//!
//! Tests that every stage reports malformed input as diagnostics, keeps
//! going where it can, and gates the later stages.

use core_types::{Severity, Stage};
use integration_tests::{compile, messages};

fn infos_starting_with(output: &compiler::CompileOutput, prefix: &str) -> usize {
    messages(output, Severity::Info)
        .iter()
        .filter(|m| m.starts_with(prefix))
        .count()
}

/// Test: Panic mode discards up to the next statement starter
#[test]
fn test_panic_mode_discards_until_recovery() {
    let output = compile("{ + 1 ) x = 1 }$");
    assert_eq!(output.diagnostics.count(Stage::Parser, Severity::Error), 1);
    assert_eq!(infos_starting_with(&output, "panic mode discarded"), 3);
    assert!(output.tree.is_none());
    assert!(output.semantic.is_none());
    assert_eq!(
        infos_starting_with(&output, "semantic analysis skipped due to previous errors"),
        1
    );
    assert_eq!(
        infos_starting_with(&output, "code generation skipped due to previous errors"),
        1
    );
}

/// Test: Recovery lets later errors in the same unit be found
#[test]
fn test_multiple_syntax_errors_reported() {
    let output = compile("{ + x = 1 ) print(1) }$");
    assert_eq!(output.diagnostics.count(Stage::Parser, Severity::Error), 2);
    let errors = messages(&output, Severity::Error);
    assert!(errors[0].starts_with("invalid statement starting with"));
    assert!(errors[1].starts_with("invalid statement starting with"));
}

/// Test: A lexer error still lets the parser run, but discards the tree
#[test]
fn test_lex_error_gates_semantic_analysis() {
    let output = compile("{int x x = 1 # }$");
    assert_eq!(output.diagnostics.count(Stage::Lexer, Severity::Error), 1);
    assert_eq!(output.diagnostics.count(Stage::Parser, Severity::Error), 0);
    assert!(output.tree.is_none());
    assert!(output.semantic.is_none());
}

/// Test: Missing separator is a warning, not an error
#[test]
fn test_missing_separator_warns() {
    let output = compile("{}");
    assert!(output.succeeded());
    let warnings = messages(&output, Severity::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("missing program separator"));
}

/// Test: Redeclaration names the earlier declaration
#[test]
fn test_redeclaration_in_same_scope() {
    let output = compile("{int x int x}$");
    let errors = messages(&output, Severity::Error);
    assert_eq!(errors, vec!["symbol x already declared in scope 0 at (1:6)"]);
    assert!(output.code.is_none());
}

/// Test: Redeclaring in a nested scope is shadowing, not an error
#[test]
fn test_redeclaration_in_nested_scope_allowed() {
    let output = compile("{int x {int x}}$");
    assert!(output.succeeded());
}

/// Test: Semantic errors do not stop the traversal
#[test]
fn test_semantic_errors_accumulate() {
    let output = compile("{int x y = 1 z = 2 x = \"a\"}$");
    assert_eq!(
        output.diagnostics.count(Stage::SemanticAnalysis, Severity::Error),
        2
    );
    assert_eq!(output.diagnostics.count(Stage::TypeChecker, Severity::Error), 1);
}

/// Test: Diagnostics carry source positions
#[test]
fn test_diagnostic_positions() {
    let output = compile("{\n  int x\n  y = 1\n}$");
    let error = output
        .diagnostics
        .with_severity(Severity::Error)
        .next()
        .unwrap();
    let position = error.position().unwrap();
    assert_eq!((position.line, position.column), (3, 3));
}
