//! Full Pipeline Integration Tests
//!
//! Tests the complete flow: Source -> Lexer -> Parser -> CST -> Semantic
//! Analysis -> Code Generation -> Runtime Image

use compiler::Rule;
use core_types::{Severity, Stage, Type};
use integration_tests::{code_bytes, compile, messages};
use runtime_image::SlotKind;

/// Test: The smallest program compiles to a single BRK
#[test]
fn test_full_pipeline_empty_block() {
    let output = compile("{}$");
    assert!(output.succeeded());
    assert_eq!(code_bytes(&output, 2), vec!["00", "00"]);
    assert!(output.code.unwrap().temps.is_empty());
}

/// Test: Declaration, assignment and print of one variable
#[test]
fn test_full_pipeline_print_variable() {
    let output = compile("{int a a = 3 print(a)}$");
    assert!(output.succeeded(), "{:?}", output.diagnostics.diagnostics());
    assert_eq!(
        code_bytes(&output, 17),
        vec![
            "A9", "00", "8D", "11", "00", // int a
            "A9", "03", "8D", "11", "00", // a = 3
            "AC", "11", "00", "A2", "01", "FF", // print(a)
            "00",
        ]
    );
    assert!(messages(&output, Severity::Warning).is_empty());
}

/// Test: Strings live at the top of the image and print with mode 02
#[test]
fn test_full_pipeline_print_string() {
    let output = compile("{string s s = \"hi\" print(s)}$");
    assert!(output.succeeded());
    let code = output.code.as_ref().unwrap();
    assert_eq!(code.image.heap_start(), 0xFD);
    assert_eq!(code.image.cell_at(0xFD), "68");
    assert_eq!(code.image.cell_at(0xFE), "69");
    assert_eq!(code.image.cell_at(0xFF), "00");
    assert_eq!(code.image.cell_at(6), "FD");
    assert_eq!(&code_bytes(&output, 16)[13..15], &["A2", "02"]);
}

/// Test: Identical string literals share storage
#[test]
fn test_full_pipeline_string_dedup() {
    let output = compile("{print(\"ab\") print(\"ab\")}$");
    assert!(output.succeeded());
    let bytes = code_bytes(&output, 10);
    assert_eq!(bytes[1], bytes[6]);
    assert_eq!(output.code.unwrap().image.heap_start(), 0xFD);
}

/// Test: Shadowed variables get distinct storage
#[test]
fn test_full_pipeline_shadowing() {
    let output = compile("{int x x = 1 {int x x = 2 print(x)} print(x)}$");
    assert!(output.succeeded(), "{:?}", output.diagnostics.diagnostics());
    let code = output.code.unwrap();
    let variables: Vec<_> = code
        .temps
        .entries()
        .iter()
        .filter(|e| e.kind == SlotKind::Variable)
        .collect();
    assert_eq!(variables.len(), 2);
    assert_ne!(variables[0].scope, variables[1].scope);
    assert_ne!(variables[0].address, variables[1].address);
    assert_eq!(variables[1].level, variables[0].level + 1);
}

/// Test: Scope tree mirrors block nesting
#[test]
fn test_full_pipeline_scope_tree() {
    let output = compile("{int a {int b {int c}} {int d}}$");
    let model = output.semantic.unwrap();
    assert_eq!(model.scopes.len(), 4);
    let levels: Vec<_> = model.scopes.scopes().iter().map(|s| s.level).collect();
    assert_eq!(levels, vec![0, 1, 2, 1]);
    let names: Vec<_> = model
        .scopes
        .symbol_table()
        .into_iter()
        .map(|row| row.name)
        .collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert_eq!(messages_count(&output.diagnostics, "unused variable"), 4);
}

fn messages_count(log: &core_types::DiagnosticLog, prefix: &str) -> usize {
    log.iter().filter(|d| d.message.starts_with(prefix)).count()
}

/// Test: Loops and conditionals leave no unresolved jumps
#[test]
fn test_full_pipeline_control_flow() {
    let source = "{int i i = 0 while (i != 5) {i = 1 + i if (i == 3) {print(i)}}}$";
    let output = compile(source);
    assert!(output.succeeded(), "{:?}", output.diagnostics.diagnostics());
    let code = output.code.unwrap();
    assert_eq!(code.jumps.len(), 2);
    assert!(code.jumps.is_resolved());
    assert!(code.temps.is_resolved());
    assert!(!code.image.overflowed());
}

/// Test: Boolean variables hold 00 or 01
#[test]
fn test_full_pipeline_boolean_literal() {
    let output = compile("{boolean b b = true print(b)}$");
    assert!(output.succeeded());
    assert_eq!(&code_bytes(&output, 7)[5..7], &["A9", "01"]);
    let model = output.semantic.unwrap();
    assert_eq!(model.scopes.symbol(0, "b").unwrap().ty, Type::Boolean);
}

/// Test: Tokens are handed back without trivia
#[test]
fn test_full_pipeline_tokens_and_tree() {
    let output = compile("{ /* note */ print(1) }$");
    assert!(output.succeeded());
    assert_eq!(output.tokens.len(), 7);
    let tree = output.tree.unwrap();
    assert!(tree
        .ids()
        .any(|id| tree.rule(id) == Some(Rule::PrintStatement)));
}

/// Test: Type mismatches in every position are caught before codegen
#[test]
fn test_full_pipeline_type_errors() {
    for source in [
        "{int x x = \"a\"}$",
        "{string s s = 1}$",
        "{int x x = 1 + true}$",
        "{boolean b b = (1 == \"a\")}$",
        "{if (1) {}}$",
    ] {
        let output = compile(source);
        assert!(
            output.diagnostics.count(Stage::TypeChecker, Severity::Error) >= 1,
            "{} passed type checking",
            source
        );
        assert!(output.code.is_none());
    }
}

/// Test: Using a variable before assignment is only a warning
#[test]
fn test_full_pipeline_uninitialized_use() {
    let output = compile("{int x print(x)}$");
    assert!(output.succeeded());
    assert_eq!(
        messages(&output, Severity::Warning),
        vec!["variable x used before being initialized"]
    );
    assert!(output.code.is_some());
}
