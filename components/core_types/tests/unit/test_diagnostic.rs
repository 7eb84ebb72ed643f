//! Unit tests for Diagnostic and DiagnosticLog

use core_types::{Diagnostic, DiagnosticLog, Severity, SourcePosition, SourceSpan, Stage};

#[test]
fn test_diagnostic_with_span_reports_line() {
    let diag = Diagnostic::new(Severity::Error, Stage::Lexer, "invalid character '@'")
        .with_span(SourceSpan::new("@", SourcePosition::new(7, 3, 40)));
    assert_eq!(diag.line(), Some(7));
    assert_eq!(diag.position().map(|p| p.column), Some(3));
}

#[test]
fn test_log_keeps_insertion_order() {
    let mut log = DiagnosticLog::new();
    log.info(Stage::Lexer, "first", None);
    log.warning(Stage::Parser, "second", None);
    log.error(Stage::CodeGen, "third", None);

    let messages: Vec<&str> = log.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["first", "second", "third"]);
}

#[test]
fn test_warnings_do_not_count_as_errors() {
    let mut log = DiagnosticLog::new();
    log.warning(Stage::SemanticAnalysis, "unused variable a", None);
    log.warning(Stage::SemanticAnalysis, "unused variable b", None);
    assert_eq!(log.warning_count(), 2);
    assert_eq!(log.error_count(), 0);
    assert!(!log.has_errors());
}

#[test]
fn test_verbose_log_keeps_debug_events() {
    let mut log = DiagnosticLog::verbose();
    assert!(log.is_verbose());
    log.debug(Stage::Parser, "expecting '{'", None);
    assert_eq!(log.with_severity(Severity::Debug).count(), 1);
}

#[test]
fn test_pushed_error_counts() {
    let mut log = DiagnosticLog::new();
    log.push(Diagnostic::new(Severity::Error, Stage::TypeChecker, "type mismatch"));
    assert_eq!(log.error_count(), 1);
    assert_eq!(log.count(Stage::TypeChecker, Severity::Error), 1);
}

#[test]
fn test_stage_names() {
    assert_eq!(Stage::Lexer.to_string(), "Lexer");
    assert_eq!(Stage::CodeGen.to_string(), "Code Generator");
}
