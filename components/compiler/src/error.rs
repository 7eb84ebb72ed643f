//! Diagnostic constructors shared by the compiler stages

use crate::lexer::{Token, TokenKind};
use core_types::{Diagnostic, Severity, SourceSpan, Stage};

/// Create a lexer error at a span
pub fn lex_error(message: impl Into<String>, span: SourceSpan) -> Diagnostic {
    Diagnostic::new(Severity::Error, Stage::Lexer, message).with_span(span)
}

/// Create a lexer warning at a span
pub fn lex_warning(message: impl Into<String>, span: SourceSpan) -> Diagnostic {
    Diagnostic::new(Severity::Warning, Stage::Lexer, message).with_span(span)
}

/// Create a syntax error, optionally pointing at a token
pub fn syntax_error(message: impl Into<String>, token: Option<&Token>) -> Diagnostic {
    let diag = Diagnostic::new(Severity::Error, Stage::Parser, message);
    match token {
        Some(t) => diag.with_span(t.span()),
        None => diag,
    }
}

/// Create an unexpected token error
pub fn unexpected_token(expected: &str, got: &Token) -> Diagnostic {
    syntax_error(
        format!(
            "expected {}, found {} '{}' at ({}:{})",
            expected, got.kind, got.text, got.line, got.column
        ),
        Some(got),
    )
}

/// Create the error for running out of tokens
pub fn no_tokens_remaining(expected: TokenKind) -> Diagnostic {
    syntax_error(
        format!("expected {}, but no tokens remain", expected),
        None,
    )
}

/// Create a scope or symbol error at a token
pub fn semantic_error(message: impl Into<String>, token: &Token) -> Diagnostic {
    Diagnostic::new(Severity::Error, Stage::SemanticAnalysis, message).with_span(token.span())
}

/// Create a type error, optionally pointing at a token
pub fn type_error(message: impl Into<String>, token: Option<&Token>) -> Diagnostic {
    type_event(Severity::Error, message, token)
}

/// Create an informational type checker event
pub fn type_info(message: impl Into<String>, token: Option<&Token>) -> Diagnostic {
    type_event(Severity::Info, message, token)
}

fn type_event(severity: Severity, message: impl Into<String>, token: Option<&Token>) -> Diagnostic {
    let diag = Diagnostic::new(severity, Stage::TypeChecker, message);
    match token {
        Some(t) => diag.with_span(t.span()),
        None => diag,
    }
}
