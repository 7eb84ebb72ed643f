//! Contract tests for compiler API
//!
//! These tests verify the compiler component implements its contract correctly.

use compiler::{
    compile_unit, tokenize, CompileOptions, Lexer, NodeId, Parser, Rule, ScopeTree,
    SemanticAnalyzer, SyntaxTree, TokenKind,
};
use core_types::{DiagnosticLog, Severity, SourcePosition, Stage, Type};
use runtime_image::SlotKind;

// =============================================================================
// Lexer Contract Tests
// =============================================================================

#[test]
fn test_example_token_sequence() {
    let mut log = DiagnosticLog::new();
    let stream = tokenize("{int x x=1}$", &mut log);
    assert_eq!(
        stream.kinds(),
        vec![
            TokenKind::LeftBrace,
            TokenKind::IntType,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Digit,
            TokenKind::RightBrace,
            TokenKind::EndOfProgram,
        ]
    );
    assert!(!log.has_errors());
}

#[test]
fn test_lexer_reports_positions() {
    let mut log = DiagnosticLog::new();
    let mut lexer = Lexer::new("{\n  print");
    assert_eq!(lexer.next_token(&mut log).kind, TokenKind::LeftBrace);
    let mut token = lexer.next_token(&mut log);
    while token.kind == TokenKind::Whitespace {
        token = lexer.next_token(&mut log);
    }
    assert_eq!(token.kind, TokenKind::Print);
    assert_eq!((token.line, token.column), (2, 3));
}

#[test]
fn test_lexer_never_aborts_on_bad_characters() {
    let mut log = DiagnosticLog::new();
    let stream = tokenize("{ @ # % }$", &mut log);
    assert_eq!(log.count(Stage::Lexer, Severity::Error), 3);
    assert_eq!(stream.len(), 3);
}

// =============================================================================
// Parser Contract Tests
// =============================================================================

#[test]
fn test_parser_returns_tree_for_valid_program() {
    let mut log = DiagnosticLog::new();
    let tokens = tokenize("{int x x=1}$", &mut log);
    let tree = Parser::new(tokens, &mut log).parse().unwrap();
    let root = tree.root().unwrap();
    assert_eq!(tree.rule(root), Some(Rule::Program));
    assert_eq!(log.count(Stage::Parser, Severity::Error), 0);
}

#[test]
fn test_parser_discards_tree_on_any_error() {
    for source in ["{int}$", "{x = }$", "{print 1}$", "{ + }$", "int x$"] {
        let mut log = DiagnosticLog::new();
        let tokens = tokenize(source, &mut log);
        let tree = Parser::new(tokens, &mut log).parse();
        assert!(tree.is_none(), "{} produced a tree", source);
        assert!(log.count(Stage::Parser, Severity::Error) > 0);
    }
}

#[test]
fn test_cst_render_shape() {
    let mut log = DiagnosticLog::new();
    let tokens = tokenize("{int x}$", &mut log);
    let tree = Parser::new(tokens, &mut log).parse().unwrap();
    let rendered = tree.render();
    assert!(rendered.starts_with("<Program>\n-<Block>\n--[{]\n"));
    assert!(rendered.contains("-----<Type>\n------[int]\n"));
    assert!(rendered.ends_with("-[$]\n"));
}

// =============================================================================
// Scope / Semantic Contract Tests
// =============================================================================

#[test]
fn test_scope_tree_shadowing() {
    let mut scopes = ScopeTree::new();
    scopes.open_scope();
    scopes
        .declare("x", Type::Int, SourcePosition::start())
        .unwrap();
    scopes.open_scope();
    scopes
        .declare("x", Type::String, SourcePosition::start())
        .unwrap();
    assert_eq!(scopes.lookup("x").unwrap().ty, Type::String);
    scopes.close_scope();
    assert_eq!(scopes.lookup("x").unwrap().ty, Type::Int);
}

#[test]
fn test_semantic_resolves_shadowed_use() {
    let source = "{int x x = 1 {string x x = \"a\" print(x)} print(x)}$";
    let output = compile_unit(source, &CompileOptions::default());
    assert!(output.succeeded(), "{:?}", output.diagnostics.diagnostics());
    let model = output.semantic.unwrap();
    let tree = output.tree.unwrap();

    let prints: Vec<_> = tree
        .ids()
        .filter(|&id| tree.rule(id) == Some(Rule::PrintStatement))
        .collect();
    let resolved: Vec<_> = prints
        .iter()
        .map(|&p| {
            let ident = tree
                .ids()
                .find(|&id| {
                    tree.rule(id) == Some(Rule::Identifier)
                        && tree.depth(id) > tree.depth(p)
                        && is_descendant(&tree, id, p)
                })
                .unwrap();
            let scope = model.resolution(ident).unwrap();
            model.scopes.symbol(scope, "x").unwrap().ty
        })
        .collect();
    assert_eq!(resolved, vec![Type::String, Type::Int]);
}

fn is_descendant(tree: &SyntaxTree, node: NodeId, ancestor: NodeId) -> bool {
    let mut current = tree.parent(node);
    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        current = tree.parent(parent);
    }
    false
}

#[test]
fn test_semantic_analyzer_direct() {
    let mut log = DiagnosticLog::new();
    let tokens = tokenize("{boolean b b = true print(b)}$", &mut log);
    let tree = Parser::new(tokens, &mut log).parse().unwrap();
    let model = SemanticAnalyzer::new(&tree, &mut log).analyze();
    assert_eq!(log.error_count(), 0);
    assert_eq!(model.scopes.symbol_table().len(), 1);
    assert_eq!(model.block_scopes.len(), 1);
}

#[test]
fn test_example_undeclared_identifier() {
    let output = compile_unit("{int x y=1}$", &CompileOptions::default());
    let errors: Vec<_> = output.diagnostics.with_severity(Severity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].stage, Stage::SemanticAnalysis);
    assert!(errors[0].message.contains("undeclared identifier y"));
    assert_eq!(output.diagnostics.count(Stage::TypeChecker, Severity::Error), 0);
}

#[test]
fn test_type_mismatch_examples() {
    let bad = compile_unit("{int x  x = \"a\"}$", &CompileOptions::default());
    assert_eq!(bad.diagnostics.count(Stage::TypeChecker, Severity::Error), 1);
    let good = compile_unit("{int x  x = 5}$", &CompileOptions::default());
    assert_eq!(good.diagnostics.error_count(), 0);
}

// =============================================================================
// Code Generation Contract Tests
// =============================================================================

#[test]
fn test_example_end_to_end() {
    let output = compile_unit("{int x x=1}$", &CompileOptions::default());
    assert_eq!(output.diagnostics.error_count(), 0);
    let warnings: Vec<_> = output
        .diagnostics
        .with_severity(Severity::Warning)
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(warnings, vec!["unused variable x"]);

    let model = output.semantic.unwrap();
    assert_eq!(model.scopes.len(), 1);
    assert_eq!(model.scopes.symbol(0, "x").unwrap().ty, Type::Int);

    let code = output.code.unwrap();
    let variables: Vec<_> = code
        .temps
        .entries()
        .iter()
        .filter(|e| e.kind == SlotKind::Variable)
        .collect();
    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].name, "x");
    assert_eq!(variables[0].offset, 1);
    assert!(code.temps.is_resolved());
    assert_eq!(code.image.cell(0, 3), "0B");
}

#[test]
fn test_no_placeholders_survive() {
    let source = "{int a string s boolean b a = 1 + 2 + 3 s = \"ok\" \
                  b = (a == 6) if (b == true) {print(s)} while (a != 9) {a = 1 + a}}$";
    let output = compile_unit(source, &CompileOptions::default());
    assert!(output.succeeded(), "{:?}", output.diagnostics.diagnostics());
    let code = output.code.unwrap();
    assert!(code.temps.is_resolved());
    assert!(code.jumps.is_resolved());
    for row in code.image.rows() {
        for cell in row {
            assert!(u8::from_str_radix(cell, 16).is_ok(), "unresolved cell {}", cell);
        }
    }
}
