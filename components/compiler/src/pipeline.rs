//! Whole-unit compilation: lex, parse, analyze, generate

use crate::code_gen::{self, CodeGenOutput};
use crate::lexer::{tokenize, Token};
use crate::parser;
use crate::semantic::{self, SemanticModel};
use crate::syntax_tree::SyntaxTree;
use core_types::{DiagnosticLog, Stage};

/// Options for one compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Record Debug diagnostics (the per-token and per-lookup trail)
    pub verbose: bool,
    /// Run code generation after a clean semantic pass
    pub emit_code: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            emit_code: true,
        }
    }
}

impl CompileOptions {
    /// Set verbose diagnostics
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable code generation
    pub fn with_codegen(mut self, emit_code: bool) -> Self {
        self.emit_code = emit_code;
        self
    }
}

/// Everything one compilation produced
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Tokens handed to the parser
    pub tokens: Vec<Token>,
    /// Syntax tree, present only if lexing and parsing were error free
    pub tree: Option<SyntaxTree>,
    /// Scopes and resolutions, present whenever a tree was analyzed
    pub semantic: Option<SemanticModel>,
    /// Generated code, present only for an error-free program
    pub code: Option<CodeGenOutput>,
    /// All diagnostics of the unit in emission order
    pub diagnostics: DiagnosticLog,
}

impl CompileOutput {
    /// True if no stage recorded an error
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Compile one program unit with fresh state for every stage.
///
/// A non-zero error count after parsing discards the tree; after semantic
/// analysis it skips code generation; after code generation it discards the
/// image, so returned code never holds an unresolved placeholder.
///
/// # Examples
///
/// ```
/// use compiler::{compile_unit, CompileOptions};
///
/// let output = compile_unit("{int x x=1}$", &CompileOptions::default());
/// assert!(output.succeeded());
/// assert_eq!(output.diagnostics.warning_count(), 1);
/// assert_eq!(output.code.unwrap().temps.entries()[0].address, "0B 00");
/// ```
pub fn compile_unit(source: &str, options: &CompileOptions) -> CompileOutput {
    let mut diagnostics = if options.verbose {
        DiagnosticLog::verbose()
    } else {
        DiagnosticLog::new()
    };

    let stream = tokenize(source, &mut diagnostics);
    let tokens: Vec<Token> = stream.iter().cloned().collect();

    let mut tree = parser::parse(stream, &mut diagnostics);
    if tree.is_some() && diagnostics.has_errors() {
        log::debug!("discarding syntax tree after lex errors");
        tree = None;
    }
    if tree.is_none() {
        diagnostics.info(
            Stage::SemanticAnalysis,
            "semantic analysis skipped due to previous errors",
            None,
        );
    }

    let semantic = tree
        .as_ref()
        .map(|tree| semantic::analyze(tree, &mut diagnostics));

    let code = match (&tree, &semantic) {
        (Some(tree), Some(model)) if options.emit_code && !diagnostics.has_errors() => {
            let code = code_gen::generate(tree, model, &mut diagnostics);
            if diagnostics.has_errors() {
                log::debug!("discarding image after code generation errors");
                diagnostics.info(
                    Stage::CodeGen,
                    "generated code discarded due to code generation errors",
                    None,
                );
                None
            } else {
                Some(code)
            }
        }
        _ => {
            if options.emit_code {
                diagnostics.info(
                    Stage::CodeGen,
                    "code generation skipped due to previous errors",
                    None,
                );
            }
            None
        }
    };

    log::debug!(
        "compiled unit: {} errors, {} warnings",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
    CompileOutput {
        tokens,
        tree,
        semantic,
        code,
        diagnostics,
    }
}
