//! Session orchestration for compiling program units
//!
//! The Session struct carries the output switches chosen on the command line
//! and drives every program unit of a source text through
//! [`compiler::compile_unit`]:
//! - splitting the text on the program separator
//! - compiling each unit with fresh compiler state
//! - rendering diagnostics, the syntax tree, symbols and generated code

use crate::error::{CliError, CliResult};
use crate::programs::{split_programs, ProgramUnit};
use crate::render;
use compiler::{compile_unit, CompileOptions, CompileOutput, END_OF_PROGRAM};
use core_types::{DiagnosticLog, Stage};
use std::fmt::Write;
use std::path::Path;

/// One compiled program unit
#[derive(Debug, Clone)]
pub struct UnitReport {
    /// The unit as cut from the source text
    pub unit: ProgramUnit,
    /// Everything the compiler produced for it
    pub output: CompileOutput,
}

impl UnitReport {
    /// Errors recorded for this unit
    pub fn error_count(&self) -> usize {
        self.output.diagnostics.error_count()
    }

    /// Warnings recorded for this unit
    pub fn warning_count(&self) -> usize {
        self.output.diagnostics.warning_count()
    }

    /// True if no stage recorded an error
    pub fn succeeded(&self) -> bool {
        self.output.succeeded()
    }
}

/// Compilation session holding the output switches
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Whether to print the concrete syntax tree
    print_cst: bool,
    /// Whether to print the symbol table
    print_symbols: bool,
    /// Whether to skip code generation
    no_codegen: bool,
    /// Whether to record the Debug trail
    verbose: bool,
}

impl Session {
    /// Create a session with default switches
    ///
    /// # Example
    /// ```
    /// use cli::Session;
    ///
    /// let session = Session::new().with_print_cst(true);
    /// assert!(session.is_print_cst_enabled());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable syntax tree printing
    pub fn with_print_cst(mut self, enabled: bool) -> Self {
        self.print_cst = enabled;
        self
    }

    /// Enable symbol table printing
    pub fn with_print_symbols(mut self, enabled: bool) -> Self {
        self.print_symbols = enabled;
        self
    }

    /// Enable or disable code generation
    pub fn with_codegen(mut self, enabled: bool) -> Self {
        self.no_codegen = !enabled;
        self
    }

    /// Enable the Debug trail
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Switch the Debug trail on or off
    pub fn set_verbose(&mut self, enabled: bool) {
        self.verbose = enabled;
    }

    /// Check if syntax tree printing is enabled
    pub fn is_print_cst_enabled(&self) -> bool {
        self.print_cst
    }

    /// Check if symbol table printing is enabled
    pub fn is_print_symbols_enabled(&self) -> bool {
        self.print_symbols
    }

    /// Check if code generation is enabled
    pub fn is_codegen_enabled(&self) -> bool {
        !self.no_codegen
    }

    /// Check if the Debug trail is recorded
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Compiler options for these switches
    pub fn options(&self) -> CompileOptions {
        CompileOptions::default()
            .with_verbose(self.verbose)
            .with_codegen(!self.no_codegen)
    }

    /// Compile a source file
    ///
    /// # Errors
    /// Returns `CliError::Io` if the file cannot be read
    ///
    /// # Example
    /// ```no_run
    /// use cli::Session;
    ///
    /// let session = Session::new();
    /// let reports = session.compile_file("programs.txt").unwrap();
    /// ```
    pub fn compile_file(&self, path: impl AsRef<Path>) -> CliResult<Vec<UnitReport>> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        log::info!("compiling {}", path.display());
        Ok(self.compile_source(&source))
    }

    /// Compile every program unit of a source text
    ///
    /// # Example
    /// ```
    /// use cli::Session;
    ///
    /// let reports = Session::new().compile_source("{int x x=1}$ {int y z=2}$");
    /// assert_eq!(reports.len(), 2);
    /// assert!(reports[0].succeeded());
    /// assert!(!reports[1].succeeded());
    /// ```
    pub fn compile_source(&self, text: &str) -> Vec<UnitReport> {
        let options = self.options();
        split_programs(text)
            .into_iter()
            .map(|unit| {
                log::debug!("compiling program {}", unit.index + 1);
                let mut output = compile_unit(&unit.source, &options);
                if unit.repaired {
                    output.diagnostics = with_repair_warning(&output.diagnostics, self.verbose);
                }
                UnitReport { unit, output }
            })
            .collect()
    }

    /// Render one unit as text
    pub fn render(&self, report: &UnitReport) -> String {
        let first_line = report.unit.first_line;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Program {} (line {})",
            report.unit.index + 1,
            first_line
        );

        for diagnostic in report.output.diagnostics.iter() {
            let _ = writeln!(out, "{}", render::render_diagnostic(diagnostic, first_line));
        }

        if self.print_cst {
            match &report.output.tree {
                Some(tree) => {
                    let _ = write!(out, "\nConcrete Syntax Tree\n{}", tree.render());
                }
                None => out.push_str("\nConcrete Syntax Tree skipped due to parse errors\n"),
            }
        }

        if self.print_symbols {
            if let Some(model) = &report.output.semantic {
                let rows = model.scopes.symbol_table();
                let _ = write!(
                    out,
                    "\nSymbol Table\n{}",
                    render::render_symbols(&rows, first_line)
                );
            }
        }

        if let Some(code) = &report.output.code {
            let _ = write!(
                out,
                "\nRuntime Image\n{}\n\nTemp Table\n{}\nJump Table\n{}",
                render::render_image(&code.image),
                render::render_temps(&code.temps),
                render::render_jumps(&code.jumps)
            );
        }

        let _ = writeln!(
            out,
            "\nProgram {}: {} error(s), {} warning(s)",
            report.unit.index + 1,
            report.error_count(),
            report.warning_count()
        );
        out
    }

    /// Start the REPL (Read-Eval-Print Loop)
    ///
    /// # Errors
    /// Returns `CliError` if the REPL encounters a fatal error
    pub fn repl(&mut self) -> CliResult<()> {
        crate::repl::run_repl(self)
    }
}

/// Fold the unit reports into a final result
///
/// # Errors
/// Returns `CliError::CompileFailed` if any unit recorded an error
pub fn summarize(reports: &[UnitReport]) -> CliResult<()> {
    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    if failed == 0 {
        return Ok(());
    }
    Err(CliError::CompileFailed {
        errors: reports.iter().map(UnitReport::error_count).sum(),
        failed,
        units: reports.len(),
    })
}

fn with_repair_warning(diagnostics: &DiagnosticLog, verbose: bool) -> DiagnosticLog {
    let mut log = if verbose {
        DiagnosticLog::verbose()
    } else {
        DiagnosticLog::new()
    };
    log.warning(
        Stage::Lexer,
        format!("missing program separator, appended '{}'", END_OF_PROGRAM),
        None,
    );
    for diagnostic in diagnostics.iter() {
        log.push(diagnostic.clone());
    }
    log
}
