//! Diagnostic events emitted by the compiler stages.
//!
//! Every stage reports what it finds as a [`Diagnostic`] pushed into a
//! [`DiagnosticLog`]. The log owns the per-unit error counter that decides
//! whether later stages run.

use crate::{SourcePosition, SourceSpan};
use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
///
/// Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Blocks every later stage for the program unit
    Error,
    /// Advisory; never blocks a later stage
    Warning,
    /// Progress information
    Info,
    /// Step-by-step trail, only recorded in verbose mode
    Debug,
}

impl Severity {
    /// Upper-case label used when rendering
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The compiler stage a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Lexical analysis
    Lexer,
    /// Recursive-descent parsing
    Parser,
    /// Scope tree and symbol table construction
    SemanticAnalysis,
    /// Type checking
    TypeChecker,
    /// Code generation and backpatching
    CodeGen,
}

impl Stage {
    /// Human-readable stage name
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Lexer => "Lexer",
            Stage::Parser => "Parser",
            Stage::SemanticAnalysis => "Semantic Analysis",
            Stage::TypeChecker => "Type Checker",
            Stage::CodeGen => "Code Generator",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single diagnostic event.
///
/// # Examples
///
/// ```
/// use core_types::{Diagnostic, Severity, Stage};
///
/// let diag = Diagnostic::new(Severity::Warning, Stage::Lexer, "missing program separator");
/// assert!(diag.span.is_none());
/// assert_eq!(diag.line(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of the event
    pub severity: Severity,
    /// Stage that produced the event
    pub stage: Stage,
    /// Human-readable message
    pub message: String,
    /// Text and position the event refers to, if any
    pub span: Option<SourceSpan>,
}

impl Diagnostic {
    /// Create a diagnostic without a position
    pub fn new(severity: Severity, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            severity,
            stage,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a span
    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// Line number of the span, if the event has one
    pub fn line(&self) -> Option<u32> {
        self.span.as_ref().map(SourceSpan::line)
    }

    /// Position of the span, if the event has one
    pub fn position(&self) -> Option<SourcePosition> {
        self.span.as_ref().map(|s| s.position)
    }
}

/// Ordered diagnostic stream for one program unit.
///
/// Error-severity events increment the error counter; a non-zero counter is
/// the signal that downstream stages are skipped.
///
/// # Examples
///
/// ```
/// use core_types::{DiagnosticLog, Stage};
///
/// let mut log = DiagnosticLog::new();
/// log.warning(Stage::SemanticAnalysis, "unused variable x", None);
/// assert!(!log.has_errors());
/// log.error(Stage::Parser, "expected '}'", None);
/// assert_eq!(log.error_count(), 1);
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticLog {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    record_debug: bool,
}

impl DiagnosticLog {
    /// Create an empty log that drops Debug events
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log that also keeps Debug events
    pub fn verbose() -> Self {
        Self {
            record_debug: true,
            ..Self::default()
        }
    }

    /// Whether Debug events are kept
    pub fn is_verbose(&self) -> bool {
        self.record_debug
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Debug if !self.record_debug => return,
            _ => {}
        }
        self.diagnostics.push(diagnostic);
    }

    fn record(
        &mut self,
        severity: Severity,
        stage: Stage,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) {
        self.push(Diagnostic {
            severity,
            stage,
            message: message.into(),
            span,
        });
    }

    /// Record an Error event
    pub fn error(&mut self, stage: Stage, message: impl Into<String>, span: Option<SourceSpan>) {
        self.record(Severity::Error, stage, message, span);
    }

    /// Record a Warning event
    pub fn warning(&mut self, stage: Stage, message: impl Into<String>, span: Option<SourceSpan>) {
        self.record(Severity::Warning, stage, message, span);
    }

    /// Record an Info event
    pub fn info(&mut self, stage: Stage, message: impl Into<String>, span: Option<SourceSpan>) {
        self.record(Severity::Info, stage, message, span);
    }

    /// Record a Debug event (dropped unless the log is verbose)
    pub fn debug(&mut self, stage: Stage, message: impl Into<String>, span: Option<SourceSpan>) {
        if self.record_debug {
            self.record(Severity::Debug, stage, message, span);
        }
    }

    /// Total Error events recorded
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Total Warning events recorded
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// True once any Error event has been recorded
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Number of events of `severity` recorded by `stage`
    pub fn count(&self, stage: Stage, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.stage == stage && d.severity == severity)
            .count()
    }

    /// All recorded events, in order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate over recorded events
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Events of one severity, in order
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl<'a> IntoIterator for &'a DiagnosticLog {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
