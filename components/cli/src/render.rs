//! Text rendering of diagnostics, tables and images

use compiler::SymbolRow;
use core_types::Diagnostic;
use runtime_image::{JumpTable, RuntimeImage, SlotKind, TempTable};
use std::fmt::Write;

/// Format one diagnostic as `SEVERITY [Stage] (line:col) message`.
///
/// `first_line` is the line of the source text the program unit starts on;
/// positions inside the unit are shifted by it. Diagnostics without a
/// position omit the parenthesized part.
///
/// # Examples
///
/// ```
/// use cli::render::render_diagnostic;
/// use core_types::{Diagnostic, Severity, SourcePosition, SourceSpan, Stage};
///
/// let diag = Diagnostic::new(Severity::Error, Stage::Lexer, "invalid character '#'")
///     .with_span(SourceSpan::new("#", SourcePosition::new(2, 5, 9)));
/// assert_eq!(render_diagnostic(&diag, 1), "ERROR [Lexer] (2:5) invalid character '#'");
/// assert_eq!(render_diagnostic(&diag, 4), "ERROR [Lexer] (5:5) invalid character '#'");
/// ```
pub fn render_diagnostic(diagnostic: &Diagnostic, first_line: u32) -> String {
    match diagnostic.position() {
        Some(pos) => format!(
            "{} [{}] ({}:{}) {}",
            diagnostic.severity.label(),
            diagnostic.stage,
            pos.line + first_line.saturating_sub(1),
            pos.column,
            diagnostic.message
        ),
        None => format!(
            "{} [{}] {}",
            diagnostic.severity.label(),
            diagnostic.stage,
            diagnostic.message
        ),
    }
}

/// The image as 32 lines of 8 cells
pub fn render_image(image: &RuntimeImage) -> String {
    image.dump()
}

/// One line per temp table slot
pub fn render_temps(temps: &TempTable) -> String {
    let mut out = String::from("Tag  Name  Type     Scope  Offset  Address\n");
    for entry in temps.entries() {
        let name = match entry.kind {
            SlotKind::Variable => entry.name.as_str(),
            SlotKind::Scratch => "-",
        };
        let _ = writeln!(
            out,
            "{:<4} {:<5} {:<8} {:<6} {:<7} {}",
            entry.tag, name, entry.ty.keyword(), entry.scope, entry.offset, entry.address
        );
    }
    out
}

/// One line per jump table slot
pub fn render_jumps(jumps: &JumpTable) -> String {
    let mut out = String::from("Tag  Distance\n");
    for entry in jumps.entries() {
        let distance = entry
            .length
            .map(|l| format!("{:02X}", l))
            .unwrap_or_else(|| "??".to_string());
        let _ = writeln!(out, "{:<4} {}", entry.tag, distance);
    }
    out
}

/// One line per declared symbol, in declaration order
pub fn render_symbols(rows: &[SymbolRow], first_line: u32) -> String {
    let mut out = String::from("Name  Type     Scope  Line\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<5} {:<8} {:<6} {}",
            row.name,
            row.ty.keyword(),
            row.scope,
            row.line + first_line.saturating_sub(1)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Severity, Stage, Type};

    #[test]
    fn test_render_diagnostic_without_position() {
        let diag = Diagnostic::new(Severity::Info, Stage::CodeGen, "done");
        assert_eq!(render_diagnostic(&diag, 1), "INFO [Code Generator] done");
    }

    #[test]
    fn test_render_temps_rows() {
        let mut temps = TempTable::new();
        temps.allocate("x", Type::Int, SlotKind::Variable, 0, 0);
        temps.allocate("", Type::Int, SlotKind::Scratch, 0, 0);
        let out = render_temps(&temps);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("T0   x     int"));
        assert!(lines[2].starts_with("T1   -"));
        assert!(lines[1].ends_with("T0 XX"));
    }

    #[test]
    fn test_render_jumps_unresolved() {
        let mut jumps = JumpTable::new();
        jumps.allocate();
        assert_eq!(render_jumps(&jumps), "Tag  Distance\nJ0   ??\n");
    }

    #[test]
    fn test_render_image_shape() {
        let image = RuntimeImage::new();
        let dump = render_image(&image);
        assert_eq!(dump.lines().count(), 32);
        assert!(dump.lines().all(|l| l.split(' ').count() == 8));
    }
}
