//! JSON artifacts for compiled program units

use crate::error::CliResult;
use crate::session::UnitReport;
use core_types::Diagnostic;
use runtime_image::{JumpTableEntry, TempTableEntry};
use serde::Serialize;
use std::path::Path;

/// Artifacts of one program unit
#[derive(Debug, Clone, Serialize)]
pub struct UnitArtifact {
    /// One-based program number
    pub program: usize,
    /// Line of the source text the unit starts on
    pub first_line: u32,
    /// True if no stage recorded an error
    pub succeeded: bool,
    /// Errors recorded for the unit
    pub errors: usize,
    /// Warnings recorded for the unit
    pub warnings: usize,
    /// Image rows, empty if no code was generated
    pub image: Vec<Vec<String>>,
    /// Temp table slots
    pub temps: Vec<TempTableEntry>,
    /// Jump table slots
    pub jumps: Vec<JumpTableEntry>,
    /// Every diagnostic of the unit
    pub diagnostics: Vec<Diagnostic>,
}

impl From<&UnitReport> for UnitArtifact {
    fn from(report: &UnitReport) -> Self {
        let code = report.output.code.as_ref();
        Self {
            program: report.unit.index + 1,
            first_line: report.unit.first_line,
            succeeded: report.succeeded(),
            errors: report.error_count(),
            warnings: report.warning_count(),
            image: code.map(|c| c.image.rows().to_vec()).unwrap_or_default(),
            temps: code.map(|c| c.temps.entries().to_vec()).unwrap_or_default(),
            jumps: code.map(|c| c.jumps.entries().to_vec()).unwrap_or_default(),
            diagnostics: report.output.diagnostics.diagnostics().to_vec(),
        }
    }
}

/// One JSON document per run
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    /// Compiler version that produced the document
    pub version: &'static str,
    /// One entry per program unit, in source order
    pub units: Vec<UnitArtifact>,
}

impl Artifact {
    /// Collect the artifacts of every unit
    pub fn from_reports(reports: &[UnitReport]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            units: reports.iter().map(UnitArtifact::from).collect(),
        }
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> CliResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write the artifacts of `reports` to `path` as JSON
///
/// # Errors
/// Returns `CliError::Serialize` or `CliError::Io` if the document cannot be
/// produced or written
pub fn write_artifact(path: impl AsRef<Path>, reports: &[UnitReport]) -> CliResult<()> {
    let path = path.as_ref();
    let json = Artifact::from_reports(reports).to_json()?;
    std::fs::write(path, json)?;
    log::info!("wrote artifacts for {} program(s) to {}", reports.len(), path.display());
    Ok(())
}
