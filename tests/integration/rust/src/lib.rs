//! Integration test suite for the block language compiler
//!
//! This crate provides integration tests that verify components work
//! together correctly across component boundaries.

use compiler::{compile_unit, CompileOptions, CompileOutput};
use core_types::Severity;

/// Re-export components for test convenience
pub mod components {
    pub use cli;
    pub use compiler;
    pub use core_types;
    pub use runtime_image;
}

/// Compile one unit with default options
pub fn compile(source: &str) -> CompileOutput {
    compile_unit(source, &CompileOptions::default())
}

/// The first `len` cells of the generated image
pub fn code_bytes(output: &CompileOutput, len: usize) -> Vec<String> {
    output
        .code
        .as_ref()
        .map(|code| (0..len).map(|i| code.image.cell_at(i).to_string()).collect())
        .unwrap_or_default()
}

/// Messages of every diagnostic with `severity`
pub fn messages(output: &CompileOutput, severity: Severity) -> Vec<String> {
    output
        .diagnostics
        .with_severity(severity)
        .map(|d| d.message.clone())
        .collect()
}
