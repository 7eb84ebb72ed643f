//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O error
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    /// REPL error
    #[error("REPL error: {0}")]
    Repl(String),

    /// Artifact serialization error
    #[error("could not serialize artifacts: {0}")]
    Serialize(#[from] serde_json::Error),

    /// At least one program unit recorded an error
    #[error("compilation failed: {errors} error(s) in {failed} of {units} program(s)")]
    CompileFailed {
        /// Total errors over all units
        errors: usize,
        /// Units with at least one error
        failed: usize,
        /// Units compiled
        units: usize,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
