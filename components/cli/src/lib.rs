//! Block Language Compiler CLI Library
//!
//! Provides the Session struct and supporting modules for the `blockc` binary:
//! argument parsing, program splitting, diagnostic rendering, the REPL and
//! JSON artifact output.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod cli;
pub mod error;
pub mod programs;
pub mod render;
pub mod repl;
pub mod session;

pub use artifact::{write_artifact, Artifact, UnitArtifact};
pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use programs::{split_programs, ProgramUnit};
pub use session::{summarize, Session, UnitReport};
