//! Command line arguments

use clap::{ArgAction, Parser};
use log::LevelFilter;
use std::path::PathBuf;

/// Compiler for the block language
#[derive(Debug, Parser)]
#[command(name = "blockc", version, about = "Compile block language programs")]
pub struct Cli {
    /// Source file holding one or more `$`-terminated programs
    #[arg(short, long)]
    pub file: Option<String>,

    /// Compile source given on the command line
    #[arg(short, long)]
    pub eval: Option<String>,

    /// Start an interactive session
    #[arg(short, long)]
    pub repl: bool,

    /// Record the step-by-step trail; repeat to raise the log level
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the concrete syntax tree of each program
    #[arg(long)]
    pub print_cst: bool,

    /// Print the symbol table of each program
    #[arg(long)]
    pub print_symbols: bool,

    /// Stop after semantic analysis
    #[arg(long)]
    pub no_codegen: bool,

    /// Write images, temp tables and jump tables as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Logger level for the number of `-v` flags given
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// True if any `-v` was given
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }
}
