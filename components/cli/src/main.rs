//! blockc - block language compiler
//!
//! Entry point for the compiler. Parses CLI arguments and delegates to the
//! Session for compilation.

use clap::Parser as ClapParser;
use cli::{summarize, write_artifact, Cli, CliError, Session, UnitReport};
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    SimpleLogger::new().with_level(cli.log_level()).init()?;

    let mut session = Session::new()
        .with_print_cst(cli.print_cst)
        .with_print_symbols(cli.print_symbols)
        .with_codegen(!cli.no_codegen)
        .with_verbose(cli.is_verbose());

    // Compile based on CLI arguments
    let reports = if let Some(file) = &cli.file {
        match session.compile_file(file) {
            Ok(reports) => reports,
            Err(CliError::Io(e)) => {
                eprintln!("Error: Could not read file '{}': {}", file, e);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Some(source) = &cli.eval {
        session.compile_source(source)
    } else if cli.repl {
        session.repl()?;
        return Ok(());
    } else {
        // Default: show usage
        println!("blockc v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage:");
        println!("  blockc --file <FILE>       Compile every program in a file");
        println!("  blockc --eval <SOURCE>     Compile programs given inline");
        println!("  blockc --repl              Start interactive session");
        println!();
        println!("Run 'blockc --help' for more options.");
        return Ok(());
    };

    finish(&cli, &session, &reports);
    Ok(())
}

fn finish(cli: &Cli, session: &Session, reports: &[UnitReport]) {
    for report in reports {
        print!("{}", session.render(report));
    }

    if let Some(path) = &cli.output {
        if let Err(e) = write_artifact(path, reports) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = summarize(reports) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
