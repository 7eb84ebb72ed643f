//! REPL (Read-Eval-Print Loop) implementation

use crate::error::{CliError, CliResult};
use crate::session::Session;
use compiler::END_OF_PROGRAM;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Run the interactive REPL
///
/// Lines are accumulated until one contains the program separator; the
/// buffer is then compiled and every unit in it is reported.
///
/// # Arguments
/// * `session` - The Session whose switches apply to each compilation
///
/// # Returns
/// `Ok(())` when REPL exits normally
pub fn run_repl(session: &mut Session) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("failed to initialize editor: {}", e)))?;

    println!("blockc v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Type a program ending in '{}', or .help for commands.",
        END_OF_PROGRAM
    );
    println!();

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "> " } else { "... " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && trimmed.starts_with('.') {
                    if handle_repl_command(trimmed, session) == Command::Exit {
                        println!("Goodbye!");
                        break;
                    }
                    continue;
                }

                buffer.push_str(&line);
                buffer.push('\n');

                if is_program_complete(&buffer) {
                    let _ = editor.add_history_entry(buffer.trim_end());
                    for report in session.compile_source(&buffer) {
                        print!("{}", session.render(&report));
                    }
                    buffer.clear();
                }
            }
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    println!("Press Ctrl-D or type .exit to quit");
                } else {
                    println!("^C");
                    buffer.clear();
                }
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("readline error: {}", err)));
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Continue,
    Exit,
}

/// Handle special REPL commands
fn handle_repl_command(command: &str, session: &mut Session) -> Command {
    match command {
        ".help" => {
            println!("REPL Commands:");
            println!("  .help     - Show this help message");
            println!("  .verbose  - Toggle the step-by-step trail");
            println!("  .exit     - Exit the REPL");
        }
        ".verbose" => {
            session.set_verbose(!session.is_verbose());
            println!(
                "Verbose output: {}",
                if session.is_verbose() { "on" } else { "off" }
            );
        }
        ".exit" => return Command::Exit,
        _ => {
            println!("Unknown command: {}", command);
            println!("Type .help for available commands");
        }
    }
    Command::Continue
}

/// True once the buffer holds a program separator
fn is_program_complete(input: &str) -> bool {
    input.contains(END_OF_PROGRAM)
}
