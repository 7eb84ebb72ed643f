//! Splitting a source text into `$`-terminated program units

use compiler::END_OF_PROGRAM;

/// One program unit cut from a source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramUnit {
    /// Zero-based position of the unit in the text
    pub index: usize,
    /// Unit source including its trailing separator
    pub source: String,
    /// Line of the text the unit starts on
    pub first_line: u32,
    /// True if the separator was missing and has been appended
    pub repaired: bool,
}

/// Split `text` into program units.
///
/// Carriage returns are dropped. Every `$` ends a unit, even inside a
/// string, matching where the lexer stops. Every unit keeps its `$`. A non-blank
/// remainder without a separator becomes a final, repaired unit; a blank
/// remainder is ignored.
///
/// # Examples
///
/// ```
/// use cli::split_programs;
///
/// let units = split_programs("{}$\n{int x}");
/// assert_eq!(units.len(), 2);
/// assert_eq!(units[0].source, "{}$");
/// assert_eq!(units[1].source, "\n{int x}$");
/// assert!(units[1].repaired);
/// ```
pub fn split_programs(text: &str) -> Vec<ProgramUnit> {
    let text: String = text.chars().filter(|&c| c != '\r').collect();
    let mut units = Vec::new();
    let mut current = String::new();
    let mut first_line = 1u32;
    let mut line = 1u32;

    for c in text.chars() {
        current.push(c);
        match c {
            '\n' => line += 1,
            END_OF_PROGRAM => {
                units.push(ProgramUnit {
                    index: units.len(),
                    source: std::mem::take(&mut current),
                    first_line,
                    repaired: false,
                });
                first_line = line;
            }
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        log::debug!("appending missing separator to program {}", units.len());
        current.push(END_OF_PROGRAM);
        units.push(ProgramUnit {
            index: units.len(),
            source: current,
            first_line,
            repaired: true,
        });
    }
    units
}
