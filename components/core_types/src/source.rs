//! Source position and span types for diagnostic tracking.
//!
//! This module provides the types the compiler stages use to point a
//! diagnostic at the text that caused it.

use serde::Serialize;
use std::fmt;

/// Represents a position in source code.
///
/// Lines and columns are 1-based; the offset is a character offset from the
/// start of the program unit.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition {
///     line: 10,
///     column: 5,
///     offset: 150,
/// };
///
/// assert_eq!(pos.line, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourcePosition {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
    /// Character offset from the start of the program unit
    pub offset: usize,
}

impl SourcePosition {
    /// Create a new source position
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// The first character of a program unit
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A piece of source text together with where it starts.
///
/// # Examples
///
/// ```
/// use core_types::{SourcePosition, SourceSpan};
///
/// let span = SourceSpan::new("print", SourcePosition::new(2, 3, 9));
/// assert_eq!(span.line(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSpan {
    /// The text covered by the span
    pub text: String,
    /// Position of the first character of `text`
    pub position: SourcePosition,
}

impl SourceSpan {
    /// Create a new span
    pub fn new(text: impl Into<String>, position: SourcePosition) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }

    /// Line number the span starts on
    pub fn line(&self) -> u32 {
        self.position.line
    }
}
