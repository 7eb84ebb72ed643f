//! Core types shared by every compiler component.
//!
//! This crate provides source location tracking, the static types of the
//! language, and the structured diagnostic stream the compiler stages report
//! into.
//!
//! # Overview
//!
//! - [`SourcePosition`] - Line/column/offset of a character
//! - [`SourceSpan`] - Text plus the position it starts at
//! - [`Type`] - `int`, `string` and `boolean`
//! - [`Diagnostic`] - One event with a [`Severity`] and originating [`Stage`]
//! - [`DiagnosticLog`] - Ordered events plus the per-unit error counter
//!
//! # Examples
//!
//! ```
//! use core_types::{DiagnosticLog, SourcePosition, SourceSpan, Stage};
//!
//! let mut log = DiagnosticLog::new();
//! let span = SourceSpan::new("#", SourcePosition::new(1, 4, 3));
//! log.error(Stage::Lexer, "invalid character '#'", Some(span));
//!
//! assert!(log.has_errors());
//! assert_eq!(log.diagnostics()[0].line(), Some(1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod diagnostic;
mod source;
mod types;

pub use diagnostic::{Diagnostic, DiagnosticLog, Severity, Stage};
pub use source::{SourcePosition, SourceSpan};
pub use types::Type;
