//! Static types of the language.

use serde::Serialize;
use std::fmt;

/// The three value types a variable can be declared with.
///
/// # Examples
///
/// ```
/// use core_types::Type;
///
/// assert_eq!(Type::Int.to_string(), "int");
/// assert_eq!(Type::String.storage_width(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// Single-digit integers and their sums
    Int,
    /// String literals
    String,
    /// `true` / `false` and comparison results
    Boolean,
}

impl Type {
    /// Number of bytes a variable of this type occupies in static storage
    pub fn storage_width(&self) -> usize {
        match self {
            Type::Int | Type::Boolean => 1,
            Type::String => 2,
        }
    }

    /// Source keyword for the type
    pub fn keyword(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::String => "string",
            Type::Boolean => "boolean",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
