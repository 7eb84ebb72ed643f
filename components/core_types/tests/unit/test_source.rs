//! Unit tests for SourcePosition, SourceSpan and Type

use core_types::{SourcePosition, SourceSpan, Type};

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_start_is_line_one_column_one() {
        let pos = SourcePosition::start();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_positions_order_by_line_then_column() {
        let earlier = SourcePosition::new(1, 9, 8);
        let later = SourcePosition::new(2, 1, 10);
        assert!(earlier < later);
    }
}

#[cfg(test)]
mod source_span_tests {
    use super::*;

    #[test]
    fn test_span_keeps_text_and_position() {
        let span = SourceSpan::new("while", SourcePosition::new(3, 2, 17));
        assert_eq!(span.text, "while");
        assert_eq!(span.position.column, 2);
        assert_eq!(span.line(), 3);
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_type_keywords() {
        assert_eq!(Type::Int.keyword(), "int");
        assert_eq!(Type::String.keyword(), "string");
        assert_eq!(Type::Boolean.keyword(), "boolean");
    }

    #[test]
    fn test_types_are_distinct() {
        assert_ne!(Type::Int, Type::Boolean);
        assert_ne!(Type::String, Type::Int);
    }
}
