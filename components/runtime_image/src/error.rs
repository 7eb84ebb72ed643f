//! Runtime image error types

use thiserror::Error;

/// Failures of runtime image, temp table and jump table operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// A write or allocation needed more than the fixed image holds
    #[error("runtime image overflow: {0}")]
    Overflow(String),

    /// An address string was not two hex digits
    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    /// A backpatch named a symbol no table knows about
    #[error("unknown symbolic address '{0}'")]
    UnknownSymbol(String),
}

/// Result type for runtime image operations
pub type ImageResult<T> = Result<T, ImageError>;
