use thiserror::Error;

/// Result type local to vecq-functions.
pub type Result<T> = std::result::Result<T, FunctionError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunctionError {
    /// Wrong argument count or shape (odd key/value count, non-literal key, ...).
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Integer overflow or division by zero.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// Mode or operation the function does not define (e.g. DISTINCT sum).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Malformed input content; the message quotes the raw input.
    #[error("data error: {0}")]
    Data(String),

    #[error("type error: {0}")]
    Type(String),

    #[error(transparent)]
    Core(#[from] vecq_core::Error),
}
