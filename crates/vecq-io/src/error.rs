use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed content; the message quotes the raw input.
    #[error("data error: {0}")]
    Data(String),

    #[error(transparent)]
    Core(#[from] vecq_core::Error),

    #[error(transparent)]
    Function(#[from] vecq_functions::FunctionError),
}
