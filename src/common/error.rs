use rust_tokenizers::error::TokenizerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LTPError {
    #[error("Endpoint not available error: {0}")]
    FileDownloadError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Tokenizer error: {0}")]
    TokenizerError(String),

    #[error("ONNX Runtime error: {0}")]
    OrtError(String),

    #[error("Array shape error: {0}")]
    ShapeError(String),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Invalid configuration error: {0}")]
    InvalidConfigurationError(String),

    #[error("Model output error: {0}")]
    ModelOutputError(String),

    #[error("Value error: {0}")]
    ValueError(String),
}

#[cfg(feature = "remote")]
impl From<cached_path::Error> for LTPError {
    fn from(error: cached_path::Error) -> Self {
        LTPError::FileDownloadError(error.to_string())
    }
}

impl From<std::io::Error> for LTPError {
    fn from(error: std::io::Error) -> Self {
        LTPError::IOError(error.to_string())
    }
}

impl From<serde_json::Error> for LTPError {
    fn from(error: serde_json::Error) -> Self {
        LTPError::InvalidConfigurationError(error.to_string())
    }
}

impl From<TokenizerError> for LTPError {
    fn from(error: TokenizerError) -> Self {
        LTPError::TokenizerError(error.to_string())
    }
}

impl From<ort::Error> for LTPError {
    fn from(error: ort::Error) -> Self {
        LTPError::OrtError(error.to_string())
    }
}

impl From<ndarray::ShapeError> for LTPError {
    fn from(error: ndarray::ShapeError) -> Self {
        LTPError::ShapeError(error.to_string())
    }
}

impl From<arrow::error::ArrowError> for LTPError {
    fn from(error: arrow::error::ArrowError) -> Self {
        LTPError::ArrowError(error.to_string())
    }
}

/// Maps the error of an `ort` session builder step, whatever its recoverable payload.
pub(crate) fn ort_builder_error<E: std::fmt::Display>(error: E) -> LTPError {
    LTPError::OrtError(error.to_string())
}
