//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while writing a package
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Text contains a character that XML 1.0 cannot carry
    #[error("Invalid character U+{code:04X} in {context}")]
    InvalidCharacter { code: u32, context: String },

    /// Sink used out of sequence
    #[error("Invalid sink state: {0}")]
    InvalidState(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] duke_stream_core::Error),
}

impl From<XlsxError> for duke_stream_core::Error {
    fn from(err: XlsxError) -> Self {
        match err {
            XlsxError::Core(inner) => inner,
            XlsxError::Io(io) => duke_stream_core::Error::Io(io),
            other => duke_stream_core::Error::sink(other),
        }
    }
}
