//! Error types for duke-stream-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a streamed document
///
/// Every variant except [`Error::Io`] and [`Error::Sink`] is a violated caller
/// contract. None of them are retried; callers should discard the document.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed range text
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Range has the wrong number of rows for the operation
    #[error("Range {range} must span {expected} row(s), but spans {actual}")]
    InvalidRangeHeight {
        range: String,
        expected: u32,
        actual: u32,
    },

    /// Range must address exactly one cell
    #[error("Range {0} must be a single cell")]
    NotSingleCell(String),

    /// Row number outside 1..=MAX_ROWS
    #[error("Row {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column number outside 1..=MAX_COLS
    #[error("Column {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// Raw cell value does not fit its declared type
    #[error("Invalid {cell_type} value: {value:?}")]
    InvalidCellValue {
        cell_type: &'static str,
        value: String,
    },

    /// No sheet is open
    #[error("No worksheet is open")]
    NoOpenSheet,

    /// Another sheet is still open
    #[error("Worksheet {0:?} is already open")]
    SheetAlreadyOpen(String),

    /// Sheet name already used in this document
    #[error("A worksheet named {0:?} already exists")]
    SheetWithSameNameAlreadyExists(String),

    /// Sheet name is blank
    #[error("Worksheet name cannot be empty")]
    SheetNameCannotBeEmpty,

    /// Sheet name violates the package naming rules
    #[error("Invalid worksheet name {0:?}")]
    InvalidSheetName(String),

    /// No row is open
    #[error("No row is open")]
    NoOpenRow,

    /// A row is still open and must be ended first
    #[error("Row {0} must be ended first")]
    RowNotEnded(u32),

    /// Rows or cells written behind what has already been streamed
    #[error("Out of order writing: {what} {requested} requested after {last}")]
    OutOfOrderWriting {
        what: &'static str,
        requested: u32,
        last: u32,
    },

    /// An autofilter is already registered for the sheet
    #[error("Worksheet already has an autofilter")]
    SheetAlreadyHasFilter,

    /// The cell already carries a comment
    #[error("Cell {0} already has a comment")]
    DuplicateComment(String),

    /// Document finished while a sheet is open
    #[error("Worksheet {0:?} must be closed first")]
    SheetStillOpen(String),

    /// Document finished without any sheet
    #[error("The document contains no worksheets")]
    NoSheets,

    /// Operation after the document was finished
    #[error("The document has already been finished")]
    Finished,

    /// A previous sink failure left the output unusable
    #[error("The writer is unusable after a previous failure")]
    Poisoned,

    /// Data validation cannot be written as given
    #[error("Invalid data validation: {0}")]
    InvalidValidation(String),

    /// Blank style name
    #[error("Style name must be provided")]
    StyleNameMustBeProvided,

    /// Style name unknown to the registry
    #[error("Style not found: {0:?}")]
    StyleNameNotFound(String),

    /// Style name registered twice for the same kind
    #[error("Style name already registered: {0:?}")]
    DuplicateStyleName(String),

    /// Style index not issued by the registry
    #[error("Unknown style index: {0}")]
    UnknownStyleIndex(u32),

    /// The style list was already consumed by the sink
    #[error("The style list is no longer available for registration")]
    StyleListNotAvailable,

    /// Package variant not supported by the sink
    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// IO error while writing to the sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the package sink
    #[error("Sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary sink failure
    pub fn sink<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Sink(Box::new(err))
    }

    /// Whether the error came from the output side rather than from a caller
    /// contract violation
    pub fn is_output_failure(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Sink(_))
    }
}
