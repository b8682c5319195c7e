//! Prelude module - common imports for duke-stream users
//!
//! ```rust
//! use duke_stream::prelude::*;
//! ```

pub use crate::{
    // Cells and ranges
    Cell,
    CellRange,
    CellType,
    // Styles
    Color,
    // Sheet layout
    ColumnDescriptor,
    ColumnSpec,
    // Metadata
    DataValidation,
    DifferentialStyleId,
    // Error types
    Error,
    FillStyle,
    FontStyle,
    FreezePane,
    MemorySink,
    NumberFormat,
    RecordLayout,
    Result,
    RowOptions,
    SheetOptions,
    SheetRecord,
    SheetState,
    // Writer
    StreamWriter,
    Style,
    StyleId,
    StyleRef,
    ValidationOperator,
    WriterOptions,
};

#[cfg(feature = "xlsx")]
pub use crate::{DocumentType, XlsxSink};
