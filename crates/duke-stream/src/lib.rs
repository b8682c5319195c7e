//! # duke-stream
//!
//! Forward-only streaming writer for large spreadsheet documents.
//!
//! Rows are handed to a [`PackageSink`] as soon as they are complete, so a
//! document of any length is written with memory bounded by one row, the
//! current sheet's metadata, the style table and the shared-string table.
//!
//! ## Features
//!
//! - Strict document → sheet → row → cell ordering, checked on every call
//! - Deduplicated styles with named lookup and differential formats
//! - Autofilters, conditional formatting, merged cells, data validation and
//!   cell comments, flushed when their sheet closes
//! - Optional shared-string table for repeated text
//! - XLSX output through [`duke_stream_xlsx::XlsxSink`] (`xlsx` feature)
//!
//! ## Example
//!
//! ```rust
//! use duke_stream::prelude::*;
//!
//! # fn main() -> duke_stream::Result<()> {
//! let dir = tempfile::tempdir().unwrap();
//! let mut writer = StreamWriter::create_xlsx(dir.path().join("report.xlsx"), WriterOptions::default())?;
//!
//! let header = writer.styles_mut().register(Style::new().bold(), Some("header"))?;
//! writer.open_sheet(
//!     "Report",
//!     SheetOptions::new()
//!         .with_header_style(header)
//!         .with_freeze(FreezePane::rows(1)),
//! )?;
//! writer.write_row(["Region", "Sales"], CellType::Text)?;
//!
//! writer.begin_row()?;
//! writer.write_cell(Cell::text("North"))?;
//! writer.write_cell(Cell::number(1250.5))?;
//! writer.end_row()?;
//!
//! writer.add_autofilter(CellRange::parse("A1:B1")?, false)?;
//! writer.close_sheet()?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod options;
pub mod prelude;
pub mod record;
pub mod writer;

pub use memory::{MemoryDocument, MemorySheet, MemorySink};
pub use options::{SheetOptions, WriterOptions};
pub use record::{ColumnDescriptor, RecordLayout, SheetRecord};
pub use writer::{StreamWriter, WriterState};

// Re-export core types
pub use duke_stream_core::{
    column_to_letters, letters_to_column, Alignment, BorderEdge, BorderLineStyle, BorderStyle,
    Cell, CellRange, CellRecord, CellType, Color, ColumnSpec, CommentBatch, CommentCollector,
    CommentRecord, ConditionalFormatRecord, Criterion, DataValidation, DifferentialStyleId,
    DocumentParts, Error, FillStyle, FontStyle, FreezePane, HorizontalAlignment, ListSource,
    NumberFormat, PackageSink, PatternType, Protection, Result, RowOptions, RowRecord,
    SharedStringTable, SheetFooter, SheetHeader, SheetState, Style, StyleId, StyleRef,
    StyleRegistry, Stylesheet, ValidationErrorStyle, ValidationOperator, ValidationRule,
    VerticalAlignment, ERROR_LITERALS, MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN,
};

#[cfg(feature = "xlsx")]
pub use duke_stream_xlsx::{
    Compression, DocumentType, InvalidCharacters, XlsxError, XlsxOptions, XlsxSink,
};

#[cfg(feature = "xlsx")]
mod xlsx {
    use std::fs::File;
    use std::io::{BufWriter, Seek, Write};
    use std::path::Path;

    use crate::{DocumentType, Result, StreamWriter, WriterOptions, XlsxSink};

    impl StreamWriter<XlsxSink<BufWriter<File>>> {
        /// Create an XLSX package at `path`
        ///
        /// The package variant follows the extension (`xlsx`, `xlsm` or
        /// `xltx`); any other extension fails with
        /// [`Error::UnsupportedDocumentType`](crate::Error::UnsupportedDocumentType).
        pub fn create_xlsx<P: AsRef<Path>>(path: P, options: WriterOptions) -> Result<Self> {
            let sink = XlsxSink::create(path)?.with_options(options.xlsx_options());
            Ok(Self::with_options(sink, options))
        }
    }

    impl<W: Write + Seek> StreamWriter<XlsxSink<W>> {
        /// Write an XLSX package into any seekable writer
        pub fn new_xlsx(writer: W, document_type: DocumentType, options: WriterOptions) -> Self {
            let sink = XlsxSink::new(writer, document_type).with_options(options.xlsx_options());
            Self::with_options(sink, options)
        }
    }
}
