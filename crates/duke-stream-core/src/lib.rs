//! # duke-stream-core
//!
//! Core data structures for the duke-stream spreadsheet writer.
//!
//! This crate provides the types shared by the writer and its package sinks:
//! - [`CellRange`] - Range addresses in A1 notation
//! - [`Style`] and [`StyleRegistry`] - Cell formatting and its deduplicated table
//! - [`Cell`], [`RowRecord`] - Cell content on its way to the sink
//! - [`CommentCollector`] - Per-sheet comment accumulation
//! - [`PackageSink`] - The trait implemented by package engines
//!
//! ## Example
//!
//! ```rust
//! use duke_stream_core::{CellRange, Style, StyleRegistry};
//!
//! let range: CellRange = "$A$1:C3".parse().unwrap();
//! assert_eq!(range.width(), 3);
//!
//! let mut styles = StyleRegistry::new();
//! let bold = styles.register(Style::new().bold(), Some("bold")).unwrap();
//! assert_eq!(bold.index(), 1);
//! ```

pub mod cell;
pub mod column;
pub mod comment;
pub mod error;
pub mod range;
pub mod shared_strings;
pub mod sink;
pub mod style;
pub mod validation;

pub use cell::{Cell, CellRecord, CellType, RowOptions, RowRecord, ERROR_LITERALS};
pub use column::ColumnSpec;
pub use comment::{CommentBatch, CommentCollector, CommentRecord};
pub use error::{Error, Result};
pub use range::{column_to_letters, letters_to_column, CellRange};
pub use shared_strings::SharedStringTable;
pub use sink::{
    ConditionalFormatRecord, DocumentParts, FreezePane, PackageSink, SheetFooter, SheetHeader,
    SheetState,
};
pub use validation::{
    Criterion, DataValidation, ListSource, ValidationErrorStyle, ValidationOperator,
    ValidationRule,
};

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, DifferentialStyleId, FillStyle,
    FontStyle, HorizontalAlignment, NumberFormat, PatternType, Protection, Style, StyleId,
    StyleRef, StyleRegistry, Stylesheet, VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (XFD)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
