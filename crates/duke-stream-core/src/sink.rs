//! The boundary between the write state machine and a package engine
//!
//! A [`PackageSink`] receives the document as an ordered stream of
//! instructions: for every sheet one [`SheetHeader`], its rows in increasing
//! order, one [`SheetFooter`], and finally the [`DocumentParts`] that can only
//! be known once every sheet has been written.

use crate::cell::RowRecord;
use crate::column::ColumnSpec;
use crate::comment::CommentBatch;
use crate::error::Result;
use crate::range::CellRange;
use crate::style::{DifferentialStyleId, Stylesheet};
use crate::validation::DataValidation;

/// Visibility of a sheet in the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetState {
    #[default]
    Visible,
    /// Hidden, but can be unhidden from the UI
    Hidden,
    /// Only unhidden programmatically
    VeryHidden,
}

impl SheetState {
    /// Value of the `state` attribute, `None` for visible sheets
    pub fn xml_value(self) -> Option<&'static str> {
        match self {
            SheetState::Visible => None,
            SheetState::Hidden => Some("hidden"),
            SheetState::VeryHidden => Some("veryHidden"),
        }
    }
}

/// Frozen panes: the number of rows and columns that stay in view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreezePane {
    pub rows: u32,
    pub columns: u32,
}

impl FreezePane {
    pub fn rows(rows: u32) -> Self {
        Self { rows, columns: 0 }
    }

    pub fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 && self.columns == 0
    }
}

/// Everything a sink needs before the first row of a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetHeader {
    /// 0-based position of the sheet in the document
    pub index: usize,
    pub name: String,
    pub state: SheetState,
    pub columns: Vec<ColumnSpec>,
    pub freeze: Option<FreezePane>,
}

/// A conditional format rule driven by a formula
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalFormatRecord {
    pub range: CellRange,
    /// Formula without the leading `=`
    pub formula: String,
    pub format: DifferentialStyleId,
}

/// Sheet metadata flushed after the last row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetFooter {
    /// Canonical filter range, without sheet qualifier
    pub autofilter: Option<String>,
    pub conditional_formats: Vec<ConditionalFormatRecord>,
    pub merged_cells: Vec<CellRange>,
    pub validations: Vec<DataValidation>,
    pub comments: Option<CommentBatch>,
}

impl SheetFooter {
    pub fn is_empty(&self) -> bool {
        self.autofilter.is_none()
            && self.conditional_formats.is_empty()
            && self.merged_cells.is_empty()
            && self.validations.is_empty()
            && self.comments.is_none()
    }
}

/// Document-wide parts known only at the end
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentParts {
    pub stylesheet: Stylesheet,
    /// Distinct shared strings in index order
    pub shared_strings: Vec<String>,
    /// Total shared-string references across all sheets
    pub shared_string_references: u64,
}

/// Receiver of the ordered write instructions
///
/// Calls always arrive in the order `begin_sheet`, `write_row`*,
/// `end_sheet`, repeated per sheet, then `finish` exactly once. Row numbers
/// strictly increase within a sheet and cells within a row strictly increase
/// by column. Any error returned is treated as fatal by the writer.
pub trait PackageSink {
    /// What the sink produces once the document is complete
    type Output;

    fn begin_sheet(&mut self, header: &SheetHeader) -> Result<()>;

    fn write_row(&mut self, row: &RowRecord) -> Result<()>;

    fn end_sheet(&mut self, footer: &SheetFooter) -> Result<()>;

    fn finish(self, parts: DocumentParts) -> Result<Self::Output>;
}
