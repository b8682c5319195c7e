//! Writing typed records as rows
//!
//! A record type describes its columns once through [`SheetRecord`]. The
//! description is resolved against the writer's style registry into a
//! [`RecordLayout`], which then turns each record into a row without any
//! further lookups.
//!
//! # Example
//!
//! ```rust
//! use duke_stream::{
//!     CellType, ColumnDescriptor, MemorySink, SheetOptions, SheetRecord, StreamWriter, Style,
//! };
//!
//! struct Order {
//!     id: u32,
//!     customer: String,
//!     total: f64,
//! }
//!
//! impl SheetRecord for Order {
//!     fn columns() -> Vec<ColumnDescriptor> {
//!         vec![
//!             ColumnDescriptor::new("Id", CellType::Number),
//!             ColumnDescriptor::new("Customer", CellType::Text).with_width(30.0),
//!             ColumnDescriptor::new("Total", CellType::Number).with_style("money"),
//!         ]
//!     }
//!
//!     fn values(&self) -> Vec<Option<String>> {
//!         vec![
//!             Some(self.id.to_string()),
//!             Some(self.customer.clone()),
//!             Some(self.total.to_string()),
//!         ]
//!     }
//! }
//!
//! let mut writer = StreamWriter::new(MemorySink::new());
//! writer
//!     .styles_mut()
//!     .register(Style::new().number_format("#,##0.00"), Some("money"))
//!     .unwrap();
//!
//! let layout = writer.record_layout::<Order>().unwrap();
//! writer.open_record_sheet("Orders", &layout, SheetOptions::default()).unwrap();
//! writer
//!     .write_record(&layout, &Order { id: 1, customer: "Ada".into(), total: 12.5 })
//!     .unwrap();
//! writer.close_sheet().unwrap();
//!
//! let document = writer.finish().unwrap();
//! assert_eq!(document.sheets[0].rows.len(), 2);
//! ```

use crate::options::SheetOptions;
use crate::writer::StreamWriter;
use duke_stream_core::{
    Cell, CellType, ColumnSpec, PackageSink, Result, StyleId, StyleRef, StyleRegistry,
};

/// One column of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Text of the header cell
    pub header: String,
    pub cell_type: CellType,
    /// Width in characters
    pub width: Option<f64>,
    /// Style of the column's value cells
    pub style: Option<StyleRef>,
}

impl ColumnDescriptor {
    pub fn new(header: impl Into<String>, cell_type: CellType) -> Self {
        Self {
            header: header.into(),
            cell_type,
            width: None,
            style: None,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_style(mut self, style: impl Into<StyleRef>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// A type whose values can be written one per row
pub trait SheetRecord {
    /// Column descriptions, in column order
    fn columns() -> Vec<ColumnDescriptor>;

    /// Raw values in the same order as [`columns`](Self::columns); `None`
    /// leaves the cell empty
    fn values(&self) -> Vec<Option<String>>;
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedColumn {
    header: String,
    cell_type: CellType,
    width: Option<f64>,
    style: Option<StyleId>,
}

/// Column descriptors with their style references resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RecordLayout {
    columns: Vec<ResolvedColumn>,
}

impl RecordLayout {
    /// Resolve the descriptors of `R`
    pub fn resolve<R: SheetRecord>(registry: &StyleRegistry) -> Result<Self> {
        Self::from_columns(R::columns(), registry)
    }

    /// Resolve an explicit descriptor list
    ///
    /// Fails when a style name or index is unknown to `registry`.
    pub fn from_columns(columns: Vec<ColumnDescriptor>, registry: &StyleRegistry) -> Result<Self> {
        let columns = columns
            .into_iter()
            .map(|c| {
                let style = c
                    .style
                    .as_ref()
                    .map(|s| registry.resolve_ref(s))
                    .transpose()?;
                Ok(ResolvedColumn {
                    header: c.header,
                    cell_type: c.cell_type,
                    width: c.width,
                    style,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    /// Column settings carrying each column's width
    pub fn column_specs(&self) -> Vec<ColumnSpec> {
        self.columns
            .iter()
            .map(|c| match c.width {
                Some(width) => ColumnSpec::width(width),
                None => ColumnSpec::new(),
            })
            .collect()
    }

    /// Header row cells, as text
    pub fn header_cells(&self) -> Vec<Cell> {
        self.columns.iter().map(|c| Cell::text(c.header.clone())).collect()
    }

    /// Cells for one record, placed in their column
    ///
    /// Values beyond the described columns are ignored.
    pub fn cells<R: SheetRecord>(&self, record: &R) -> Vec<Cell> {
        self.columns
            .iter()
            .zip(record.values())
            .enumerate()
            .filter_map(|(i, (column, value))| {
                let mut cell = Cell::new(value?, column.cell_type).at_column(i as u32 + 1);
                cell.style = column.style;
                Some(cell)
            })
            .collect()
    }
}

impl<S: PackageSink> StreamWriter<S> {
    /// Resolve the layout of `R` against this writer's styles
    pub fn record_layout<R: SheetRecord>(&self) -> Result<RecordLayout> {
        RecordLayout::resolve::<R>(self.styles())
    }

    /// Open a sheet laid out for records and write the header row
    ///
    /// Column widths come from the layout unless `options` already has
    /// columns.
    pub fn open_record_sheet(
        &mut self,
        name: &str,
        layout: &RecordLayout,
        mut options: SheetOptions,
    ) -> Result<()> {
        if options.columns.is_empty() {
            options.columns = layout.column_specs();
        }
        self.open_sheet(name, options)?;
        self.begin_row()?;
        self.write_cells(layout.header_cells())?;
        self.end_row()
    }

    /// Write one record as the next row and return its number
    pub fn write_record<R: SheetRecord>(&mut self, layout: &RecordLayout, record: &R) -> Result<u32> {
        let number = self.begin_row()?;
        self.write_cells(layout.cells(record))?;
        self.end_row()?;
        Ok(number)
    }
}
