//! The forward-only write state machine
//!
//! A [`StreamWriter`] walks document → sheet → row → cell exactly once.
//! Every call is checked against the current state before anything reaches
//! the sink, so an illegal call fails without side effects. Rows are handed
//! to the sink as soon as they end; sheet metadata (filters, merges,
//! conditional formats, validations, comments) is buffered until the sheet
//! closes.

use ahash::AHashSet;

use crate::options::{SheetOptions, WriterOptions};
use duke_stream_core::{
    Cell, CellRange, CellRecord, CellType, CommentCollector, ConditionalFormatRecord,
    DataValidation, DifferentialStyleId, DocumentParts, Error, PackageSink, Result, RowOptions,
    RowRecord, SharedStringTable, SheetFooter, SheetHeader, StyleId, StyleRegistry, MAX_COLS,
    MAX_ROWS, MAX_SHEET_NAME_LEN,
};

/// Characters a sheet name may not contain
const INVALID_SHEET_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Where the writer is in the document lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Between sheets (or before the first one)
    NoSheet,
    SheetOpen,
    RowOpen,
    /// `finish` completed; nothing more can be written
    Finished,
    /// The sink failed; nothing more can be written
    Poisoned,
}

struct OpenRow {
    record: RowRecord,
    /// Column of the last cell written or skipped, 0 before the first
    last_column: u32,
    /// Style for cells that carry none
    cell_style: Option<StyleId>,
}

struct OpenSheet {
    name: String,
    header_style: Option<StyleId>,
    /// Highest row number opened or skipped so far
    watermark: u32,
    rows_written: u32,
    row: Option<OpenRow>,
    autofilter: Option<CellRange>,
    conditional_formats: Vec<ConditionalFormatRecord>,
    merged_cells: Vec<CellRange>,
    validations: Vec<DataValidation>,
    comments: CommentCollector,
}

impl OpenSheet {
    fn new(name: String, header_style: Option<StyleId>) -> Self {
        Self {
            name,
            header_style,
            watermark: 0,
            rows_written: 0,
            row: None,
            autofilter: None,
            conditional_formats: Vec::new(),
            merged_cells: Vec::new(),
            validations: Vec::new(),
            comments: CommentCollector::new(),
        }
    }

    fn ensure_no_row(&self) -> Result<()> {
        match &self.row {
            Some(row) => Err(Error::RowNotEnded(row.record.number)),
            None => Ok(()),
        }
    }

    fn into_footer(self) -> SheetFooter {
        SheetFooter {
            autofilter: self.autofilter.map(|range| range.to_string()),
            conditional_formats: self.conditional_formats,
            merged_cells: self.merged_cells,
            validations: self.validations,
            comments: self.comments.into_batch(),
        }
    }
}

/// Streaming spreadsheet writer over a [`PackageSink`]
///
/// # Example
///
/// ```rust
/// use duke_stream::{CellType, MemorySink, SheetOptions, StreamWriter};
///
/// let mut writer = StreamWriter::new(MemorySink::new());
/// writer.open_sheet("first", SheetOptions::default()).unwrap();
/// writer.write_row(["a", "b", "c"], CellType::Text).unwrap();
/// writer.write_row(["1", "2", "30", "40"], CellType::Number).unwrap();
/// writer.write_row(["SUM(A2:D2)"], CellType::Formula).unwrap();
/// writer.close_sheet().unwrap();
///
/// let document = writer.finish().unwrap();
/// assert_eq!(document.sheets[0].rows.len(), 3);
/// ```
pub struct StreamWriter<S: PackageSink> {
    sink: Option<S>,
    options: WriterOptions,
    styles: StyleRegistry,
    shared_strings: SharedStringTable,
    /// Lower-cased names of every sheet opened so far
    sheet_names: AHashSet<String>,
    sheet_count: usize,
    sheet: Option<OpenSheet>,
    poisoned: bool,
}

impl<S: PackageSink> StreamWriter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, WriterOptions::default())
    }

    pub fn with_options(sink: S, options: WriterOptions) -> Self {
        Self {
            sink: Some(sink),
            options,
            styles: StyleRegistry::new(),
            shared_strings: SharedStringTable::new(),
            sheet_names: AHashSet::new(),
            sheet_count: 0,
            sheet: None,
            poisoned: false,
        }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// The document's style registry
    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Register styles here before writing the cells that use them
    pub fn styles_mut(&mut self) -> &mut StyleRegistry {
        &mut self.styles
    }

    pub fn shared_strings(&self) -> &SharedStringTable {
        &self.shared_strings
    }

    pub fn state(&self) -> WriterState {
        if self.poisoned {
            WriterState::Poisoned
        } else if self.sink.is_none() {
            WriterState::Finished
        } else {
            match &self.sheet {
                None => WriterState::NoSheet,
                Some(sheet) if sheet.row.is_some() => WriterState::RowOpen,
                Some(_) => WriterState::SheetOpen,
            }
        }
    }

    /// Number of sheets opened so far, including the open one
    pub fn sheet_count(&self) -> usize {
        self.sheet_count
    }

    /// Name of the open sheet
    pub fn current_sheet(&self) -> Option<&str> {
        self.sheet.as_ref().map(|s| s.name.as_str())
    }

    /// Number of the open row
    pub fn current_row(&self) -> Option<u32> {
        self.sheet
            .as_ref()
            .and_then(|s| s.row.as_ref())
            .map(|r| r.record.number)
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.poisoned {
            return Err(Error::Poisoned);
        }
        if self.sink.is_none() {
            return Err(Error::Finished);
        }
        Ok(())
    }

    fn open_sheet_mut(&mut self) -> Result<&mut OpenSheet> {
        self.ensure_usable()?;
        self.sheet.as_mut().ok_or(Error::NoOpenSheet)
    }

    fn open_row_mut(&mut self) -> Result<&mut OpenRow> {
        self.ensure_usable()?;
        self.sheet
            .as_mut()
            .and_then(|s| s.row.as_mut())
            .ok_or(Error::NoOpenRow)
    }

    // ===== Sheets =====

    /// Open a new sheet
    ///
    /// Names must be unique within the document (ignoring case), at most 31
    /// characters and not start or end with `'`. They may not contain
    /// `: \ / ? * [ ]` or control characters.
    pub fn open_sheet(&mut self, name: &str, options: SheetOptions) -> Result<()> {
        self.ensure_usable()?;
        if let Some(open) = &self.sheet {
            return Err(Error::SheetAlreadyOpen(open.name.clone()));
        }
        validate_sheet_name(name)?;
        let key = name.to_lowercase();
        if self.sheet_names.contains(&key) {
            return Err(Error::SheetWithSameNameAlreadyExists(name.to_string()));
        }

        let header = SheetHeader {
            index: self.sheet_count,
            name: name.to_string(),
            state: options.state,
            columns: options.columns,
            freeze: options.freeze,
        };
        let result = match self.sink.as_mut() {
            Some(sink) => sink.begin_sheet(&header),
            None => Err(Error::Finished),
        };
        poison_on_error(&mut self.poisoned, result)?;

        log::debug!("opened sheet {} ({:?})", header.index + 1, name);
        self.sheet_names.insert(key);
        self.sheet_count += 1;
        self.sheet = Some(OpenSheet::new(header.name, options.header_style));
        Ok(())
    }

    /// Close the open sheet, flushing its buffered metadata
    ///
    /// An open row is an error; end it first.
    pub fn close_sheet(&mut self) -> Result<()> {
        self.open_sheet_mut()?.ensure_no_row()?;
        let sheet = self.sheet.take().ok_or(Error::NoOpenSheet)?;
        let name = sheet.name.clone();
        let rows = sheet.rows_written;
        let footer = sheet.into_footer();

        let result = match self.sink.as_mut() {
            Some(sink) => sink.end_sheet(&footer),
            None => Err(Error::Finished),
        };
        poison_on_error(&mut self.poisoned, result)?;

        log::debug!("closed sheet {:?} after {} row(s)", name, rows);
        Ok(())
    }

    // ===== Rows =====

    /// Open the row after the last one
    pub fn begin_row(&mut self) -> Result<u32> {
        self.begin_row_with(RowOptions::new())
    }

    /// Open row `number` (1-based); rows in between stay empty
    pub fn begin_row_at(&mut self, number: u32) -> Result<u32> {
        self.begin_row_with(RowOptions::new().at(number))
    }

    /// Open a row with explicit settings and return its number
    pub fn begin_row_with(&mut self, options: RowOptions) -> Result<u32> {
        let sheet = self.open_sheet_mut()?;
        sheet.ensure_no_row()?;

        let number = options.number.unwrap_or(sheet.watermark + 1);
        if number <= sheet.watermark {
            return Err(Error::OutOfOrderWriting {
                what: "row",
                requested: number,
                last: sheet.watermark,
            });
        }
        if number > MAX_ROWS {
            return Err(Error::RowOutOfBounds(number, MAX_ROWS));
        }

        let first_row = sheet.rows_written == 0;
        let cell_style = options
            .style
            .or(if first_row { sheet.header_style } else { None });
        sheet.watermark = number;
        sheet.row = Some(OpenRow {
            record: RowRecord {
                number,
                hidden: options.hidden,
                height: options.height,
                style: options.style,
                cells: Vec::new(),
            },
            last_column: 0,
            cell_style,
        });
        Ok(number)
    }

    /// End the open row and hand it to the sink
    pub fn end_row(&mut self) -> Result<()> {
        self.ensure_usable()?;
        let sheet = self.sheet.as_mut().ok_or(Error::NoOpenRow)?;
        let row = sheet.row.take().ok_or(Error::NoOpenRow)?;

        let result = match self.sink.as_mut() {
            Some(sink) => sink.write_row(&row.record),
            None => Err(Error::Finished),
        };
        poison_on_error(&mut self.poisoned, result)?;

        sheet.rows_written += 1;
        log::trace!(
            "flushed row {} with {} cell(s)",
            row.record.number,
            row.record.cells.len()
        );
        Ok(())
    }

    /// Leave `count` rows empty; only while no row is open
    pub fn skip_rows(&mut self, count: u32) -> Result<()> {
        let sheet = self.open_sheet_mut()?;
        sheet.ensure_no_row()?;
        let target = sheet.watermark.saturating_add(count);
        if target > MAX_ROWS {
            return Err(Error::RowOutOfBounds(target, MAX_ROWS));
        }
        sheet.watermark = target;
        Ok(())
    }

    /// Write one row of values of the same type
    ///
    /// Same as [`begin_row`](Self::begin_row), one
    /// [`write_cell`](Self::write_cell) per value and
    /// [`end_row`](Self::end_row). A failing value leaves the row open.
    pub fn write_row<I, V>(&mut self, values: I, cell_type: CellType) -> Result<u32>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let number = self.begin_row()?;
        for value in values {
            self.write_cell(Cell::new(value, cell_type))?;
        }
        self.end_row()?;
        Ok(number)
    }

    // ===== Cells =====

    /// Write a cell into the open row
    ///
    /// Without an explicit column the cell lands right after the previous
    /// one. The style falls back to the row style, then to the sheet's
    /// header style on its first row. Style indices are not checked against
    /// the registry.
    pub fn write_cell(&mut self, cell: Cell) -> Result<()> {
        self.ensure_usable()?;
        let row = self
            .sheet
            .as_mut()
            .and_then(|s| s.row.as_mut())
            .ok_or(Error::NoOpenRow)?;

        let column = match cell.column {
            Some(column) if column <= row.last_column => {
                return Err(Error::OutOfOrderWriting {
                    what: "column",
                    requested: column,
                    last: row.last_column,
                });
            }
            Some(column) => column,
            None => row.last_column + 1,
        };
        if column > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(column, MAX_COLS));
        }
        let value = cell.canonical_value()?;

        let (cell_type, raw_value) = match cell.cell_type {
            CellType::Text if !self.options.shared_strings => (CellType::Text, value),
            CellType::Text | CellType::SharedString => (
                CellType::SharedString,
                self.shared_strings.intern(&value).to_string(),
            ),
            other => (other, value),
        };
        row.last_column = column;
        row.record.cells.push(CellRecord {
            column,
            cell_type,
            raw_value,
            style: cell.style.or(row.cell_style),
        });
        Ok(())
    }

    /// Write several prepared cells into the open row
    pub fn write_cells<I>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = Cell>,
    {
        for cell in cells {
            self.write_cell(cell)?;
        }
        Ok(())
    }

    /// Leave `count` cells of the open row empty
    pub fn skip_columns(&mut self, count: u32) -> Result<()> {
        let row = self.open_row_mut()?;
        let target = row.last_column.saturating_add(count);
        if target > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(target, MAX_COLS));
        }
        row.last_column = target;
        Ok(())
    }

    // ===== Sheet metadata =====

    /// Register the sheet's autofilter over a one-row header range
    pub fn add_autofilter(&mut self, range: CellRange, overwrite: bool) -> Result<()> {
        let sheet = self.open_sheet_mut()?;
        if sheet.autofilter.is_some() && !overwrite {
            return Err(Error::SheetAlreadyHasFilter);
        }
        if range.height() != 1 {
            return Err(Error::InvalidRangeHeight {
                range: range.to_string(),
                expected: 1,
                actual: range.height(),
            });
        }
        sheet.autofilter = Some(range.without_sheet());
        Ok(())
    }

    /// Format `range` with a differential style wherever `formula` is true
    ///
    /// Rules are written in the order they were added.
    pub fn add_conditional_formatting_formula(
        &mut self,
        range: CellRange,
        formula: &str,
        format: DifferentialStyleId,
    ) -> Result<()> {
        self.ensure_usable()?;
        let sheet = self.sheet.as_mut().ok_or(Error::NoOpenSheet)?;
        if self.styles.get_differential(format).is_none() {
            return Err(Error::UnknownStyleIndex(format.index()));
        }

        let expression = formula.trim();
        let expression = expression.strip_prefix('=').unwrap_or(expression);
        if expression.is_empty() {
            return Err(Error::InvalidCellValue {
                cell_type: CellType::Formula.name(),
                value: formula.to_string(),
            });
        }

        sheet.conditional_formats.push(ConditionalFormatRecord {
            range: range.without_sheet(),
            formula: expression.to_string(),
            format,
        });
        Ok(())
    }

    /// Merge the cells of `range`; it must span more than one cell
    pub fn merge_cells(&mut self, range: CellRange) -> Result<()> {
        let sheet = self.open_sheet_mut()?;
        if range.is_single_cell() {
            return Err(Error::InvalidRange(range.to_string()));
        }
        sheet.merged_cells.push(range.without_sheet());
        Ok(())
    }

    pub fn add_data_validation(&mut self, validation: DataValidation) -> Result<()> {
        let sheet = self.open_sheet_mut()?;
        validation.check()?;
        sheet.validations.push(validation);
        Ok(())
    }

    /// Attach a comment to a single cell of the open sheet
    pub fn add_comment(
        &mut self,
        range: CellRange,
        text: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<()> {
        self.open_sheet_mut()?.comments.add(range, text, author)
    }

    // ===== Document =====

    /// Finalize the style registry and complete the document
    ///
    /// Fails without side effects while a sheet is open or when no sheet was
    /// written. Once it succeeds (or the sink fails) the writer accepts no
    /// further calls.
    pub fn finish(&mut self) -> Result<S::Output> {
        self.ensure_usable()?;
        if let Some(open) = &self.sheet {
            return Err(Error::SheetStillOpen(open.name.clone()));
        }
        if self.sheet_count == 0 {
            return Err(Error::NoSheets);
        }
        let sink = self.sink.take().ok_or(Error::Finished)?;

        let parts = DocumentParts {
            stylesheet: self.styles.finalize(),
            shared_strings: self.shared_strings.strings().to_vec(),
            shared_string_references: self.shared_strings.reference_count(),
        };
        log::debug!(
            "finishing document: {} sheet(s), {} style(s), {} shared string(s)",
            self.sheet_count,
            parts.stylesheet.cell_styles.len(),
            parts.shared_strings.len()
        );
        poison_on_error(&mut self.poisoned, sink.finish(parts))
    }
}

fn poison_on_error<T>(poisoned: &mut bool, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        log::warn!("sink failed, writer is no longer usable: {}", err);
        *poisoned = true;
    }
    result
}

fn validate_sheet_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::SheetNameCannotBeEmpty);
    }
    if name.chars().count() > MAX_SHEET_NAME_LEN
        || name.contains(&INVALID_SHEET_NAME_CHARS[..])
        || name.chars().any(|c| c.is_control() || matches!(c, '\u{FFFE}' | '\u{FFFF}'))
        || name.starts_with('\'')
        || name.ends_with('\'')
    {
        return Err(Error::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_rules() {
        assert!(validate_sheet_name("Sales 2024").is_ok());
        assert!(validate_sheet_name(&"x".repeat(31)).is_ok());
        assert!(matches!(validate_sheet_name("  "), Err(Error::SheetNameCannotBeEmpty)));
        assert!(matches!(validate_sheet_name(&"x".repeat(32)), Err(Error::InvalidSheetName(_))));
        for bad in [
            "a:b", "a/b", "a\\b", "a?", "a*", "[a]", "'quoted'", "end'", "bad\u{1}name", "tab\there",
            "del\u{7f}", "nc\u{FFFE}",
        ] {
            assert!(
                matches!(validate_sheet_name(bad), Err(Error::InvalidSheetName(_))),
                "{bad} should be rejected"
            );
        }
    }
}
