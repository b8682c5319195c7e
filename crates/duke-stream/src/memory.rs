//! A sink that keeps everything in memory
//!
//! Useful for inspecting what a writer produces without building a package.

use duke_stream_core::{
    CellRecord, DocumentParts, Error, PackageSink, Result, RowRecord, SheetFooter, SheetHeader,
};

/// One sheet as received by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySheet {
    pub header: SheetHeader,
    pub rows: Vec<RowRecord>,
    /// `None` while the sheet is still open
    pub footer: Option<SheetFooter>,
}

impl MemorySheet {
    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn row(&self, number: u32) -> Option<&RowRecord> {
        self.rows.iter().find(|r| r.number == number)
    }

    /// The cell at 1-based `column` and `row`
    pub fn cell(&self, column: u32, row: u32) -> Option<&CellRecord> {
        self.row(row)?.cells.iter().find(|c| c.column == column)
    }
}

/// Everything a finished [`MemorySink`] received
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDocument {
    pub sheets: Vec<MemorySheet>,
    pub parts: DocumentParts,
}

impl MemoryDocument {
    pub fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|s| s.header.name == name)
    }

    /// Text of a shared-string cell, or the raw value of any other cell
    pub fn cell_text<'a>(&'a self, cell: &'a CellRecord) -> Option<&'a str> {
        match cell.cell_type {
            duke_stream_core::CellType::SharedString => {
                let index: usize = cell.raw_value.parse().ok()?;
                self.parts.shared_strings.get(index).map(String::as_str)
            }
            _ => Some(cell.raw_value.as_str()),
        }
    }
}

/// [`PackageSink`] collecting the write instructions into a [`MemoryDocument`]
#[derive(Debug, Default)]
pub struct MemorySink {
    sheets: Vec<MemorySheet>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }

    fn open_sheet(&mut self) -> Result<&mut MemorySheet> {
        self.sheets
            .last_mut()
            .filter(|s| s.footer.is_none())
            .ok_or(Error::NoOpenSheet)
    }
}

impl PackageSink for MemorySink {
    type Output = MemoryDocument;

    fn begin_sheet(&mut self, header: &SheetHeader) -> Result<()> {
        if let Ok(open) = self.open_sheet() {
            return Err(Error::SheetAlreadyOpen(open.header.name.clone()));
        }
        self.sheets.push(MemorySheet {
            header: header.clone(),
            rows: Vec::new(),
            footer: None,
        });
        Ok(())
    }

    fn write_row(&mut self, row: &RowRecord) -> Result<()> {
        self.open_sheet()?.rows.push(row.clone());
        Ok(())
    }

    fn end_sheet(&mut self, footer: &SheetFooter) -> Result<()> {
        self.open_sheet()?.footer = Some(footer.clone());
        Ok(())
    }

    fn finish(self, parts: DocumentParts) -> Result<MemoryDocument> {
        Ok(MemoryDocument {
            sheets: self.sheets,
            parts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_stream_core::{CellType, SheetState};

    fn header(name: &str) -> SheetHeader {
        SheetHeader {
            index: 0,
            name: name.into(),
            state: SheetState::Visible,
            columns: vec![],
            freeze: None,
        }
    }

    #[test]
    fn test_records_in_order() {
        let mut sink = MemorySink::new();
        sink.begin_sheet(&header("a")).unwrap();
        sink.write_row(&RowRecord {
            number: 2,
            cells: vec![CellRecord {
                column: 3,
                cell_type: CellType::Number,
                raw_value: "7".into(),
                style: None,
            }],
            ..RowRecord::default()
        })
        .unwrap();
        assert!(sink.begin_sheet(&header("b")).is_err());
        sink.end_sheet(&SheetFooter::default()).unwrap();
        assert!(sink.write_row(&RowRecord::default()).is_err());

        let document = sink.finish(DocumentParts::default()).unwrap();
        let sheet = document.sheet("a").unwrap();
        assert_eq!(sheet.cell(3, 2).unwrap().raw_value, "7");
        assert!(sheet.cell(1, 2).is_none());
        assert!(sheet.footer.is_some());
    }
}
