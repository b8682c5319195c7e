//! Forward-only XLSX sink
//!
//! Worksheet XML is streamed straight into its ZIP entry as rows arrive, so
//! memory use does not grow with the number of rows. Parts that depend on the
//! whole document (styles, shared strings, workbook, content types) are
//! written when the document finishes.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::comments::{comments_xml, shape_blocks, vml_drawing};
use crate::error::{XlsxError, XlsxResult};
use crate::package::{self, SheetEntry};
use crate::sheet::{sheet_epilogue, sheet_prelude, write_row};
use crate::styles::XlsxStyleTable;
use crate::xml::{sanitize, InvalidCharacters};
use duke_stream_core::{
    CellRange, DocumentParts, PackageSink, RowRecord, SheetFooter, SheetHeader, Style,
};

/// Package variant, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentType {
    /// `.xlsx`
    #[default]
    Workbook,
    /// `.xlsm`
    MacroEnabledWorkbook,
    /// `.xltx`
    Template,
}

impl DocumentType {
    /// Pick the variant for a file extension (case-insensitive, without dot)
    pub fn from_extension(extension: &str) -> XlsxResult<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(DocumentType::Workbook),
            "xlsm" => Ok(DocumentType::MacroEnabledWorkbook),
            "xltx" => Ok(DocumentType::Template),
            _ => Err(duke_stream_core::Error::UnsupportedDocumentType(extension.to_string()).into()),
        }
    }

    /// Pick the variant for a path's extension
    pub fn from_path(path: &Path) -> XlsxResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentType::Workbook => "xlsx",
            DocumentType::MacroEnabledWorkbook => "xlsm",
            DocumentType::Template => "xltx",
        }
    }

    /// Content type of `xl/workbook.xml`
    pub fn main_content_type(self) -> &'static str {
        match self {
            DocumentType::Workbook => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"
            }
            DocumentType::MacroEnabledWorkbook => "application/vnd.ms-excel.sheet.macroEnabled.main+xml",
            DocumentType::Template => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml"
            }
        }
    }
}

/// ZIP compression for package entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    /// Deflate with an optional level (0-9); `None` uses the library default
    Deflated(Option<i64>),
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Deflated(None)
    }
}

/// Settings for [`XlsxSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct XlsxOptions {
    pub invalid_characters: InvalidCharacters,
    pub compression: Compression,
    /// Written to `docProps/core.xml` as creator and last editor
    pub creator: String,
    /// Creation timestamp; `None` uses the time the document finishes
    pub created: Option<DateTime<Utc>>,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            invalid_characters: InvalidCharacters::default(),
            compression: Compression::default(),
            creator: "duke-stream".to_string(),
            created: None,
        }
    }
}

impl XlsxOptions {
    pub fn with_invalid_characters(mut self, policy: InvalidCharacters) -> Self {
        self.invalid_characters = policy;
        self
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    fn file_options(&self) -> SimpleFileOptions {
        match self.compression {
            Compression::Stored => {
                SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
            }
            Compression::Deflated(level) => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(level),
        }
    }
}

/// [`PackageSink`] producing an XLSX package on any `Write + Seek`
///
/// # Example
///
/// ```rust
/// use std::io::Cursor;
/// use duke_stream_core::{PackageSink, SheetHeader, SheetFooter, SheetState, DocumentParts};
/// use duke_stream_xlsx::{DocumentType, XlsxSink};
///
/// let mut sink = XlsxSink::new(Cursor::new(Vec::new()), DocumentType::Workbook);
/// sink.begin_sheet(&SheetHeader {
///     index: 0,
///     name: "Sheet1".into(),
///     state: SheetState::Visible,
///     columns: vec![],
///     freeze: None,
/// }).unwrap();
/// sink.end_sheet(&SheetFooter::default()).unwrap();
/// let bytes = sink.finish(DocumentParts::default()).unwrap().into_inner();
/// assert_eq!(&bytes[..2], b"PK");
/// ```
pub struct XlsxSink<W: Write + Seek> {
    zip: ZipWriter<W>,
    document_type: DocumentType,
    options: XlsxOptions,
    sheets: Vec<SheetEntry>,
    open_sheet: Option<String>,
    row_buffer: String,
    /// First VML shape-id block not claimed by an earlier sheet
    next_shape_block: usize,
}

impl XlsxSink<BufWriter<File>> {
    /// Create a package file, choosing its variant from the extension
    pub fn create<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let path = path.as_ref();
        let document_type = DocumentType::from_path(path)?;
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), document_type))
    }
}

impl<W: Write + Seek> XlsxSink<W> {
    pub fn new(writer: W, document_type: DocumentType) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            document_type,
            options: XlsxOptions::default(),
            sheets: Vec::new(),
            open_sheet: None,
            row_buffer: String::new(),
            next_shape_block: 1,
        }
    }

    pub fn with_options(mut self, options: XlsxOptions) -> Self {
        self.options = options;
        self
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    fn start_part(&mut self, name: String) -> XlsxResult<()> {
        log::trace!("starting package part {}", name);
        self.zip.start_file(name, self.options.file_options())?;
        Ok(())
    }

    fn write_part(&mut self, name: String, content: &str) -> XlsxResult<()> {
        self.start_part(name)?;
        self.zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn begin(&mut self, header: &SheetHeader) -> XlsxResult<()> {
        if let Some(open) = &self.open_sheet {
            return Err(XlsxError::InvalidState(format!(
                "sheet {:?} is still being written",
                open
            )));
        }
        if header.index != self.sheets.len() {
            return Err(XlsxError::InvalidState(format!(
                "expected sheet index {}, got {}",
                self.sheets.len(),
                header.index
            )));
        }

        let number = header.index + 1;
        self.start_part(format!("xl/worksheets/sheet{}.xml", number))?;
        self.zip.write_all(sheet_prelude(header).as_bytes())?;
        self.sheets.push(SheetEntry {
            name: header.name.clone(),
            state: header.state,
            has_comments: false,
            filter_database: None,
        });
        self.open_sheet = Some(header.name.clone());
        Ok(())
    }

    fn row(&mut self, row: &RowRecord) -> XlsxResult<()> {
        if self.open_sheet.is_none() {
            return Err(XlsxError::InvalidState("row written outside a sheet".into()));
        }
        self.row_buffer.clear();
        write_row(&mut self.row_buffer, row, self.options.invalid_characters)?;
        self.zip.write_all(self.row_buffer.as_bytes())?;
        Ok(())
    }

    fn end(&mut self, footer: &SheetFooter) -> XlsxResult<()> {
        let name = self
            .open_sheet
            .take()
            .ok_or_else(|| XlsxError::InvalidState("no sheet to end".into()))?;
        let number = self.sheets.len();
        let policy = self.options.invalid_characters;

        let comments = footer.comments.as_ref().filter(|c| !c.comments.is_empty());
        let epilogue = sheet_epilogue(footer, comments.is_some(), policy)?;
        self.zip.write_all(epilogue.as_bytes())?;

        if let Some(batch) = comments {
            let xml = comments_xml(batch, policy)?;
            self.write_part(format!("xl/comments{}.xml", number), &xml)?;
            let vml = vml_drawing(batch, self.next_shape_block);
            self.next_shape_block += shape_blocks(batch.comments.len());
            self.write_part(format!("xl/drawings/vmlDrawing{}.vml", number), &vml)?;
            self.write_part(
                format!("xl/worksheets/_rels/sheet{}.xml.rels", number),
                &package::sheet_comment_rels(number),
            )?;
        }

        let filter_database = footer
            .autofilter
            .as_deref()
            .map(|range| -> XlsxResult<String> {
                Ok(CellRange::parse(range)?
                    .to_absolute()
                    .with_sheet(name.as_str())
                    .to_string())
            })
            .transpose()?;

        if let Some(entry) = self.sheets.last_mut() {
            entry.has_comments = comments.is_some();
            entry.filter_database = filter_database;
        }
        Ok(())
    }

    fn complete(mut self, mut parts: DocumentParts) -> XlsxResult<W> {
        if let Some(open) = &self.open_sheet {
            return Err(XlsxError::InvalidState(format!(
                "sheet {:?} was never ended",
                open
            )));
        }

        let policy = self.options.invalid_characters;
        let has_shared_strings = !parts.shared_strings.is_empty();
        if has_shared_strings {
            let strings = parts
                .shared_strings
                .iter()
                .map(|s| {
                    sanitize(s, policy, || "shared string".to_string()).map(|c| c.into_owned())
                })
                .collect::<XlsxResult<Vec<String>>>()?;
            let xml = package::shared_strings_xml(&strings, parts.shared_string_references);
            self.write_part("xl/sharedStrings.xml".into(), &xml)?;
        }

        // cellXfs must hold at least the default format
        if parts.stylesheet.cell_styles.is_empty() {
            parts.stylesheet.cell_styles.push(Style::default());
        }
        let styles = XlsxStyleTable::build(&parts.stylesheet).to_styles_xml();
        self.write_part("xl/styles.xml".into(), &styles)?;

        let workbook = package::workbook_xml(&self.sheets);
        self.write_part("xl/workbook.xml".into(), &workbook)?;
        let rels = package::workbook_rels(self.sheets.len(), has_shared_strings);
        self.write_part("xl/_rels/workbook.xml.rels".into(), &rels)?;

        let content_types =
            package::content_types(self.document_type, &self.sheets, has_shared_strings);
        self.write_part("[Content_Types].xml".into(), &content_types)?;
        self.write_part("_rels/.rels".into(), package::root_rels())?;

        let created = self.options.created.unwrap_or_else(Utc::now);
        let core = package::core_xml(&self.options.creator, created);
        self.write_part("docProps/core.xml".into(), &core)?;
        let app = package::app_xml(&self.sheets);
        self.write_part("docProps/app.xml".into(), &app)?;

        log::debug!(
            "finished {} package with {} sheet(s), {} cell format(s), {} shared string(s)",
            self.document_type.extension(),
            self.sheets.len(),
            parts.stylesheet.cell_styles.len(),
            parts.shared_strings.len()
        );

        let mut writer = self.zip.finish()?;
        writer.flush()?;
        Ok(writer)
    }
}

impl<W: Write + Seek> PackageSink for XlsxSink<W> {
    /// The underlying writer, positioned after the finished archive
    type Output = W;

    fn begin_sheet(&mut self, header: &SheetHeader) -> duke_stream_core::Result<()> {
        self.begin(header).map_err(Into::into)
    }

    fn write_row(&mut self, row: &RowRecord) -> duke_stream_core::Result<()> {
        self.row(row).map_err(Into::into)
    }

    fn end_sheet(&mut self, footer: &SheetFooter) -> duke_stream_core::Result<()> {
        self.end(footer).map_err(Into::into)
    }

    fn finish(self, parts: DocumentParts) -> duke_stream_core::Result<W> {
        self.complete(parts).map_err(Into::into)
    }
}
