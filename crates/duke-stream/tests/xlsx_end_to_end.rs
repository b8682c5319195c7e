//! End-to-end tests: stream a document into an XLSX package and read the
//! produced XML back

use std::fs::File;
use std::io::{Cursor, Read, Seek};

use duke_stream::prelude::*;
use duke_stream::{Compression, InvalidCharacters, WriterState};
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

fn part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> String {
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing part {}", name));
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

/// Rows of a worksheet part as `(row number, [text of each cell])`
///
/// Text is the `<v>`, `<f>` or inline `<t>` content of the cell.
fn sheet_rows(xml: &str) -> Vec<(u32, Vec<String>)> {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut in_value = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"row" => {
                let number = e
                    .try_get_attribute("r")
                    .unwrap()
                    .map(|a| a.unescape_value().unwrap().parse().unwrap())
                    .unwrap();
                rows.push((number, Vec::new()));
            }
            Event::Start(e) if matches!(e.name().as_ref(), b"v" | b"f" | b"t") => {
                in_value = true;
            }
            Event::Text(t) if in_value => {
                if let Some((_, cells)) = rows.last_mut() {
                    cells.push(t.unescape().unwrap().into_owned());
                }
                in_value = false;
            }
            Event::End(e) if matches!(e.name().as_ref(), b"v" | b"f" | b"t") => {
                in_value = false;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    rows
}

/// Names of the sheets listed in `xl/workbook.xml`, in order
fn sheet_names(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut names = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                let name = e.try_get_attribute("name").unwrap().unwrap();
                names.push(name.unescape_value().unwrap().into_owned());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    names
}

#[test]
fn test_three_rows_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("first.xlsx");

    let mut writer = StreamWriter::create_xlsx(&path, WriterOptions::default()).unwrap();
    writer.open_sheet("first", SheetOptions::default()).unwrap();
    writer.write_row(["a", "b", "c"], CellType::Text).unwrap();
    writer.write_row(["1", "2", "30", "40"], CellType::Number).unwrap();
    writer.write_row(["SUM(A2:D2)"], CellType::Formula).unwrap();
    writer.close_sheet().unwrap();
    writer.finish().unwrap();

    let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    assert_eq!(sheet_names(&part(&mut archive, "xl/workbook.xml")), vec!["first"]);

    let rows = sheet_rows(&part(&mut archive, "xl/worksheets/sheet1.xml"));
    assert_eq!(
        rows,
        vec![
            (1, vec!["a".to_string(), "b".to_string(), "c".to_string()]),
            (
                2,
                vec!["1".to_string(), "2".to_string(), "30".to_string(), "40".to_string()]
            ),
            (3, vec!["SUM(A2:D2)".to_string()]),
        ]
    );
}

#[test]
fn test_styled_document_with_metadata() {
    let mut writer = StreamWriter::new_xlsx(
        Cursor::new(Vec::new()),
        DocumentType::Workbook,
        WriterOptions::default()
            .with_shared_strings(true)
            .with_compression(Compression::Stored),
    );
    let header = writer
        .styles_mut()
        .register(
            Style::new().bold().fill_color(Color::rgb(0xDD, 0xEB, 0xF7)),
            Some("header"),
        )
        .unwrap();
    let negative = writer
        .styles_mut()
        .register_differential(
            Style::new().with_font(FontStyle::default().with_color(Color::RED)),
            None,
        )
        .unwrap();

    writer
        .open_sheet(
            "Ledger",
            SheetOptions::new()
                .with_columns(vec![ColumnSpec::width(24.0), ColumnSpec::width(12.0)])
                .with_header_style(header)
                .with_freeze(FreezePane::rows(1)),
        )
        .unwrap();
    writer.write_row(["Account", "Balance"], CellType::Text).unwrap();
    for (account, balance) in [("cash", 120.0), ("loan", -40.5), ("cash", 3.0)] {
        writer.begin_row().unwrap();
        writer.write_cell(Cell::text(account)).unwrap();
        writer.write_cell(Cell::number(balance)).unwrap();
        writer.end_row().unwrap();
    }
    writer
        .add_autofilter(CellRange::parse("A1:B1").unwrap(), false)
        .unwrap();
    writer
        .add_conditional_formatting_formula(CellRange::parse("B2:B4").unwrap(), "B2<0", negative)
        .unwrap();
    writer
        .add_data_validation(
            DataValidation::decimal(ValidationOperator::GreaterThan, "-1000", None)
                .with_range(CellRange::parse("B2:B4").unwrap()),
        )
        .unwrap();
    writer
        .add_comment(CellRange::parse("A3").unwrap(), "Refinanced", "Treasury")
        .unwrap();
    writer.close_sheet().unwrap();

    let bytes = writer.finish().unwrap().into_inner();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

    let sheet = part(&mut archive, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<pane ySplit=\"1\""));
    assert!(sheet.contains("<c r=\"A1\" s=\"1\" t=\"s\">"));
    assert!(sheet.contains("<autoFilter ref=\"A1:B1\"/>"));
    assert!(sheet.contains("dxfId=\"0\" priority=\"1\"><formula>B2&lt;0</formula>"));
    assert!(sheet.contains("<dataValidations count=\"1\">"));
    assert!(sheet.contains("<legacyDrawing r:id=\"rId2\"/>"));

    // Shared strings: Account, Balance, cash, loan; cash repeated
    let shared = part(&mut archive, "xl/sharedStrings.xml");
    assert!(shared.contains("count=\"5\" uniqueCount=\"4\""));
    let rows = sheet_rows(&sheet);
    assert_eq!(rows[1], (2, vec!["2".to_string(), "120".to_string()]));
    assert_eq!(rows[3], (4, vec!["2".to_string(), "3".to_string()]));

    let styles = part(&mut archive, "xl/styles.xml");
    assert!(styles.contains("<dxfs count=\"1\">"));
    assert!(styles.contains("FFDDEBF7"));

    let comments = part(&mut archive, "xl/comments1.xml");
    assert!(comments.contains("<comment ref=\"A3\" authorId=\"0\">"));

    let workbook = part(&mut archive, "xl/workbook.xml");
    assert!(workbook.contains("Ledger!$A$1:$B$1"));
}

#[test]
fn test_rejected_character_poisons_writer() {
    let mut writer = StreamWriter::new_xlsx(
        Cursor::new(Vec::new()),
        DocumentType::Workbook,
        WriterOptions::default().with_invalid_characters(InvalidCharacters::Reject),
    );
    writer.open_sheet("S1", SheetOptions::default()).unwrap();
    let err = writer.write_row(["null\u{0}byte"], CellType::Text).unwrap_err();
    assert!(err.is_output_failure());
    assert_eq!(writer.state(), WriterState::Poisoned);
    assert!(matches!(writer.close_sheet(), Err(Error::Poisoned)));
}

#[test]
fn test_stripped_characters_by_default() {
    let mut writer = StreamWriter::new_xlsx(
        Cursor::new(Vec::new()),
        DocumentType::Workbook,
        WriterOptions::default(),
    );
    writer.open_sheet("S1", SheetOptions::default()).unwrap();
    writer.write_row(["bell\u{7}"], CellType::Text).unwrap();
    writer.close_sheet().unwrap();

    let bytes = writer.finish().unwrap().into_inner();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let rows = sheet_rows(&part(&mut archive, "xl/worksheets/sheet1.xml"));
    assert_eq!(rows, vec![(1, vec!["bell".to_string()])]);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let err = StreamWriter::create_xlsx(dir.path().join("data.ods"), WriterOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, Error::UnsupportedDocumentType(ref ext) if ext == "ods"));
}

struct Reading {
    sensor: &'static str,
    value: Option<f64>,
}

impl SheetRecord for Reading {
    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("Sensor", CellType::Text).with_width(18.0),
            ColumnDescriptor::new("Value", CellType::Number).with_style("reading"),
        ]
    }

    fn values(&self) -> Vec<Option<String>> {
        vec![
            Some(self.sensor.to_string()),
            self.value.map(|v| v.to_string()),
        ]
    }
}

#[test]
fn test_records_as_rows() {
    let mut writer = StreamWriter::new_xlsx(
        Cursor::new(Vec::new()),
        DocumentType::Workbook,
        WriterOptions::default(),
    );
    writer
        .styles_mut()
        .register(Style::new().number_format("0.000"), Some("reading"))
        .unwrap();

    let layout = writer.record_layout::<Reading>().unwrap();
    writer
        .open_record_sheet("Readings", &layout, SheetOptions::default())
        .unwrap();
    for reading in [
        Reading { sensor: "t1", value: Some(21.5) },
        Reading { sensor: "t2", value: None },
    ] {
        writer.write_record(&layout, &reading).unwrap();
    }
    writer.close_sheet().unwrap();

    let bytes = writer.finish().unwrap().into_inner();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let sheet = part(&mut archive, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<col min=\"1\" max=\"1\" width=\"18\" customWidth=\"1\"/>"));
    assert!(sheet.contains("<c r=\"B2\" s=\"1\"><v>21.5</v></c>"));
    assert_eq!(
        sheet_rows(&sheet),
        vec![
            (1, vec!["Sensor".to_string(), "Value".to_string()]),
            (2, vec!["t1".to_string(), "21.5".to_string()]),
            (3, vec!["t2".to_string()]),
        ]
    );

    let styles = part(&mut archive, "xl/styles.xml");
    assert!(styles.contains("formatCode=\"0.000\""));
}
