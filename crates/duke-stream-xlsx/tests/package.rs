//! Package-level tests: drive `XlsxSink` directly and read the archive back.

use std::io::{Cursor, Read};

use chrono::{TimeZone, Utc};
use duke_stream_core::{
    CellRange, CellRecord, CellType, CommentCollector, DocumentParts, PackageSink, RowRecord,
    SharedStringTable, SheetFooter, SheetHeader, SheetState, Style, StyleRegistry,
};
use duke_stream_xlsx::{
    Compression, DocumentType, InvalidCharacters, XlsxError, XlsxOptions, XlsxSink,
};
use pretty_assertions::assert_eq;
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

fn header(index: usize, name: &str, state: SheetState) -> SheetHeader {
    SheetHeader {
        index,
        name: name.into(),
        state,
        columns: vec![],
        freeze: None,
    }
}

fn cell(column: u32, cell_type: CellType, raw_value: &str) -> CellRecord {
    CellRecord {
        column,
        cell_type,
        raw_value: raw_value.into(),
        style: None,
    }
}

fn part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing part {}", name));
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

/// `(reference, type, value)` for every cell of a worksheet part
fn cells(xml: &str) -> Vec<(String, String, String)> {
    let mut reader = Reader::from_str(xml);
    let mut found = Vec::new();
    let mut current: Option<(String, String)> = None;
    let mut in_value = false;

    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) if e.name().as_ref() == b"c" => {
                let reference = e
                    .try_get_attribute("r")
                    .unwrap()
                    .map(|a| a.unescape_value().unwrap().into_owned())
                    .unwrap_or_default();
                let kind = e
                    .try_get_attribute("t")
                    .unwrap()
                    .map(|a| a.unescape_value().unwrap().into_owned())
                    .unwrap_or_else(|| "n".to_string());
                current = Some((reference, kind));
            }
            Event::Start(e) if matches!(e.name().as_ref(), b"v" | b"f" | b"t") => {
                in_value = current.is_some();
            }
            Event::Text(t) if in_value => {
                if let Some((reference, kind)) = current.take() {
                    found.push((reference, kind, t.unescape().unwrap().into_owned()));
                }
                in_value = false;
            }
            Event::End(e) if e.name().as_ref() == b"c" => {
                current = None;
                in_value = false;
            }
            Event::Eof => break,
            _ => {}
        }
    }
    found
}

fn finish(sink: XlsxSink<Cursor<Vec<u8>>>, parts: DocumentParts) -> ZipArchive<Cursor<Vec<u8>>> {
    let cursor = sink.finish(parts).unwrap();
    ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap()
}

#[test]
fn test_minimal_package_parts() {
    let mut sink = XlsxSink::new(Cursor::new(Vec::new()), DocumentType::Workbook);
    sink.begin_sheet(&header(0, "Sheet1", SheetState::Visible))
        .unwrap();
    sink.end_sheet(&SheetFooter::default()).unwrap();

    let mut archive = finish(sink, DocumentParts::default());
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/app.xml",
            "docProps/core.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/styles.xml",
            "xl/workbook.xml",
            "xl/worksheets/sheet1.xml",
        ]
    );

    let workbook = part(&mut archive, "xl/workbook.xml");
    assert!(workbook.contains("<sheet name=\"Sheet1\" sheetId=\"1\" r:id=\"rId1\"/>"));
    let sheet = part(&mut archive, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<sheetData>"));
    assert!(sheet.trim_end().ends_with("</worksheet>"));
}

#[test]
fn test_rows_shared_strings_and_styles() {
    let mut registry = StyleRegistry::new();
    let bold = registry.register(Style::new().bold(), Some("bold")).unwrap();
    let mut strings = SharedStringTable::new();
    let hello = strings.intern("hello");
    strings.intern("hello");

    let mut sink = XlsxSink::new(Cursor::new(Vec::new()), DocumentType::Workbook).with_options(
        XlsxOptions::default()
            .with_compression(Compression::Stored)
            .with_creator("tests")
            .with_created(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()),
    );
    sink.begin_sheet(&header(0, "Data", SheetState::Visible)).unwrap();
    sink.write_row(&RowRecord {
        number: 1,
        cells: vec![
            CellRecord {
                style: Some(bold),
                ..cell(1, CellType::SharedString, &hello.to_string())
            },
            cell(2, CellType::Text, "inline & raw"),
        ],
        ..RowRecord::default()
    })
    .unwrap();
    sink.write_row(&RowRecord {
        number: 3,
        cells: vec![
            cell(1, CellType::Number, "2.5"),
            cell(2, CellType::Formula, "A3*2"),
            cell(3, CellType::Boolean, "1"),
            cell(4, CellType::Error, "#N/A"),
        ],
        ..RowRecord::default()
    })
    .unwrap();
    sink.end_sheet(&SheetFooter::default()).unwrap();

    let mut archive = finish(
        sink,
        DocumentParts {
            stylesheet: registry.finalize(),
            shared_strings: strings.strings().to_vec(),
            shared_string_references: strings.reference_count(),
        },
    );

    let sheet = part(&mut archive, "xl/worksheets/sheet1.xml");
    assert_eq!(
        cells(&sheet),
        vec![
            ("A1".into(), "s".into(), "0".into()),
            ("B1".into(), "inlineStr".into(), "inline & raw".into()),
            ("A3".into(), "n".into(), "2.5".into()),
            ("B3".into(), "n".into(), "A3*2".into()),
            ("C3".into(), "b".into(), "1".into()),
            ("D3".into(), "e".into(), "#N/A".into()),
        ]
    );
    assert!(sheet.contains("<c r=\"A1\" s=\"1\" t=\"s\">"));

    let shared = part(&mut archive, "xl/sharedStrings.xml");
    assert!(shared.contains("count=\"2\" uniqueCount=\"1\""));
    assert!(shared.contains("<si><t>hello</t></si>"));

    let styles = part(&mut archive, "xl/styles.xml");
    assert!(styles.contains("<cellXfs count=\"2\">"));
    assert!(styles.contains("<b/>"));

    let content_types = part(&mut archive, "[Content_Types].xml");
    assert!(content_types.contains("/xl/sharedStrings.xml"));

    let core = part(&mut archive, "docProps/core.xml");
    assert!(core.contains("<dc:creator>tests</dc:creator>"));
    assert!(core.contains("2024-03-01T08:30:00Z"));
}

#[test]
fn test_comments_filters_and_hidden_sheets() {
    let mut comments = CommentCollector::new();
    comments
        .add(CellRange::parse("B2").unwrap(), "Check", "Auditor")
        .unwrap();

    let mut sink = XlsxSink::new(Cursor::new(Vec::new()), DocumentType::Template);
    sink.begin_sheet(&header(0, "First", SheetState::Visible)).unwrap();
    sink.end_sheet(&SheetFooter::default()).unwrap();
    sink.begin_sheet(&header(1, "My Data", SheetState::Hidden)).unwrap();
    sink.end_sheet(&SheetFooter {
        autofilter: Some("A1:C10".into()),
        comments: comments.into_batch(),
        ..SheetFooter::default()
    })
    .unwrap();

    let mut archive = finish(sink, DocumentParts::default());
    assert!(archive.by_name("xl/comments1.xml").is_err());

    let comments = part(&mut archive, "xl/comments2.xml");
    assert!(comments.contains("<author>Auditor</author>"));
    assert!(comments.contains("<comment ref=\"B2\" authorId=\"0\">"));
    part(&mut archive, "xl/drawings/vmlDrawing2.vml");
    let rels = part(&mut archive, "xl/worksheets/_rels/sheet2.xml.rels");
    assert!(rels.contains("Target=\"../comments2.xml\""));

    let sheet = part(&mut archive, "xl/worksheets/sheet2.xml");
    assert!(sheet.contains("<autoFilter ref=\"A1:C10\"/>"));
    assert!(sheet.contains("<legacyDrawing r:id=\"rId2\"/>"));

    let workbook = part(&mut archive, "xl/workbook.xml");
    assert!(workbook.contains("<sheet name=\"My Data\" sheetId=\"2\" state=\"hidden\" r:id=\"rId2\"/>"));
    assert!(workbook.contains(
        "<definedName name=\"_xlnm._FilterDatabase\" localSheetId=\"1\" hidden=\"1\">'My Data'!$A$1:$C$10</definedName>"
    ));

    let content_types = part(&mut archive, "[Content_Types].xml");
    assert!(content_types.contains(DocumentType::Template.main_content_type()));
    assert!(content_types.contains("Extension=\"vml\""));
}

#[test]
fn test_comment_shape_ids_do_not_overlap_between_sheets() {
    let mut many = CommentCollector::new();
    for row in 1..=1024 {
        many.add(CellRange::cell(1, row).unwrap(), "note", "Ann").unwrap();
    }
    let mut one = CommentCollector::new();
    one.add(CellRange::parse("A1").unwrap(), "note", "Bo").unwrap();

    let mut sink = XlsxSink::new(Cursor::new(Vec::new()), DocumentType::Workbook);
    for (index, batch) in [many, one].into_iter().enumerate() {
        sink.begin_sheet(&header(index, &format!("S{}", index + 1), SheetState::Visible))
            .unwrap();
        sink.end_sheet(&SheetFooter {
            comments: batch.into_batch(),
            ..SheetFooter::default()
        })
        .unwrap();
    }

    let mut archive = finish(sink, DocumentParts::default());
    let first = part(&mut archive, "xl/drawings/vmlDrawing1.vml");
    assert!(first.contains("data=\"1,2\""));
    assert!(first.contains("id=\"_x0000_s2048\""));
    let second = part(&mut archive, "xl/drawings/vmlDrawing2.vml");
    assert!(second.contains("data=\"3\""));
    assert!(second.contains("id=\"_x0000_s3073\""));
}

#[test]
fn test_reject_policy_fails_row() {
    let mut sink = XlsxSink::new(Cursor::new(Vec::new()), DocumentType::Workbook)
        .with_options(XlsxOptions::default().with_invalid_characters(InvalidCharacters::Reject));
    sink.begin_sheet(&header(0, "Sheet1", SheetState::Visible)).unwrap();

    let err = sink
        .write_row(&RowRecord {
            number: 1,
            cells: vec![cell(1, CellType::Text, "bell\u{7}")],
            ..RowRecord::default()
        })
        .unwrap_err();
    assert!(err.is_output_failure());
    assert!(err.to_string().contains("U+0007"));
}

#[test]
fn test_create_uses_extension() {
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join("book.xlsm");
    let mut sink = XlsxSink::create(&path).unwrap();
    assert_eq!(sink.document_type(), DocumentType::MacroEnabledWorkbook);
    sink.begin_sheet(&header(0, "Sheet1", SheetState::Visible)).unwrap();
    sink.end_sheet(&SheetFooter::default()).unwrap();
    sink.finish(DocumentParts::default()).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);

    let err = XlsxSink::create(dir.path().join("book.ods")).err().unwrap();
    assert!(matches!(
        err,
        XlsxError::Core(duke_stream_core::Error::UnsupportedDocumentType(_))
    ));
}

#[test]
fn test_rows_outside_sheet_rejected() {
    let mut sink = XlsxSink::new(Cursor::new(Vec::new()), DocumentType::Workbook);
    assert!(sink.write_row(&RowRecord::default()).is_err());
    assert!(sink.end_sheet(&SheetFooter::default()).is_err());
}
