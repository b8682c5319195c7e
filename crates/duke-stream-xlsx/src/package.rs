//! Document-level package parts
//!
//! These are written last, once every sheet is known.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use duke_stream_core::SheetState;

use crate::xml::{escape_attr, escape_text, text_open_tag};
use crate::DocumentType;

/// What the package parts need to know about a written sheet
#[derive(Debug, Clone)]
pub(crate) struct SheetEntry {
    pub(crate) name: String,
    pub(crate) state: SheetState,
    pub(crate) has_comments: bool,
    /// Sheet-qualified absolute filter range for the filter database name
    pub(crate) filter_database: Option<String>,
}

pub(crate) fn content_types(
    document_type: DocumentType,
    sheets: &[SheetEntry],
    has_shared_strings: bool,
) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>"#,
    );

    if sheets.iter().any(|s| s.has_comments) {
        xml.push_str(
            "\n  <Default Extension=\"vml\" ContentType=\"application/vnd.openxmlformats-officedocument.vmlDrawing\"/>",
        );
    }

    let _ = write!(
        xml,
        "\n  <Override PartName=\"/xl/workbook.xml\" ContentType=\"{}\"/>",
        document_type.main_content_type()
    );
    xml.push_str(
        "\n  <Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>",
    );
    if has_shared_strings {
        xml.push_str(
            "\n  <Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>",
        );
    }

    for (i, sheet) in sheets.iter().enumerate() {
        let _ = write!(
            xml,
            "\n  <Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            i + 1
        );
        if sheet.has_comments {
            let _ = write!(
                xml,
                "\n  <Override PartName=\"/xl/comments{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml\"/>",
                i + 1
            );
        }
    }

    xml.push_str(
        r#"
  <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
  <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#,
    );
    xml
}

pub(crate) fn root_rels() -> &'static str {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#
}

pub(crate) fn workbook_xml(sheets: &[SheetEntry]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr/>
  <bookViews><workbookView/></bookViews>
  <sheets>"#,
    );

    for (i, sheet) in sheets.iter().enumerate() {
        let state = sheet
            .state
            .xml_value()
            .map(|s| format!(" state=\"{}\"", s))
            .unwrap_or_default();
        let _ = write!(
            xml,
            "\n    <sheet name=\"{}\" sheetId=\"{}\"{} r:id=\"rId{}\"/>",
            escape_attr(&sheet.name),
            i + 1,
            state,
            i + 1
        );
    }
    xml.push_str("\n  </sheets>");

    let filters: Vec<(usize, &str)> = sheets
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.filter_database.as_deref().map(|f| (i, f)))
        .collect();
    if !filters.is_empty() {
        xml.push_str("\n  <definedNames>");
        for (i, range) in filters {
            let _ = write!(
                xml,
                "<definedName name=\"_xlnm._FilterDatabase\" localSheetId=\"{}\" hidden=\"1\">{}</definedName>",
                i,
                escape_text(range)
            );
        }
        xml.push_str("</definedNames>");
    }

    xml.push_str("\n</workbook>");
    xml
}

pub(crate) fn workbook_rels(sheet_count: usize, has_shared_strings: bool) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for i in 1..=sheet_count {
        let _ = write!(
            xml,
            "\n  <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
            i, i
        );
    }

    let _ = write!(
        xml,
        "\n  <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>",
        sheet_count + 1
    );
    if has_shared_strings {
        let _ = write!(
            xml,
            "\n  <Relationship Id=\"rId{}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings\" Target=\"sharedStrings.xml\"/>",
            sheet_count + 2
        );
    }

    xml.push_str("\n</Relationships>");
    xml
}

/// Relationships of a sheet that carries comments
pub(crate) fn sheet_comment_rels(sheet_number: usize) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="../comments{n}.xml"/>
  <Relationship Id="{vml}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/vmlDrawing" Target="../drawings/vmlDrawing{n}.vml"/>
</Relationships>"#,
        n = sheet_number,
        vml = crate::sheet::VML_RELATIONSHIP_ID,
    )
}

/// `strings` must already be sanitized
pub(crate) fn shared_strings_xml(strings: &[String], references: u64) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
        references,
        strings.len()
    );
    for s in strings {
        let _ = write!(xml, "<si>{}{}</t></si>", text_open_tag(s), escape_text(s));
    }
    xml.push_str("</sst>");
    xml
}

pub(crate) fn core_xml(creator: &str, created: DateTime<Utc>) -> String {
    let timestamp = created.format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <dc:creator>{creator}</dc:creator>
  <cp:lastModifiedBy>{creator}</cp:lastModifiedBy>
  <dcterms:created xsi:type="dcterms:W3CDTF">{timestamp}</dcterms:created>
  <dcterms:modified xsi:type="dcterms:W3CDTF">{timestamp}</dcterms:modified>
</cp:coreProperties>"#,
        creator = escape_text(creator),
        timestamp = timestamp,
    )
}

pub(crate) fn app_xml(sheets: &[SheetEntry]) -> String {
    let mut titles = String::new();
    for sheet in sheets {
        let _ = write!(titles, "<vt:lpstr>{}</vt:lpstr>", escape_text(&sheet.name));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
  <Application>duke-stream</Application>
  <DocSecurity>0</DocSecurity>
  <ScaleCrop>false</ScaleCrop>
  <HeadingPairs><vt:vector size="2" baseType="variant"><vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant><vt:variant><vt:i4>{count}</vt:i4></vt:variant></vt:vector></HeadingPairs>
  <TitlesOfParts><vt:vector size="{count}" baseType="lpstr">{titles}</vt:vector></TitlesOfParts>
  <AppVersion>16.0300</AppVersion>
</Properties>"#,
        count = sheets.len(),
        titles = titles,
    )
}
