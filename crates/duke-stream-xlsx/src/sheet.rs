//! Worksheet XML fragments
//!
//! A worksheet part is written in three pieces: everything up to and
//! including `<sheetData>` when the sheet opens, one `<row>` per flushed row,
//! and the closing metadata when the sheet ends.

use std::fmt::Write as _;

use crate::error::XlsxResult;
use crate::xml::{escape_attr, escape_text, sanitize, text_open_tag, InvalidCharacters};
use duke_stream_core::column::column_spans;
use duke_stream_core::{
    column_to_letters, CellRecord, CellType, DataValidation, FreezePane, ListSource, RowRecord,
    SheetFooter, SheetHeader, ValidationErrorStyle, ValidationRule,
};

/// Relationship id of the legacy drawing that anchors comment boxes
pub(crate) const VML_RELATIONSHIP_ID: &str = "rId2";

pub(crate) fn sheet_prelude(header: &SheetHeader) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );

    let selected = if header.index == 0 { " tabSelected=\"1\"" } else { "" };
    match header.freeze.filter(|f| !f.is_empty()) {
        Some(freeze) => {
            let _ = write!(
                xml,
                "\n  <sheetViews><sheetView{} workbookViewId=\"0\">{}</sheetView></sheetViews>",
                selected,
                frozen_pane(freeze)
            );
        }
        None => {
            let _ = write!(
                xml,
                "\n  <sheetViews><sheetView{} workbookViewId=\"0\"/></sheetViews>",
                selected
            );
        }
    }

    xml.push_str("\n  <sheetFormatPr defaultRowHeight=\"15\"/>");

    let spans = column_spans(&header.columns);
    if !spans.is_empty() {
        xml.push_str("\n  <cols>");
        for (first, last, spec) in spans {
            let _ = write!(xml, "<col min=\"{}\" max=\"{}\"", first, last);
            match spec.width {
                Some(width) => {
                    let _ = write!(xml, " width=\"{}\" customWidth=\"1\"", width);
                }
                None => xml.push_str(" width=\"9.140625\""),
            }
            if spec.hidden {
                xml.push_str(" hidden=\"1\"");
            }
            if let Some(style) = spec.style {
                let _ = write!(xml, " style=\"{}\"", style);
            }
            xml.push_str("/>");
        }
        xml.push_str("</cols>");
    }

    xml.push_str("\n  <sheetData>");
    xml
}

fn frozen_pane(freeze: FreezePane) -> String {
    let top_left = format!(
        "{}{}",
        column_to_letters(freeze.columns + 1),
        freeze.rows + 1
    );
    let active = match (freeze.rows > 0, freeze.columns > 0) {
        (true, true) => "bottomRight",
        (true, false) => "bottomLeft",
        _ => "topRight",
    };

    let mut pane = String::from("<pane");
    if freeze.columns > 0 {
        let _ = write!(pane, " xSplit=\"{}\"", freeze.columns);
    }
    if freeze.rows > 0 {
        let _ = write!(pane, " ySplit=\"{}\"", freeze.rows);
    }
    let _ = write!(
        pane,
        " topLeftCell=\"{top_left}\" activePane=\"{active}\" state=\"frozen\"/><selection pane=\"{active}\" activeCell=\"{top_left}\" sqref=\"{top_left}\"/>"
    );
    pane
}

/// Append one `<row>` element to `out`
pub(crate) fn write_row(
    out: &mut String,
    row: &RowRecord,
    policy: InvalidCharacters,
) -> XlsxResult<()> {
    let _ = write!(out, "\n    <row r=\"{}\"", row.number);
    if let Some(height) = row.height {
        let _ = write!(out, " ht=\"{}\" customHeight=\"1\"", height);
    }
    if row.hidden {
        out.push_str(" hidden=\"1\"");
    }
    if let Some(style) = row.style {
        let _ = write!(out, " s=\"{}\" customFormat=\"1\"", style);
    }

    if row.cells.is_empty() {
        out.push_str("/>");
        return Ok(());
    }

    out.push('>');
    for cell in &row.cells {
        write_cell(out, row.number, cell, policy)?;
    }
    out.push_str("</row>");
    Ok(())
}

fn write_cell(
    out: &mut String,
    row: u32,
    cell: &CellRecord,
    policy: InvalidCharacters,
) -> XlsxResult<()> {
    let reference = format!("{}{}", column_to_letters(cell.column), row);
    let _ = write!(out, "<c r=\"{}\"", reference);
    if let Some(style) = cell.style.filter(|s| s.index() != 0) {
        let _ = write!(out, " s=\"{}\"", style);
    }

    match cell.cell_type {
        CellType::Text => {
            let text = sanitize(&cell.raw_value, policy, || format!("cell {}", reference))?;
            let _ = write!(
                out,
                " t=\"inlineStr\"><is>{}{}</t></is></c>",
                text_open_tag(&text),
                escape_text(&text)
            );
        }
        CellType::SharedString => {
            let _ = write!(out, " t=\"s\"><v>{}</v></c>", cell.raw_value);
        }
        CellType::Number => {
            let _ = write!(out, "><v>{}</v></c>", cell.raw_value);
        }
        CellType::Formula => {
            let formula = sanitize(&cell.raw_value, policy, || format!("formula in {}", reference))?;
            let _ = write!(out, "><f>{}</f></c>", escape_text(&formula));
        }
        CellType::Boolean => {
            let _ = write!(out, " t=\"b\"><v>{}</v></c>", cell.raw_value);
        }
        CellType::Error => {
            let _ = write!(out, " t=\"e\"><v>{}</v></c>", escape_text(&cell.raw_value));
        }
    }
    Ok(())
}

/// Everything after `</sheetData>`
///
/// `has_comments` adds the legacy drawing reference that comment boxes need.
pub(crate) fn sheet_epilogue(
    footer: &SheetFooter,
    has_comments: bool,
    policy: InvalidCharacters,
) -> XlsxResult<String> {
    let mut xml = String::from("\n  </sheetData>");

    if let Some(range) = &footer.autofilter {
        let _ = write!(xml, "\n  <autoFilter ref=\"{}\"/>", range);
    }

    if !footer.merged_cells.is_empty() {
        let _ = write!(xml, "\n  <mergeCells count=\"{}\">", footer.merged_cells.len());
        for range in &footer.merged_cells {
            let _ = write!(xml, "<mergeCell ref=\"{}\"/>", range.without_sheet());
        }
        xml.push_str("</mergeCells>");
    }

    for (priority, rule) in footer.conditional_formats.iter().enumerate() {
        let formula = sanitize(&rule.formula, policy, || {
            format!("conditional format on {}", rule.range)
        })?;
        let _ = write!(
            xml,
            "\n  <conditionalFormatting sqref=\"{}\"><cfRule type=\"expression\" dxfId=\"{}\" priority=\"{}\"><formula>{}</formula></cfRule></conditionalFormatting>",
            rule.range.without_sheet(),
            rule.format,
            priority + 1,
            escape_text(&formula)
        );
    }

    if !footer.validations.is_empty() {
        let _ = write!(
            xml,
            "\n  <dataValidations count=\"{}\">",
            footer.validations.len()
        );
        for validation in &footer.validations {
            xml.push_str(&data_validation(validation));
        }
        xml.push_str("</dataValidations>");
    }

    xml.push_str(
        "\n  <pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>",
    );

    if has_comments {
        let _ = write!(xml, "\n  <legacyDrawing r:id=\"{}\"/>", VML_RELATIONSHIP_ID);
    }

    xml.push_str("\n</worksheet>");
    Ok(xml)
}

fn data_validation(validation: &DataValidation) -> String {
    let sqref = validation
        .ranges
        .iter()
        .map(|r| r.without_sheet().to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut attrs = format!(" type=\"{}\"", validation.rule.xml_type());
    if let Some(criterion) = validation.rule.criterion() {
        let _ = write!(attrs, " operator=\"{}\"", criterion.operator.xml_value());
    }
    if validation.error_style != ValidationErrorStyle::Stop {
        let _ = write!(attrs, " errorStyle=\"{}\"", validation.error_style.xml_value());
    }
    if validation.allow_blank {
        attrs.push_str(" allowBlank=\"1\"");
    }
    // The attribute is inverted: set means the dropdown is suppressed
    if matches!(validation.rule, ValidationRule::List(_)) && !validation.show_dropdown {
        attrs.push_str(" showDropDown=\"1\"");
    }
    if let Some((title, message)) = &validation.prompt {
        let _ = write!(
            attrs,
            " showInputMessage=\"1\" promptTitle=\"{}\" prompt=\"{}\"",
            escape_attr(title),
            escape_attr(message)
        );
    }
    if let Some((title, message)) = &validation.error {
        let _ = write!(
            attrs,
            " showErrorMessage=\"1\" errorTitle=\"{}\" error=\"{}\"",
            escape_attr(title),
            escape_attr(message)
        );
    }

    let formulas = match &validation.rule {
        ValidationRule::List(ListSource::Items(items)) => {
            // Quotes inside the string literal are doubled
            let list = items
                .iter()
                .map(|item| item.replace('"', "\"\""))
                .collect::<Vec<_>>()
                .join(",");
            format!("<formula1>\"{}\"</formula1>", escape_text(&list))
        }
        ValidationRule::List(ListSource::Range(range)) => {
            format!("<formula1>{}</formula1>", escape_text(&range.to_string()))
        }
        ValidationRule::Whole(c) | ValidationRule::Decimal(c) | ValidationRule::TextLength(c) => {
            let mut f = format!("<formula1>{}</formula1>", escape_text(&c.value1));
            if let Some(value2) = &c.value2 {
                let _ = write!(f, "<formula2>{}</formula2>", escape_text(value2));
            }
            f
        }
        ValidationRule::Custom(formula) => {
            format!("<formula1>{}</formula1>", escape_text(formula))
        }
    };

    format!(
        "<dataValidation{} sqref=\"{}\">{}</dataValidation>",
        attrs, sqref, formulas
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_stream_core::{
        CellRange, ColumnSpec, ConditionalFormatRecord, SheetState, Style, StyleRegistry,
        ValidationOperator,
    };

    fn header(columns: Vec<ColumnSpec>, freeze: Option<FreezePane>) -> SheetHeader {
        SheetHeader {
            index: 0,
            name: "Data".into(),
            state: SheetState::Visible,
            columns,
            freeze,
        }
    }

    fn text_cell(column: u32, value: &str) -> CellRecord {
        CellRecord {
            column,
            cell_type: CellType::Text,
            raw_value: value.into(),
            style: None,
        }
    }

    #[test]
    fn test_prelude_columns_and_pane() {
        let xml = sheet_prelude(&header(
            vec![ColumnSpec::width(12.5), ColumnSpec::new(), ColumnSpec::new().hidden(true)],
            Some(FreezePane::rows(1)),
        ));
        assert!(xml.contains("<col min=\"1\" max=\"1\" width=\"12.5\" customWidth=\"1\"/>"));
        assert!(xml.contains("<col min=\"3\" max=\"3\" width=\"9.140625\" hidden=\"1\"/>"));
        assert!(!xml.contains("min=\"2\""));
        assert!(xml.contains(
            "<pane ySplit=\"1\" topLeftCell=\"A2\" activePane=\"bottomLeft\" state=\"frozen\"/>"
        ));
        assert!(xml.ends_with("<sheetData>"));
    }

    #[test]
    fn test_row_cell_encodings() {
        let mut registry = StyleRegistry::new();
        let bold = registry.register(Style::new().bold(), None).unwrap();

        let row = RowRecord {
            number: 3,
            hidden: false,
            height: Some(20.0),
            style: None,
            cells: vec![
                text_cell(1, " a<b "),
                CellRecord {
                    column: 2,
                    cell_type: CellType::Number,
                    raw_value: "2.5".into(),
                    style: Some(bold),
                },
                CellRecord {
                    column: 4,
                    cell_type: CellType::Formula,
                    raw_value: "IF(A1>0,1,0)".into(),
                    style: None,
                },
                CellRecord {
                    column: 5,
                    cell_type: CellType::SharedString,
                    raw_value: "7".into(),
                    style: None,
                },
                CellRecord {
                    column: 6,
                    cell_type: CellType::Boolean,
                    raw_value: "1".into(),
                    style: None,
                },
                CellRecord {
                    column: 7,
                    cell_type: CellType::Error,
                    raw_value: "#N/A".into(),
                    style: None,
                },
            ],
        };

        let mut out = String::new();
        write_row(&mut out, &row, InvalidCharacters::Strip).unwrap();
        assert!(out.contains("<row r=\"3\" ht=\"20\" customHeight=\"1\">"));
        assert!(out.contains(
            "<c r=\"A3\" t=\"inlineStr\"><is><t xml:space=\"preserve\"> a&lt;b </t></is></c>"
        ));
        assert!(out.contains("<c r=\"B3\" s=\"1\"><v>2.5</v></c>"));
        assert!(out.contains("<c r=\"D3\"><f>IF(A1&gt;0,1,0)</f></c>"));
        assert!(out.contains("<c r=\"E3\" t=\"s\"><v>7</v></c>"));
        assert!(out.contains("<c r=\"F3\" t=\"b\"><v>1</v></c>"));
        assert!(out.contains("<c r=\"G3\" t=\"e\"><v>#N/A</v></c>"));
    }

    #[test]
    fn test_invalid_text_rejected_by_policy() {
        let row = RowRecord {
            number: 1,
            cells: vec![text_cell(1, "bell\u{7}")],
            ..RowRecord::default()
        };
        let mut out = String::new();
        assert!(write_row(&mut out, &row, InvalidCharacters::Reject).is_err());

        out.clear();
        write_row(&mut out, &row, InvalidCharacters::Strip).unwrap();
        assert!(out.contains("<t>bell</t>"));
    }

    #[test]
    fn test_epilogue_element_order() {
        let mut registry = StyleRegistry::new();
        let dxf = registry
            .register_differential(Style::new().bold(), None)
            .unwrap();

        let footer = SheetFooter {
            autofilter: Some("A1:C1".into()),
            conditional_formats: vec![ConditionalFormatRecord {
                range: CellRange::parse("A2:C10").unwrap(),
                formula: "$C2>100".into(),
                format: dxf,
            }],
            merged_cells: vec![CellRange::parse("A12:C12").unwrap()],
            validations: vec![DataValidation::whole_number(
                ValidationOperator::GreaterThan,
                "0",
                None,
            )
            .with_range(CellRange::parse("B2:B10").unwrap())],
            comments: None,
        };

        let xml = sheet_epilogue(&footer, true, InvalidCharacters::Strip).unwrap();
        let order = [
            "</sheetData>",
            "<autoFilter ref=\"A1:C1\"/>",
            "<mergeCell ref=\"A12:C12\"/>",
            "<cfRule type=\"expression\" dxfId=\"0\" priority=\"1\"><formula>$C2&gt;100</formula>",
            "<dataValidation type=\"whole\" operator=\"greaterThan\" allowBlank=\"1\" sqref=\"B2:B10\"><formula1>0</formula1>",
            "<pageMargins",
            "<legacyDrawing r:id=\"rId2\"/>",
            "</worksheet>",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| xml.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_list_validation_formula() {
        let v = DataValidation::list(["Yes", "No"]).with_range(CellRange::parse("D2:D5").unwrap());
        let xml = data_validation(&v);
        assert!(xml.contains("<formula1>\"Yes,No\"</formula1>"));
        assert!(!xml.contains("showDropDown"));
    }

    #[test]
    fn test_list_items_with_quotes() {
        let v = DataValidation::list(["say \"hi\"", "no"])
            .with_range(CellRange::parse("A1").unwrap());
        assert!(v.check().is_ok());
        let xml = data_validation(&v);
        assert!(xml.contains("<formula1>\"say \"\"hi\"\",no\"</formula1>"));
    }
}
