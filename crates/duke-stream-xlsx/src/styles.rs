//! styles.xml rendering
//!
//! The registry's direct styles become `cellXfs` in index order, so a
//! [`StyleId`](duke_stream_core::StyleId) is usable as the `s` attribute
//! unchanged. Differential styles become `dxfs`, again in index order.

use std::collections::HashMap;

use crate::xml::escape_attr;
use duke_stream_core::style::{
    Alignment, BorderEdge, BorderStyle, Color, DiagonalDirection, FillStyle, FontStyle,
    FontVerticalAlign, NumberFormat, PatternType, Protection, Style, Stylesheet,
};

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

/// Deduplicated component tables built from a stylesheet
#[derive(Debug)]
pub(crate) struct XlsxStyleTable<'a> {
    stylesheet: &'a Stylesheet,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    numfmts: Vec<(u32, String)>,
    numfmt_ids: HashMap<String, u32>,
    resolved: Vec<ResolvedXfIds>,
}

impl<'a> XlsxStyleTable<'a> {
    pub(crate) fn build(stylesheet: &'a Stylesheet) -> Self {
        let mut table = Self {
            stylesheet,
            // Slot 0 of each table is the default component
            fonts: vec![FontStyle::default()],
            // The package requires fills 0 and 1 to be none and gray125
            fills: vec![
                FillStyle::None,
                FillStyle::pattern(PatternType::Gray125, Color::Auto, Color::Auto),
            ],
            borders: vec![BorderStyle::default()],
            numfmts: Vec::new(),
            numfmt_ids: HashMap::new(),
            resolved: Vec::with_capacity(stylesheet.cell_styles.len()),
        };

        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        font_ids.insert(FontStyle::default(), 0);
        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();
        fill_ids.insert(FillStyle::None, 0);
        let mut border_ids: HashMap<BorderStyle, u32> = HashMap::new();
        border_ids.insert(BorderStyle::default(), 0);

        for style in &stylesheet.cell_styles {
            let font_id = intern(&mut table.fonts, &mut font_ids, style.effective_font());
            let fill_id = intern(&mut table.fills, &mut fill_ids, style.effective_fill());
            let border_id = intern(&mut table.borders, &mut border_ids, style.effective_border());
            let num_fmt_id = table.number_format_id(&style.effective_number_format());

            table.resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                border_id,
                num_fmt_id,
            });
        }

        // Differential formats share the custom number format ids
        for style in &stylesheet.differential_styles {
            if let Some(format) = &style.number_format {
                table.number_format_id(format);
            }
        }

        table
    }

    fn number_format_id(&mut self, format: &NumberFormat) -> u32 {
        match format {
            NumberFormat::General => 0,
            NumberFormat::BuiltIn(id) => *id,
            NumberFormat::Custom(code) => {
                if let Some(&id) = self.numfmt_ids.get(code) {
                    return id;
                }
                let id = NumberFormat::FIRST_CUSTOM_ID + self.numfmts.len() as u32;
                self.numfmt_ids.insert(code.clone(), id);
                self.numfmts.push((id, code.clone()));
                id
            }
        }
    }

    fn existing_number_format_id(&self, format: &NumberFormat) -> u32 {
        match format {
            NumberFormat::General => 0,
            NumberFormat::BuiltIn(id) => *id,
            NumberFormat::Custom(code) => self.numfmt_ids.get(code).copied().unwrap_or(0),
        }
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !self.numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", self.numfmts.len()));
            for (id, code) in &self.numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", self.fonts.len()));
        for font in &self.fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", self.fills.len()));
        for fill in &self.fills {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill, false));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", self.borders.len()));
        for border in &self.borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!(
            "\n  <cellXfs count=\"{}\">",
            self.stylesheet.cell_styles.len()
        ));
        for (style, ids) in self.stylesheet.cell_styles.iter().zip(&self.resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>"#,
        );

        let dxfs = &self.stylesheet.differential_styles;
        if dxfs.is_empty() {
            xml.push_str("\n  <dxfs count=\"0\"/>");
        } else {
            xml.push_str(&format!("\n  <dxfs count=\"{}\">", dxfs.len()));
            for style in dxfs {
                xml.push_str("\n    ");
                xml.push_str(&self.write_dxf(style));
            }
            xml.push_str("\n  </dxfs>");
        }

        xml.push_str(
            r#"
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>"#,
        );

        xml.push_str("\n</styleSheet>");
        xml
    }

    /// A differential format carries only the components that are set
    fn write_dxf(&self, style: &Style) -> String {
        let mut s = String::from("<dxf>");
        if let Some(font) = &style.font {
            s.push_str(&write_font(font));
        }
        if let Some(format) = &style.number_format {
            let id = self.existing_number_format_id(format);
            let code = match format {
                NumberFormat::Custom(code) => code.as_str(),
                NumberFormat::BuiltIn(id) => builtin_format_code(*id),
                NumberFormat::General => "General",
            };
            s.push_str(&format!(
                "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                id,
                escape_attr(code)
            ));
        }
        if let Some(fill) = &style.fill {
            s.push_str(&write_fill(fill, true));
        }
        if let Some(alignment) = &style.alignment {
            s.push_str(&write_alignment(alignment));
        }
        if let Some(border) = &style.border {
            s.push_str(&write_border(border));
        }
        if let Some(protection) = &style.protection {
            s.push_str(&write_protection(protection));
        }
        s.push_str("</dxf>");
        s
    }
}

fn intern<T: Clone + Eq + std::hash::Hash>(
    items: &mut Vec<T>,
    ids: &mut HashMap<T, u32>,
    item: T,
) -> u32 {
    if let Some(&id) = ids.get(&item) {
        return id;
    }
    let id = items.len() as u32;
    items.push(item.clone());
    ids.insert(item, id);
    id
}

/// Codes for the built-in formats a differential format may reference
fn builtin_format_code(id: u32) -> &'static str {
    match id {
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        14 => "mm-dd-yy",
        22 => "m/d/yy h:mm",
        49 => "@",
        _ => "General",
    }
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " indexed=\"64\"".to_string(),
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint } => {
            if *tint == 0 {
                format!(" theme=\"{}\"", index)
            } else {
                format!(" theme=\"{}\" tint=\"{}\"", index, (*tint as f64) / 100.0)
            }
        }
        explicit => format!(" rgb=\"{}\"", explicit.argb_hex().unwrap_or_default()),
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    format!("<{tag}{}/>", color_attrs(color))
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline.xml_value() {
        None => {}
        Some("single") => s.push_str("<u/>"),
        Some(val) => s.push_str(&format!("<u val=\"{}\"/>", val)),
    }
    if font.vertical_align != FontVerticalAlign::Baseline {
        s.push_str(&format!(
            "<vertAlign val=\"{}\"/>",
            font.vertical_align.xml_value()
        ));
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_attr(&font.name)));
    s.push_str("</font>");
    s
}

/// In differential formats a solid fill is drawn with the background color
fn write_fill(fill: &FillStyle, differential: bool) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } if differential => format!(
            "<fill><patternFill patternType=\"solid\">{}{}</patternFill></fill>",
            write_color("fgColor", color),
            write_color("bgColor", color)
        ),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => format!(
            "<fill><patternFill patternType=\"{}\">{}{}</patternFill></fill>",
            pattern.xml_value(),
            write_color("fgColor", foreground),
            write_color("bgColor", background)
        ),
    }
}

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    match edge.as_ref().and_then(|e| Some((e.style.xml_value()?, e.color))) {
        None => format!("<{tag}/>"),
        Some((style, color)) => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            style,
            write_color("color", &color)
        ),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let attrs = match border.diagonal_direction {
        DiagonalDirection::None => "",
        DiagonalDirection::Down => " diagonalDown=\"1\"",
        DiagonalDirection::Up => " diagonalUp=\"1\"",
        DiagonalDirection::Both => " diagonalDown=\"1\" diagonalUp=\"1\"",
    };

    let mut s = format!("<border{}>", attrs);
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str(&write_border_edge("diagonal", &border.diagonal));
    s.push_str("</border>");
    s
}

fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    if al == &default {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.xml_value()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.xml_value()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.shrink_to_fit {
        s.push_str(" shrinkToFit=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    if al.rotation != 0 {
        s.push_str(&format!(" textRotation=\"{}\"", al.text_rotation()));
    }
    s.push_str("/>");
    s
}

fn write_protection(p: &Protection) -> String {
    let default = Protection::default();
    if p == &default {
        return String::new();
    }
    let mut s = String::from("<protection");
    if p.locked != default.locked {
        s.push_str(&format!(" locked=\"{}\"", u8::from(p.locked)));
    }
    if p.hidden != default.hidden {
        s.push_str(&format!(" hidden=\"{}\"", u8::from(p.hidden)));
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if ids.font_id != 0 {
        attrs.push_str(" applyFont=\"1\"");
    }
    if ids.fill_id != 0 {
        attrs.push_str(" applyFill=\"1\"");
    }
    if ids.border_id != 0 {
        attrs.push_str(" applyBorder=\"1\"");
    }

    let alignment_xml = style.alignment.as_ref().map(write_alignment).unwrap_or_default();
    let protection_xml = style.protection.as_ref().map(write_protection).unwrap_or_default();
    if !alignment_xml.is_empty() {
        attrs.push_str(" applyAlignment=\"1\"");
    }
    if !protection_xml.is_empty() {
        attrs.push_str(" applyProtection=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );
    if alignment_xml.is_empty() && protection_xml.is_empty() {
        s.push_str("/>");
        return s;
    }

    s.push('>');
    s.push_str(&alignment_xml);
    s.push_str(&protection_xml);
    s.push_str("</xf>");
    s
}
