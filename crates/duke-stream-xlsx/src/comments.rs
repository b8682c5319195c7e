//! Comment parts: `commentsN.xml` and the legacy VML drawing that positions
//! the comment boxes

use std::fmt::Write as _;

use crate::error::XlsxResult;
use crate::xml::{escape_text, sanitize, text_open_tag, InvalidCharacters};
use duke_stream_core::CommentBatch;

pub(crate) fn comments_xml(batch: &CommentBatch, policy: InvalidCharacters) -> XlsxResult<String> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <authors>"#,
    );

    for author in &batch.authors {
        let author = sanitize(author, policy, || "comment author".to_string())?;
        let _ = write!(xml, "<author>{}</author>", escape_text(&author));
    }
    xml.push_str("</authors>\n  <commentList>");

    for comment in &batch.comments {
        let text = sanitize(&comment.text, policy, || format!("comment on {}", comment.cell))?;
        let _ = write!(
            xml,
            "\n    <comment ref=\"{}\" authorId=\"{}\"><text><r>{}{}</t></r></text></comment>",
            comment.cell,
            comment.author_index,
            text_open_tag(&text),
            escape_text(&text)
        );
    }

    xml.push_str("\n  </commentList>\n</comments>");
    Ok(xml)
}

/// Shape ids per VML id block
const SHAPE_BLOCK: usize = 1024;

/// Number of id blocks needed for `count` shapes starting at offset 1
pub(crate) fn shape_blocks(count: usize) -> usize {
    count / SHAPE_BLOCK + 1
}

/// VML shapes for the comment boxes of one sheet
///
/// Shape ids are allocated from 1024-wide blocks starting at `first_block`;
/// the drawing claims [`shape_blocks`] consecutive blocks in its `idmap`.
pub(crate) fn vml_drawing(batch: &CommentBatch, first_block: usize) -> String {
    let blocks = (first_block..first_block + shape_blocks(batch.comments.len()))
        .map(|block| block.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let mut vml = format!(
        r#"<xml xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel">
 <o:shapelayout v:ext="edit"><o:idmap v:ext="edit" data="{}"/></o:shapelayout>
 <v:shapetype id="_x0000_t202" coordsize="21600,21600" o:spt="202" path="m,l,21600r21600,l21600,xe">
  <v:stroke joinstyle="miter"/>
  <v:path gradientshapeok="t" o:connecttype="rect"/>
 </v:shapetype>"#,
        blocks
    );

    for (i, comment) in batch.comments.iter().enumerate() {
        let shape_id = first_block * SHAPE_BLOCK + i + 1;
        // 0-based anchor coordinates
        let column = comment.cell.start_column() - 1;
        let row = comment.cell.start_row() - 1;
        let _ = write!(
            vml,
            r##"
 <v:shape id="_x0000_s{shape_id}" type="#_x0000_t202" style="position:absolute;margin-left:59.25pt;margin-top:1.5pt;width:108pt;height:59.25pt;z-index:{z};visibility:hidden" fillcolor="#ffffe1" o:insetmode="auto">
  <v:fill color2="#ffffe1"/>
  <v:shadow on="t" color="black" obscured="t"/>
  <v:path o:connecttype="none"/>
  <v:textbox style="mso-direction-alt:auto"><div style="text-align:left"></div></v:textbox>
  <x:ClientData ObjectType="Note"><x:MoveWithCells/><x:SizeWithCells/><x:Anchor>{a_col}, 15, {a_row}, 10, {b_col}, 15, {b_row}, 4</x:Anchor><x:AutoFill>False</x:AutoFill><x:Row>{row}</x:Row><x:Column>{column}</x:Column></x:ClientData>
 </v:shape>"##,
            shape_id = shape_id,
            z = i + 1,
            a_col = column + 1,
            a_row = row.saturating_sub(1),
            b_col = column + 3,
            b_row = row + 3,
            row = row,
            column = column,
        );
    }

    vml.push_str("\n</xml>");
    vml
}
