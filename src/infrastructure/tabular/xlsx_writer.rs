//! XLSX Writer Module
//! Serializes a single `Sheet` into an OOXML spreadsheet workbook.
//!
//! Uses direct ZIP/XML generation: one worksheet, inline strings, a bold
//! header row and explicit column widths.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use crate::domain::error::Result;
use crate::domain::tabular::{CellValue, Sheet};

/// Worksheet name used for every export
pub const SHEET_NAME: &str = "Sheet1";

/// Style index of the bold header cells in `styles.xml`
const HEADER_STYLE: usize = 1;

pub struct XlsxWriter;

impl XlsxWriter {
    /// Serialize the sheet into workbook bytes
    pub fn write(sheet: &Sheet, widths: &[usize]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        // 1. [Content_Types].xml
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(Self::content_types_xml().as_bytes())?;

        // 2. _rels/.rels
        zip.start_file("_rels/.rels", options)?;
        zip.write_all(Self::rels_xml().as_bytes())?;

        // 3. Workbook and its relationships
        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(Self::workbook_xml().as_bytes())?;
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(Self::workbook_rels_xml().as_bytes())?;

        // 4. Styles
        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(Self::styles_xml().as_bytes())?;

        // 5. The worksheet itself
        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(Self::worksheet_xml(sheet, widths).as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn content_types_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#
            .to_string()
    }

    fn rels_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
            .to_string()
    }

    fn workbook_xml() -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
            SHEET_NAME
        )
    }

    fn workbook_rels_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
            .to_string()
    }

    fn styles_xml() -> String {
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#
            .to_string()
    }

    fn worksheet_xml(sheet: &Sheet, widths: &[usize]) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !widths.is_empty() {
            xml.push_str("<cols>");
            for (idx, width) in widths.iter().enumerate() {
                xml.push_str(&format!(
                    r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                    idx + 1,
                    width
                ));
            }
            xml.push_str("</cols>");
        }

        xml.push_str("<sheetData>");

        xml.push_str(r#"<row r="1">"#);
        for (col, header) in sheet.headers.iter().enumerate() {
            xml.push_str(&inline_string_cell(&cell_ref(col, 1), header, Some(HEADER_STYLE)));
        }
        xml.push_str("</row>");

        for (idx, row) in sheet.rows.iter().enumerate() {
            let row_number = idx + 2;
            xml.push_str(&format!(r#"<row r="{}">"#, row_number));
            for (col, value) in row.iter().enumerate() {
                let reference = cell_ref(col, row_number);
                match value {
                    CellValue::Empty => {}
                    CellValue::Number(number) => {
                        xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, number));
                    }
                    CellValue::Bool(flag) => {
                        xml.push_str(&format!(
                            r#"<c r="{}" t="b"><v>{}</v></c>"#,
                            reference,
                            if *flag { 1 } else { 0 }
                        ));
                    }
                    CellValue::Text(text) => {
                        xml.push_str(&inline_string_cell(&reference, text, None));
                    }
                }
            }
            xml.push_str("</row>");
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }
}

fn inline_string_cell(reference: &str, text: &str, style: Option<usize>) -> String {
    let style_attr = style
        .map(|s| format!(r#" s="{}""#, s))
        .unwrap_or_default();
    let space_attr = if text.trim() != text {
        r#" xml:space="preserve""#
    } else {
        ""
    };
    format!(
        r#"<c r="{}"{} t="inlineStr"><is><t{}>{}</t></is></c>"#,
        reference,
        style_attr,
        space_attr,
        escape_xml(text)
    )
}

/// A1-style reference for a zero-based column and one-based row
pub fn cell_ref(col: usize, row: usize) -> String {
    format!("{}{}", column_letters(col), row)
}

/// Zero-based column index to spreadsheet letters (0 -> A, 26 -> AA)
pub fn column_letters(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Escape special characters for XML, dropping control characters XML 1.0 forbids
fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}
