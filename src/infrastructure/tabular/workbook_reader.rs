// ============================================================
// WORKBOOK READER
// ============================================================
// Read the first worksheet of an .xlsx upload into row records

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};

use crate::domain::tabular::{
    normalize_header, CellValue, DiagnosticCode, ParseDiagnostic, ParseMeta, ParseOutcome,
    RowRecord,
};

/// Encoding label reported for workbook imports
pub const WORKBOOK_ENCODING: &str = "xlsx";

pub struct WorkbookReader {
    max_rows: usize,
}

impl Default for WorkbookReader {
    fn default() -> Self {
        Self {
            max_rows: usize::MAX,
        }
    }
}

impl WorkbookReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Parse workbook bytes. Like the CSV path this never fails; problems
    /// are reported through the outcome.
    pub fn parse_bytes(&self, bytes: &[u8]) -> ParseOutcome {
        let mut workbook: Xlsx<_> = match open_workbook_from_rs(Cursor::new(bytes)) {
            Ok(workbook) => workbook,
            Err(e) => {
                return ParseOutcome::fatal(
                    DiagnosticCode::ReaderFailure,
                    format!("Failed to open Excel file: {}", e),
                );
            }
        };

        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(e)) => {
                return ParseOutcome::fatal(
                    DiagnosticCode::ReaderFailure,
                    format!("Failed to read Excel range: {}", e),
                );
            }
            None => {
                return ParseOutcome::fatal(
                    DiagnosticCode::SheetMissing,
                    "No worksheet found in Excel file",
                );
            }
        };

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        let mut errors = Vec::new();
        let mut truncated = false;

        for row in range.rows() {
            if row.iter().all(is_blank_cell) {
                continue;
            }

            let Some(header_row) = headers.as_ref() else {
                headers = Some(row.iter().map(|cell| normalize_header(&cell_text(cell))).collect());
                continue;
            };

            if rows.len() >= self.max_rows {
                truncated = true;
                errors.push(ParseDiagnostic::new(
                    DiagnosticCode::RowLimitExceeded,
                    format!("Row limit of {} reached; remaining rows ignored", self.max_rows),
                    Some(rows.len()),
                ));
                break;
            }

            let mut record = RowRecord::with_capacity(header_row.len());
            for (header, cell) in header_row.iter().zip(row.iter()) {
                if header.is_empty() && is_blank_cell(cell) {
                    continue;
                }
                record.insert(header.as_str(), cell_value(cell));
            }
            rows.push(record);
        }

        let meta = ParseMeta {
            fields: headers.unwrap_or_default(),
            encoding: WORKBOOK_ENCODING.to_string(),
            row_count: rows.len(),
            truncated,
            ..ParseMeta::default()
        };

        ParseOutcome::new(rows, errors, meta)
    }
}

fn is_blank_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn cell_text(cell: &Data) -> String {
    cell.as_string()
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{}", cell))
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Empty => CellValue::Empty,
        other => CellValue::Text(format!("{}", other)),
    }
}
