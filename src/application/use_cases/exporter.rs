// ============================================================
// EXPORTER USE CASE
// ============================================================
// Project rows through a column mapping and serialize as XLSX or CSV

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::{ColumnMapping, ExportFormat, RowRecord, Sheet};
use crate::infrastructure::storage::{ExportFile, FileSink};
use crate::infrastructure::tabular::{CsvWriter, XlsxWriter};

/// Turns row records into downloadable files
#[derive(Debug, Default, Clone, Copy)]
pub struct Exporter;

impl Exporter {
    pub fn new() -> Self {
        Self
    }

    /// Build the file for today's (UTC) date
    pub fn render(
        &self,
        rows: &[RowRecord],
        mapping: &[ColumnMapping],
        base_name: &str,
        format: ExportFormat,
    ) -> Result<ExportFile> {
        self.render_on(rows, mapping, base_name, format, Utc::now().date_naive())
    }

    /// Build the file as if generated on `date`
    pub fn render_on(
        &self,
        rows: &[RowRecord],
        mapping: &[ColumnMapping],
        base_name: &str,
        format: ExportFormat,
        date: NaiveDate,
    ) -> Result<ExportFile> {
        let sheet = Sheet::project(rows, mapping);

        let bytes = match format {
            ExportFormat::Xlsx => XlsxWriter::write(&sheet, &sheet.column_widths())?,
            ExportFormat::Csv => CsvWriter::new().write(&sheet)?,
        };

        let file = ExportFile {
            file_name: export_file_name(base_name, format, date),
            mime_type: format.mime_type(),
            bytes,
        };

        info!(
            file_name = %file.file_name,
            rows = sheet.row_count(),
            columns = sheet.column_count(),
            bytes = file.bytes.len(),
            "Export generated"
        );

        Ok(file)
    }

    /// Render and hand the file to the host's save mechanism
    pub fn export(
        &self,
        rows: &[RowRecord],
        mapping: &[ColumnMapping],
        base_name: &str,
        format: ExportFormat,
        sink: &dyn FileSink,
    ) -> Result<String> {
        let file = self.render(rows, mapping, base_name, format)?;
        sink.save(&file)
    }
}

/// `{base}-{YYYY-MM-DD}.{ext}`
pub fn export_file_name(base_name: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}-{}.{}",
        base_name,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Caller-supplied base names end up in a `Content-Disposition` header
pub fn validate_base_name(base_name: &str) -> Result<()> {
    let invalid = base_name
        .chars()
        .any(|c| c.is_control() || matches!(c, '"' | '/' | '\\'));
    if base_name.trim().is_empty() || invalid {
        return Err(AppError::ValidationError(format!(
            "Invalid export file name: {:?}",
            base_name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tabular::CellValue;
    use crate::infrastructure::storage::DirectorySink;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use regex::Regex;
    use std::io::Cursor;

    fn sample_rows() -> Vec<RowRecord> {
        vec![
            RowRecord::new().with("a", 1.0).with("b", "x").with("ignored", "zzz"),
            RowRecord::new().with("ignored", true).with("b", "y").with("a", 2.0),
        ]
    }

    fn sample_mapping() -> Vec<ColumnMapping> {
        vec![ColumnMapping::new("a", "A"), ColumnMapping::new("b", "B")]
    }

    #[test]
    fn test_csv_export_projects_columns() {
        let file = Exporter::new()
            .render(&sample_rows(), &sample_mapping(), "report", ExportFormat::Csv)
            .unwrap();

        assert_eq!(String::from_utf8(file.bytes).unwrap(), "A,B\n1,x\n2,y\n");
        assert_eq!(file.mime_type, "text/csv;charset=utf-8");
    }

    #[test]
    fn test_xlsx_export_projects_columns() {
        let file = Exporter::new()
            .render(&sample_rows(), &sample_mapping(), "report", ExportFormat::Xlsx)
            .unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(file.bytes)).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        let cells: Vec<Vec<Data>> = range.rows().map(|row| row.to_vec()).collect();

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], vec![Data::String("A".into()), Data::String("B".into())]);
        assert_eq!(cells[1], vec![Data::Float(1.0), Data::String("x".into())]);
        assert_eq!(cells[2], vec![Data::Float(2.0), Data::String("y".into())]);
        assert_eq!(
            file.mime_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn test_xlsx_width_follows_long_header() {
        let rows = vec![RowRecord::new().with("q", 5.0)];
        let mapping = vec![ColumnMapping::new("q", "Quantidade solicitada")];
        let sheet = Sheet::project(&rows, &mapping);
        assert_eq!(sheet.column_widths(), vec![23]);

        let file = Exporter::new()
            .render(&rows, &mapping, "w", ExportFormat::Xlsx)
            .unwrap();
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(file.bytes)).unwrap();
        let range = workbook.worksheet_range_at(0).unwrap().unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(5.0)));
    }

    #[test]
    fn test_file_name_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            export_file_name("estoque", ExportFormat::Xlsx, date),
            "estoque-2024-03-07.xlsx"
        );

        let pattern = Regex::new(r"^estoque-\d{4}-\d{2}-\d{2}\.(xlsx|csv)$").unwrap();
        for format in [ExportFormat::Xlsx, ExportFormat::Csv] {
            let file = Exporter::new()
                .render(&sample_rows(), &sample_mapping(), "estoque", format)
                .unwrap();
            assert!(pattern.is_match(&file.file_name), "{}", file.file_name);
            assert!(file
                .file_name
                .contains(&Utc::now().date_naive().format("%Y-%m-%d").to_string()));
        }
    }

    #[test]
    fn test_base_name_validation() {
        assert!(validate_base_name("catalogo-2024").is_ok());
        assert!(validate_base_name("estoque farmácia").is_ok());

        for bad in ["", "  ", "bad\nname", "a\"b", "../etc", "dir\\file", "tab\there"] {
            assert!(
                matches!(validate_base_name(bad), Err(AppError::ValidationError(_))),
                "{:?}",
                bad
            );
        }
    }

    #[test]
    fn test_missing_fields_export_as_empty_cells() {
        let rows = vec![RowRecord::new().with("b", CellValue::Empty)];
        let file = Exporter::new()
            .render(&rows, &sample_mapping(), "sparse", ExportFormat::Csv)
            .unwrap();

        assert_eq!(String::from_utf8(file.bytes).unwrap(), "A,B\n,\n");
    }

    #[test]
    fn test_export_hands_file_to_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        let saved = Exporter::new()
            .export(&sample_rows(), &sample_mapping(), "report", ExportFormat::Csv, &sink)
            .unwrap();

        let written = std::fs::read_to_string(&saved).unwrap();
        assert_eq!(written, "A,B\n1,x\n2,y\n");
    }
}
