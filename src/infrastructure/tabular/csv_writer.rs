// ============================================================
// CSV WRITER
// ============================================================
// Serialize a sheet as comma-delimited text

use csv::WriterBuilder;

use crate::domain::error::{AppError, Result};
use crate::domain::tabular::{CellValue, Sheet};

pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize headers and rows; quoting is applied only where needed
    pub fn write(&self, sheet: &Sheet) -> Result<Vec<u8>> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(&sheet.headers).map_err(export_error)?;
        for row in &sheet.rows {
            writer
                .write_record(row.iter().map(CellValue::display_text))
                .map_err(export_error)?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::ExportError(format!("Failed to flush CSV output: {}", e)))
    }
}

fn export_error(err: csv::Error) -> AppError {
    AppError::ExportError(format!("Failed to write CSV: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_sheet() {
        let sheet = Sheet {
            headers: vec!["A".to_string(), "B".to_string()],
            rows: vec![
                vec![CellValue::Number(1.0), CellValue::from("x")],
                vec![CellValue::Number(2.0), CellValue::from("y, z")],
                vec![CellValue::Empty, CellValue::Bool(false)],
            ],
        };

        let bytes = CsvWriter::new().write(&sheet).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "A,B\n1,x\n2,\"y, z\"\n,FALSE\n");
    }
}
