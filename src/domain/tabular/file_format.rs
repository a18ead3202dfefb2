// ============================================================
// FILE FORMATS
// ============================================================
// Output formats for export and input formats for upload

use serde::{Deserialize, Serialize};

/// Format of a generated export file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// OOXML spreadsheet workbook
    #[default]
    Xlsx,

    /// Comma-delimited text
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv;charset=utf-8",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Format of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFormat {
    Delimited,
    Workbook,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

impl UploadFormat {
    /// Pick the format from the file name when it has a known extension,
    /// otherwise sniff the ZIP container signature.
    pub fn detect(file_name: Option<&str>, bytes: &[u8]) -> Self {
        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => UploadFormat::Workbook,
            Some("csv") | Some("txt") => UploadFormat::Delimited,
            _ if bytes.starts_with(ZIP_MAGIC) => UploadFormat::Workbook,
            _ => UploadFormat::Delimited,
        }
    }
}
