// ============================================================
// TABULAR DOMAIN LAYER
// ============================================================
// Core types and value objects for import and export
// No I/O, no async

mod cell_value;
mod column_mapping;
mod file_format;
mod import_config;
mod parse_outcome;
mod row_record;
mod sheet;

pub use cell_value::{format_number, CellValue};
pub use column_mapping::{header_to_key, normalize_header, validate_mapping, ColumnMapping};
pub use file_format::{ExportFormat, UploadFormat};
pub use import_config::ImportConfig;
pub use parse_outcome::{
    DiagnosticCode, DiagnosticKind, ParseDiagnostic, ParseMeta, ParseOutcome, RenamedHeader,
};
pub use row_record::RowRecord;
pub use sheet::{Sheet, COLUMN_WIDTH_PADDING, MAX_COLUMN_WIDTH};
