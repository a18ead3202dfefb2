// ============================================================
// TABULAR INFRASTRUCTURE LAYER
// ============================================================
// Decoding, CSV/XLSX parsing, and CSV/XLSX serialization

mod csv_parser;
mod csv_writer;
mod text_decoder;
mod workbook_reader;
mod xlsx_writer;

pub use csv_parser::CsvParser;
pub use csv_writer::CsvWriter;
pub use text_decoder::{TextEncoding, REPLACEMENT_CHAR};
pub use workbook_reader::{WorkbookReader, WORKBOOK_ENCODING};
pub use xlsx_writer::{cell_ref, column_letters, XlsxWriter, SHEET_NAME};
