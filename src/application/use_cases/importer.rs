// ============================================================
// IMPORTER USE CASE
// ============================================================
// Orchestrate decoding, parsing, and the one-shot encoding fallback

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::domain::error::Result;
use crate::domain::tabular::{DiagnosticCode, ImportConfig, ParseOutcome, UploadFormat};
use crate::infrastructure::tabular::{CsvParser, TextEncoding, WorkbookReader, REPLACEMENT_CHAR};

/// Upload importer producing a `ParseOutcome` per file
pub struct Importer {
    config: ImportConfig,
}

impl Importer {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Parse an upload, choosing the CSV or workbook path from its name/content
    pub fn parse_upload(&self, file_name: Option<&str>, bytes: &[u8]) -> ParseOutcome {
        match UploadFormat::detect(file_name, bytes) {
            UploadFormat::Delimited => self.parse_delimited(bytes),
            UploadFormat::Workbook => self.parse_workbook(bytes),
        }
    }

    /// Read and parse a file from disk. Only the read itself can fail.
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutcome> {
        let bytes = std::fs::read(path)?;
        let file_name = path.file_name().and_then(|name| name.to_str());
        Ok(self.parse_upload(file_name, &bytes))
    }

    /// Parse delimited text: UTF-8 first, then a single Latin-1 re-parse when
    /// the decoded text or the first result carries replacement characters.
    pub fn parse_delimited(&self, bytes: &[u8]) -> ParseOutcome {
        let start = Instant::now();

        if let Some(outcome) = self.check_size(bytes) {
            return outcome;
        }

        let content = TextEncoding::Utf8.decode(bytes);
        let first = self.parse_as(&content, TextEncoding::Utf8);
        // Overflow fields never reach the outcome, so the decoded text is checked too
        let outcome = if content.contains(REPLACEMENT_CHAR) || contains_replacement(&first) {
            warn!(
                bytes = bytes.len(),
                "Replacement characters after UTF-8 decode; re-parsing as ISO-8859-1"
            );
            self.parse_as(&TextEncoding::Latin1.decode(bytes), TextEncoding::Latin1)
        } else {
            first
        };

        self.log_outcome("csv", &outcome, start);
        outcome
    }

    /// Parse the first worksheet of an .xlsx workbook
    pub fn parse_workbook(&self, bytes: &[u8]) -> ParseOutcome {
        let start = Instant::now();

        if let Some(outcome) = self.check_size(bytes) {
            return outcome;
        }

        let outcome = WorkbookReader::new()
            .with_max_rows(self.config.max_rows)
            .parse_bytes(bytes);

        self.log_outcome("xlsx", &outcome, start);
        outcome
    }

    fn parse_as(&self, content: &str, encoding: TextEncoding) -> ParseOutcome {
        let delimiter = if self.config.detect_delimiter {
            CsvParser::detect_delimiter(content)
        } else {
            match self.config.delimiter_byte() {
                Ok(delimiter) => delimiter,
                Err(e) => return ParseOutcome::fatal(DiagnosticCode::ReaderFailure, e),
            }
        };

        CsvParser::new()
            .with_delimiter(delimiter)
            .with_max_rows(self.config.max_rows)
            .parse_content(content, encoding)
    }

    fn check_size(&self, bytes: &[u8]) -> Option<ParseOutcome> {
        if bytes.len() <= self.config.max_bytes {
            return None;
        }
        warn!(
            bytes = bytes.len(),
            max_bytes = self.config.max_bytes,
            "Upload rejected: too large"
        );
        Some(ParseOutcome::fatal(
            DiagnosticCode::FileTooLarge,
            format!(
                "File is {} bytes; the limit is {} bytes",
                bytes.len(),
                self.config.max_bytes
            ),
        ))
    }

    fn log_outcome(&self, format: &str, outcome: &ParseOutcome, start: Instant) {
        if outcome.meta().truncated {
            warn!(
                format = %format,
                max_rows = self.config.max_rows,
                "Upload truncated at the row limit"
            );
        }
        info!(
            format = %format,
            rows = outcome.rows().len(),
            errors = outcome.errors().len(),
            encoding = %outcome.meta().encoding,
            truncated = outcome.meta().truncated,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Import parsed"
        );
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new(ImportConfig::default())
    }
}

/// Whole-document scan of the serialized outcome for U+FFFD
fn contains_replacement(outcome: &ParseOutcome) -> bool {
    serde_json::to_string(outcome)
        .map(|document| document.contains(REPLACEMENT_CHAR))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tabular::CellValue;

    const LATIN1_CSV: &[u8] = b"Nome,Cidade,Pa\xeds\nJo\xe3o,Bel\xe9m,Fran\xe7a\nAna,Macap\xe1,Brasil\n";

    #[test]
    fn test_well_formed_file() {
        let importer = Importer::default();
        let outcome = importer.parse_delimited(b" Code ,Description,QTY\nA1,Soro,123\nB2,abc,7\n");

        assert_eq!(outcome.rows().len(), 2);
        assert_eq!(outcome.meta().fields, vec!["code", "description", "qty"]);
        assert_eq!(outcome.rows()[0].get("qty"), Some(&CellValue::Number(123.0)));
        assert_eq!(
            outcome.rows()[1].get("description"),
            Some(&CellValue::from("abc"))
        );
        assert_eq!(outcome.meta().encoding, "utf-8");
    }

    #[test]
    fn test_latin1_fallback() {
        let importer = Importer::default();
        let outcome = importer.parse_delimited(LATIN1_CSV);

        assert_eq!(outcome.meta().encoding, "iso-8859-1");
        assert_eq!(outcome.meta().fields, vec!["nome", "cidade", "país"]);
        assert_eq!(outcome.rows()[0].get("nome"), Some(&CellValue::from("João")));
        assert_eq!(outcome.rows()[0].get("cidade"), Some(&CellValue::from("Belém")));
        assert_eq!(outcome.rows()[0].get("país"), Some(&CellValue::from("França")));

        let document = serde_json::to_string(&outcome).unwrap();
        assert!(!document.contains(REPLACEMENT_CHAR));
    }

    #[test]
    fn test_utf8_accents_do_not_trigger_fallback() {
        let importer = Importer::default();
        let outcome = importer.parse_delimited("nome\nJoão\n".as_bytes());

        assert_eq!(outcome.meta().encoding, "utf-8");
        assert_eq!(outcome.rows()[0].get("nome"), Some(&CellValue::from("João")));
    }

    #[test]
    fn test_single_bad_byte_reparses_whole_file() {
        // Valid UTF-8 accents plus one stray Latin-1 byte on the last line
        let mut bytes = "nome\nJoão\n".as_bytes().to_vec();
        bytes.extend_from_slice(b"Fran\xe7a\n");

        let outcome = Importer::default().parse_delimited(&bytes);

        assert_eq!(outcome.meta().encoding, "iso-8859-1");
        // The whole file went through Latin-1, so the UTF-8 pair is now mojibake
        assert_eq!(outcome.rows()[0].get("nome"), Some(&CellValue::from("JoÃ£o")));
        assert_eq!(outcome.rows()[1].get("nome"), Some(&CellValue::from("França")));
    }

    #[test]
    fn test_bad_byte_in_overflow_field_triggers_fallback() {
        let outcome = Importer::default().parse_delimited(b"a,b\n1,2,Fran\xe7a\n");

        assert_eq!(outcome.meta().encoding, "iso-8859-1");
        assert_eq!(outcome.rows().len(), 1);
        assert_eq!(outcome.errors()[0].code, DiagnosticCode::TooManyFields);
    }

    #[test]
    fn test_blank_lines_do_not_create_rows() {
        let outcome = Importer::default().parse_delimited(b"a,b\n1,2\n\n,\n  ,  \n3,4\n");
        assert_eq!(outcome.rows().len(), 2);
    }

    #[test]
    fn test_malformed_quoting_is_reported_not_raised() {
        let outcome = Importer::default().parse_delimited(b"a,b\n\"unterminated,1\n");

        assert!(outcome.rows().is_empty());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].code, DiagnosticCode::MissingQuotes);
        assert!(outcome.meta().fields.is_empty());
    }

    #[test]
    fn test_size_ceiling() {
        let importer = Importer::new(ImportConfig::default().with_max_bytes(8));
        let outcome = importer.parse_delimited(b"a,b\n1,2\n3,4\n");

        assert!(outcome.rows().is_empty());
        assert_eq!(outcome.errors()[0].code, DiagnosticCode::FileTooLarge);
    }

    #[test]
    fn test_delimiter_detection_when_enabled() {
        let importer = Importer::new(ImportConfig::default().with_delimiter_detection(true));
        let outcome = importer.parse_delimited(b"a;b\n1;2\n");

        assert_eq!(outcome.meta().delimiter, ";");
        assert_eq!(outcome.rows()[0].get("b"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_parse_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estoque.csv");
        std::fs::write(&path, LATIN1_CSV).unwrap();

        let outcome = Importer::default().parse_file(&path).unwrap();
        assert_eq!(outcome.rows().len(), 2);
        assert!(Importer::default()
            .parse_file(&dir.path().join("missing.csv"))
            .is_err());
    }
}
