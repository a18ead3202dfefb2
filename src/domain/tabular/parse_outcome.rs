// ============================================================
// PARSE OUTCOME
// ============================================================
// Result of one import: rows, diagnostics, and parse statistics

use serde::Serialize;

use super::RowRecord;

/// Category of a parse diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    Quotes,
    FieldMismatch,
    Limit,
    Reader,
}

/// Specific condition behind a parse diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticCode {
    MissingQuotes,
    TooFewFields,
    TooManyFields,
    FileTooLarge,
    RowLimitExceeded,
    ReaderFailure,
    SheetMissing,
}

impl DiagnosticCode {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            DiagnosticCode::MissingQuotes => DiagnosticKind::Quotes,
            DiagnosticCode::TooFewFields | DiagnosticCode::TooManyFields => {
                DiagnosticKind::FieldMismatch
            }
            DiagnosticCode::FileTooLarge | DiagnosticCode::RowLimitExceeded => {
                DiagnosticKind::Limit
            }
            DiagnosticCode::ReaderFailure | DiagnosticCode::SheetMissing => DiagnosticKind::Reader,
        }
    }
}

/// A problem encountered while parsing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseDiagnostic {
    pub kind: DiagnosticKind,
    pub code: DiagnosticCode,
    pub message: String,
    /// Zero-based data row index, when the problem belongs to a row
    pub row: Option<usize>,
}

impl ParseDiagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, row: Option<usize>) -> Self {
        Self {
            kind: code.kind(),
            code,
            message: message.into(),
            row,
        }
    }
}

/// A header that was renamed because it collided with an earlier one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedHeader {
    pub original: String,
    pub renamed: String,
}

/// Parse statistics. `ParseMeta::default()` is the empty statistics object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseMeta {
    pub delimiter: String,
    pub linebreak: String,
    /// Normalized header names, in column order
    pub fields: Vec<String>,
    pub renamed_headers: Vec<RenamedHeader>,
    /// Encoding label the returned rows were decoded with
    pub encoding: String,
    pub row_count: usize,
    /// Whether parsing stopped at the row limit
    pub truncated: bool,
}

/// Immutable result of parsing one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseOutcome {
    rows: Vec<RowRecord>,
    errors: Vec<ParseDiagnostic>,
    meta: ParseMeta,
}

impl ParseOutcome {
    pub fn new(rows: Vec<RowRecord>, errors: Vec<ParseDiagnostic>, meta: ParseMeta) -> Self {
        Self { rows, errors, meta }
    }

    /// Outcome for a fatal condition: no rows, one diagnostic, empty statistics
    pub fn fatal(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            errors: vec![ParseDiagnostic::new(code, message, None)],
            meta: ParseMeta::default(),
        }
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn errors(&self) -> &[ParseDiagnostic] {
        &self.errors
    }

    pub fn meta(&self) -> &ParseMeta {
        &self.meta
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Vec<RowRecord>, Vec<ParseDiagnostic>, ParseMeta) {
        (self.rows, self.errors, self.meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_outcome_shape() {
        let outcome = ParseOutcome::fatal(DiagnosticCode::MissingQuotes, "Unterminated quote");

        assert!(outcome.rows().is_empty());
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].kind, DiagnosticKind::Quotes);
        assert_eq!(outcome.meta(), &ParseMeta::default());
    }

    #[test]
    fn test_diagnostic_kind_follows_code() {
        let diagnostic = ParseDiagnostic::new(DiagnosticCode::TooManyFields, "extra", Some(3));
        assert_eq!(diagnostic.kind, DiagnosticKind::FieldMismatch);
        assert_eq!(diagnostic.row, Some(3));
    }
}
