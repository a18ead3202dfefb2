// ============================================================
// CSV PARSER
// ============================================================
// Parse decoded delimited text into typed row records

use csv::{ReaderBuilder, StringRecord, Trim};

use super::TextEncoding;
use crate::domain::tabular::{
    normalize_header, CellValue, DiagnosticCode, ParseDiagnostic, ParseMeta, ParseOutcome,
    RenamedHeader, RowRecord,
};

/// CSV parser producing header-keyed row records
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Data rows kept before parsing stops
    max_rows: usize,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_rows: usize::MAX,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Stop after this many data rows
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Parse CSV content that was decoded with `encoding`.
    ///
    /// Never fails: fatal conditions yield an outcome with no rows and a
    /// single diagnostic.
    pub fn parse_content(&self, content: &str, encoding: TextEncoding) -> ParseOutcome {
        if has_unterminated_quote(content, self.delimiter) {
            return ParseOutcome::fatal(
                DiagnosticCode::MissingQuotes,
                "Quoted field unterminated",
            );
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .trim(Trim::None)
            .flexible(true) // Row length mismatches become diagnostics
            .from_reader(content.as_bytes());

        let mut headers: Option<Vec<String>> = None;
        let mut renamed_headers = Vec::new();
        let mut rows = Vec::new();
        let mut errors = Vec::new();
        let mut truncated = false;

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    return ParseOutcome::fatal(
                        DiagnosticCode::ReaderFailure,
                        format!("Failed to read CSV record: {}", e),
                    );
                }
            };

            if is_blank(&record) {
                continue;
            }

            let Some(header_row) = headers.as_ref() else {
                let (normalized, renamed) = normalize_headers(&record);
                headers = Some(normalized);
                renamed_headers = renamed;
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

            let index = rows.len();
            if let Some(diagnostic) = field_count_diagnostic(header_row.len(), record.len(), index)
            {
                errors.push(diagnostic);
            }

            rows.push(parse_row(header_row, &record));
        }

        let meta = ParseMeta {
            delimiter: (self.delimiter as char).to_string(),
            linebreak: detect_linebreak(content).to_string(),
            fields: headers.unwrap_or_default(),
            renamed_headers,
            encoding: encoding.label().to_string(),
            row_count: rows.len(),
            truncated,
        };

        ParseOutcome::new(rows, errors, meta)
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<&str> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .take(10)
            .collect();

        if sample_lines.is_empty() {
            return b',';
        }

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// Greedy blank rule: every field empty or whitespace
fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Trim and lower-case headers, renaming repeats to `name_1`, `name_2`, ...
fn normalize_headers(record: &StringRecord) -> (Vec<String>, Vec<RenamedHeader>) {
    let mut headers: Vec<String> = Vec::with_capacity(record.len());
    let mut renamed = Vec::new();

    for raw in record.iter() {
        let header = normalize_header(raw);
        if !headers.contains(&header) {
            headers.push(header);
            continue;
        }

        let mut suffix = 1;
        let mut candidate = format!("{}_{}", header, suffix);
        while headers.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", header, suffix);
        }
        renamed.push(RenamedHeader {
            original: header,
            renamed: candidate.clone(),
        });
        headers.push(candidate);
    }

    (headers, renamed)
}

/// Build one row record; missing trailing fields are absent, extras dropped
fn parse_row(headers: &[String], record: &StringRecord) -> RowRecord {
    let mut row = RowRecord::with_capacity(headers.len());
    for (header, value) in headers.iter().zip(record.iter()) {
        row.insert(header.as_str(), CellValue::classify(value));
    }
    row
}

fn field_count_diagnostic(expected: usize, actual: usize, row: usize) -> Option<ParseDiagnostic> {
    if actual < expected {
        Some(ParseDiagnostic::new(
            DiagnosticCode::TooFewFields,
            format!("Too few fields: expected {} fields but parsed {}", expected, actual),
            Some(row),
        ))
    } else if actual > expected {
        Some(ParseDiagnostic::new(
            DiagnosticCode::TooManyFields,
            format!("Too many fields: expected {} fields but parsed {}", expected, actual),
            Some(row),
        ))
    } else {
        None
    }
}

/// A quote opening a field that is never closed before end of input
fn has_unterminated_quote(content: &str, delimiter: u8) -> bool {
    let delimiter = delimiter as char;
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote ("")
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            '\n' | '\r' => at_field_start = true,
            c if c == delimiter => at_field_start = true,
            _ => at_field_start = false,
        }
    }

    in_quotes
}

fn detect_linebreak(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else if content.contains('\r') {
        "\r"
    } else {
        "\n"
    }
}
