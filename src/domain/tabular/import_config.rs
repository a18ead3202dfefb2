// ============================================================
// IMPORT CONFIGURATION
// ============================================================
// Limits and dialect settings applied to every import

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration for tabular imports
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ImportConfig {
    /// Field delimiter (default: ',')
    pub delimiter: char,

    /// Sniff the delimiter from the first lines instead of using `delimiter`
    pub detect_delimiter: bool,

    /// Largest accepted upload in bytes (default: 10 MiB)
    #[validate(range(min = 1))]
    pub max_bytes: usize,

    /// Data rows kept before parsing stops (default: 50 000)
    #[validate(range(min = 1))]
    pub max_rows: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            detect_delimiter: false,
            max_bytes: 10 * 1024 * 1024,
            max_rows: 50_000,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_delimiter_detection(mut self, detect: bool) -> Self {
        self.detect_delimiter = detect;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8, String> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(format!("delimiter '{}' must be an ASCII character", self.delimiter))
        }
    }
}
