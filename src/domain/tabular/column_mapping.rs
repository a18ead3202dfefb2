// ============================================================
// COLUMN MAPPING
// ============================================================
// Field key <-> display header pairs driving export and import

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::error::{AppError, Result};

/// One exported column: source field key and its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub key: String,
    pub header: String,
}

impl ColumnMapping {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
        }
    }
}

/// Normalize a header the way the importer keys rows: trimmed, lower-cased
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Inverse of a mapping: normalized display header (or key) -> field key
pub fn header_to_key(mapping: &[ColumnMapping]) -> HashMap<String, String> {
    let mut inverse = HashMap::with_capacity(mapping.len() * 2);
    for column in mapping {
        inverse.insert(normalize_header(&column.key), column.key.clone());
    }
    // Display headers win over keys when both normalize to the same text
    for column in mapping {
        inverse.insert(normalize_header(&column.header), column.key.clone());
    }
    inverse
}

/// Reject mappings with blank entries or repeated keys
pub fn validate_mapping(mapping: &[ColumnMapping]) -> Result<()> {
    if mapping.is_empty() {
        return Err(AppError::ValidationError(
            "Column mapping must contain at least one column".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for (idx, column) in mapping.iter().enumerate() {
        if column.key.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Column {} has an empty key",
                idx + 1
            )));
        }
        if column.header.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "Column '{}' has an empty header",
                column.key
            )));
        }
        if !seen.insert(column.key.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Column key '{}' appears more than once",
                column.key
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_to_key_uses_normalized_headers() {
        let mapping = vec![
            ColumnMapping::new("code", "Código"),
            ColumnMapping::new("description", " Descrição "),
        ];
        let inverse = header_to_key(&mapping);

        assert_eq!(inverse.get("código").map(String::as_str), Some("code"));
        assert_eq!(inverse.get("descrição").map(String::as_str), Some("description"));
        assert_eq!(inverse.get("code").map(String::as_str), Some("code"));
    }

    #[test]
    fn test_validate_mapping_rejects_duplicate_keys() {
        let mapping = vec![ColumnMapping::new("a", "A"), ColumnMapping::new("a", "Again")];
        assert!(matches!(
            validate_mapping(&mapping),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_mapping_rejects_blank_header() {
        let mapping = vec![ColumnMapping::new("a", "  ")];
        assert!(validate_mapping(&mapping).is_err());
        assert!(validate_mapping(&[]).is_err());
        assert!(validate_mapping(&[ColumnMapping::new("a", "A")]).is_ok());
    }
}
