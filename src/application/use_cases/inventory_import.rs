// ============================================================
// INVENTORY IMPORT USE CASE
// ============================================================
// Turn a parsed catalog upload into inventory items and upsert them

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::error::Result;
use crate::domain::inventory::{inventory_columns, InventoryItem};
use crate::domain::tabular::{header_to_key, CellValue, ParseDiagnostic, ParseOutcome, RowRecord};
use crate::infrastructure::store::RecordStore;

/// A data row that could not become an inventory item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowIssue {
    /// 1-based position among the parsed data rows
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<RowIssue>,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub encoding: String,
}

pub struct InventoryImport {
    store: Arc<dyn RecordStore>,
}

impl InventoryImport {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn import(&self, outcome: ParseOutcome) -> Result<ImportReport> {
        let (rows, diagnostics, meta) = outcome.into_parts();
        let (items, skipped) = map_rows(&rows);

        let imported = if items.is_empty() {
            0
        } else {
            self.store.upsert_inventory(items).await?
        };

        if !skipped.is_empty() {
            warn!(skipped = skipped.len(), "Inventory rows skipped");
        }
        info!(
            imported,
            skipped = skipped.len(),
            diagnostics = diagnostics.len(),
            encoding = %meta.encoding,
            "Inventory import finished"
        );

        Ok(ImportReport {
            imported,
            skipped,
            diagnostics,
            encoding: meta.encoding,
        })
    }
}

/// Map parsed rows onto catalog fields. Column names may be the export
/// headers ("Código") or the field keys ("code").
pub fn map_rows(rows: &[RowRecord]) -> (Vec<InventoryItem>, Vec<RowIssue>) {
    let lookup = header_to_key(&inventory_columns());
    let mut items = Vec::with_capacity(rows.len());
    let mut issues = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        match row_to_item(row, &lookup) {
            Ok(item) => items.push(item),
            Err(reason) => issues.push(RowIssue {
                row: idx + 1,
                reason,
            }),
        }
    }

    (items, issues)
}

fn row_to_item(
    row: &RowRecord,
    lookup: &HashMap<String, String>,
) -> std::result::Result<InventoryItem, String> {
    let mut fields: HashMap<&str, &CellValue> = HashMap::new();
    for (column, value) in row.iter() {
        if let Some(key) = lookup.get(column) {
            fields.entry(key.as_str()).or_insert(value);
        }
    }

    let text = |key: &str| fields.get(key).and_then(|value| cell_text(value));

    let code = text("code").ok_or_else(|| "Missing code".to_string())?;
    let description = text("description").ok_or_else(|| "Missing description".to_string())?;

    let mut item = InventoryItem::new(code, description);
    item.unit = text("unit");
    item.manufacturer = text("manufacturer");
    item.price = cell_number(fields.get("price").copied(), "price")?;
    item.stock = cell_number(fields.get("stock").copied(), "stock")?;
    Ok(item)
}

fn cell_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Empty => None,
        other => {
            let text = other.display_text();
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
    }
}

/// Numbers may arrive classified already or as text with a decimal comma
fn cell_number(value: Option<&CellValue>, field: &str) -> std::result::Result<Option<f64>, String> {
    match value {
        None | Some(CellValue::Empty) => Ok(None),
        Some(CellValue::Number(number)) => Ok(Some(*number)),
        Some(CellValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(CellValue::Text(text)) => text
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| format!("Invalid {}: {}", field, text.trim())),
        Some(other) => Err(format!("Invalid {}: {}", field, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::importer::Importer;
    use crate::infrastructure::store::InMemoryRecordStore;

    fn row(pairs: &[(&str, CellValue)]) -> RowRecord {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_maps_export_headers_and_keys() {
        let rows = vec![
            row(&[
                ("código", CellValue::from("A1")),
                ("descrição", CellValue::from("Dipirona 500mg")),
                ("preço", CellValue::Number(2.5)),
            ]),
            row(&[
                ("code", CellValue::Number(1020.0)),
                ("description", CellValue::from("Soro fisiológico")),
                ("stock", CellValue::from("12,5")),
                ("unidade", CellValue::from("FR")),
            ]),
        ];

        let (items, issues) = map_rows(&rows);

        assert!(issues.is_empty());
        assert_eq!(items[0].code, "A1");
        assert_eq!(items[0].price, Some(2.5));
        assert_eq!(items[1].code, "1020");
        assert_eq!(items[1].stock, Some(12.5));
        assert_eq!(items[1].unit.as_deref(), Some("FR"));
    }

    #[test]
    fn test_invalid_rows_are_reported() {
        let rows = vec![
            row(&[("code", CellValue::from("A1"))]),
            row(&[
                ("code", CellValue::from("B2")),
                ("description", CellValue::from("Luva")),
                ("price", CellValue::from("caro")),
            ]),
            row(&[
                ("code", CellValue::Empty),
                ("description", CellValue::from("Seringa")),
            ]),
            row(&[
                ("code", CellValue::from("C3")),
                ("description", CellValue::from("Gaze")),
            ]),
        ];

        let (items, issues) = map_rows(&rows);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].code, "C3");
        assert_eq!(
            issues,
            vec![
                RowIssue { row: 1, reason: "Missing description".into() },
                RowIssue { row: 2, reason: "Invalid price: caro".into() },
                RowIssue { row: 3, reason: "Missing code".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_import_upserts_valid_rows() {
        let store = Arc::new(InMemoryRecordStore::new());
        let use_case = InventoryImport::new(store.clone());
        let outcome = Importer::default()
            .parse_delimited("Código,Descrição,Preço\nA1,Dipirona,2.5\nB2,,3\n".as_bytes());

        let report = use_case.import(outcome).await.unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.encoding, "utf-8");
        let stored = store.list_inventory().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].description, "Dipirona");
    }

    #[tokio::test]
    async fn test_fatal_outcome_imports_nothing() {
        let store = Arc::new(InMemoryRecordStore::new());
        let use_case = InventoryImport::new(store.clone());
        let outcome = Importer::default().parse_delimited(b"code\n\"open,1\n");

        let report = use_case.import(outcome).await.unwrap();

        assert_eq!(report.imported, 0);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(store.list_inventory().await.unwrap().is_empty());
    }
}
