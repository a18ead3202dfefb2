use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::tabular::{ColumnMapping, RowRecord};

/// A pharmaceutical product offered in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    /// Catalog code, unique within the catalog
    pub code: String,
    pub description: String,
    pub unit: Option<String>,
    pub manufacturer: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<f64>,
}

impl InventoryItem {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            description: description.into(),
            unit: None,
            manufacturer: None,
            price: None,
            stock: None,
        }
    }

    pub fn to_row(&self) -> RowRecord {
        RowRecord::new()
            .with("id", self.id.to_string())
            .with("code", self.code.clone())
            .with("description", self.description.clone())
            .with("unit", self.unit.clone())
            .with("manufacturer", self.manufacturer.clone())
            .with("price", self.price)
            .with("stock", self.stock)
    }
}

/// Columns of the catalog spreadsheet, shared by import and export
pub fn inventory_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("code", "Código"),
        ColumnMapping::new("description", "Descrição"),
        ColumnMapping::new("unit", "Unidade"),
        ColumnMapping::new("manufacturer", "Fabricante"),
        ColumnMapping::new("price", "Preço"),
        ColumnMapping::new("stock", "Estoque"),
    ]
}
