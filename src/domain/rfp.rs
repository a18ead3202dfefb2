use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::inventory::InventoryItem;
use crate::domain::tabular::{ColumnMapping, RowRecord};

/// One requested line of a procurement request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfpItem {
    pub id: i64,
    pub rfp_id: Uuid,
    pub line_number: i32,
    pub description: String,
    pub quantity: f64,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
        }
    }
}

/// An externally computed pairing of an RFP item with a catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSuggestion {
    pub id: i64,
    pub rfp_item_id: i64,
    pub inventory_id: Uuid,
    /// Similarity score in [0, 1]
    pub score: f64,
    pub status: MatchStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// A suggestion with the catalog product it points at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionView {
    #[serde(flatten)]
    pub suggestion: MatchSuggestion,
    pub inventory: Option<InventoryItem>,
}

impl SuggestionView {
    /// Flatten into an exportable row alongside its RFP item
    pub fn to_row(&self, item: &RfpItem) -> RowRecord {
        let inventory = self.inventory.as_ref();
        RowRecord::new()
            .with("line_number", i64::from(item.line_number))
            .with("rfp_description", item.description.clone())
            .with("quantity", item.quantity)
            .with("inventory_code", inventory.map(|inv| inv.code.clone()))
            .with(
                "inventory_description",
                inventory.map(|inv| inv.description.clone()),
            )
            .with("score", self.suggestion.score)
            .with("status", self.suggestion.status.as_str())
            .with("reviewed_by", self.suggestion.reviewed_by.clone())
    }
}

/// Columns of the match review spreadsheet
pub fn match_review_columns() -> Vec<ColumnMapping> {
    vec![
        ColumnMapping::new("line_number", "Item"),
        ColumnMapping::new("rfp_description", "Descrição solicitada"),
        ColumnMapping::new("quantity", "Quantidade"),
        ColumnMapping::new("inventory_code", "Código"),
        ColumnMapping::new("inventory_description", "Produto sugerido"),
        ColumnMapping::new("score", "Similaridade"),
        ColumnMapping::new("status", "Status"),
        ColumnMapping::new("reviewed_by", "Revisado por"),
    ]
}
