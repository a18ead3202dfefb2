pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::error::Result;
use crate::domain::inventory::InventoryItem;
use crate::domain::rfp::{MatchStatus, MatchSuggestion, RfpItem};

pub use memory::InMemoryRecordStore;

/// Structured-data store holding the catalog, RFP items and match suggestions
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_inventory(&self) -> Result<Vec<InventoryItem>>;

    async fn get_inventory(&self, id: Uuid) -> Result<Option<InventoryItem>>;

    /// Insert or replace items by catalog code; returns how many distinct codes were written
    async fn upsert_inventory(&self, items: Vec<InventoryItem>) -> Result<usize>;

    async fn list_rfp_items(&self, rfp_id: Uuid) -> Result<Vec<RfpItem>>;

    async fn get_rfp_item(&self, id: i64) -> Result<Option<RfpItem>>;

    async fn list_suggestions(&self, rfp_item_id: i64) -> Result<Vec<MatchSuggestion>>;

    async fn get_suggestion(&self, id: i64) -> Result<Option<MatchSuggestion>>;

    async fn update_suggestion_status(
        &self,
        id: i64,
        status: MatchStatus,
        reviewer: &str,
    ) -> Result<MatchSuggestion>;
}
