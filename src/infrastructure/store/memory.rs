use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RecordStore;
use crate::domain::error::{AppError, Result};
use crate::domain::inventory::InventoryItem;
use crate::domain::rfp::{MatchStatus, MatchSuggestion, RfpItem};

#[derive(Default)]
struct Tables {
    inventory: Vec<InventoryItem>,
    rfp_items: Vec<RfpItem>,
    suggestions: Vec<MatchSuggestion>,
}

/// Process-local record store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load RFP items and their suggestions produced elsewhere
    pub async fn seed_requests(&self, items: Vec<RfpItem>, suggestions: Vec<MatchSuggestion>) {
        let mut tables = self.tables.write().await;
        tables.rfp_items.extend(items);
        tables.suggestions.extend(suggestions);
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_inventory(&self) -> Result<Vec<InventoryItem>> {
        let tables = self.tables.read().await;
        let mut items = tables.inventory.clone();
        items.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(items)
    }

    async fn get_inventory(&self, id: Uuid) -> Result<Option<InventoryItem>> {
        let tables = self.tables.read().await;
        Ok(tables.inventory.iter().find(|item| item.id == id).cloned())
    }

    async fn upsert_inventory(&self, items: Vec<InventoryItem>) -> Result<usize> {
        let mut tables = self.tables.write().await;
        let codes: HashSet<String> = items.iter().map(|item| item.code.clone()).collect();
        for mut item in items {
            match tables
                .inventory
                .iter_mut()
                .find(|existing| existing.code == item.code)
            {
                Some(existing) => {
                    // Keep the identifier suggestions already point at
                    item.id = existing.id;
                    *existing = item;
                }
                None => tables.inventory.push(item),
            }
        }
        Ok(codes.len())
    }

    async fn list_rfp_items(&self, rfp_id: Uuid) -> Result<Vec<RfpItem>> {
        let tables = self.tables.read().await;
        let mut items: Vec<RfpItem> = tables
            .rfp_items
            .iter()
            .filter(|item| item.rfp_id == rfp_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.line_number);
        Ok(items)
    }

    async fn get_rfp_item(&self, id: i64) -> Result<Option<RfpItem>> {
        let tables = self.tables.read().await;
        Ok(tables.rfp_items.iter().find(|item| item.id == id).cloned())
    }

    async fn list_suggestions(&self, rfp_item_id: i64) -> Result<Vec<MatchSuggestion>> {
        let tables = self.tables.read().await;
        let mut suggestions: Vec<MatchSuggestion> = tables
            .suggestions
            .iter()
            .filter(|suggestion| suggestion.rfp_item_id == rfp_item_id)
            .cloned()
            .collect();
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(suggestions)
    }

    async fn get_suggestion(&self, id: i64) -> Result<Option<MatchSuggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.suggestions.iter().find(|s| s.id == id).cloned())
    }

    async fn update_suggestion_status(
        &self,
        id: i64,
        status: MatchStatus,
        reviewer: &str,
    ) -> Result<MatchSuggestion> {
        let mut tables = self.tables.write().await;
        let suggestion = tables
            .suggestions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Match suggestion {} not found", id)))?;

        suggestion.status = status;
        suggestion.reviewed_by = Some(reviewer.to_string());
        suggestion.reviewed_at = Some(Utc::now());
        Ok(suggestion.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(id: i64, rfp_item_id: i64, score: f64) -> MatchSuggestion {
        MatchSuggestion {
            id,
            rfp_item_id,
            inventory_id: Uuid::new_v4(),
            score,
            status: MatchStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_code_and_keeps_id() {
        let store = InMemoryRecordStore::new();
        let original = InventoryItem::new("MED-1", "Dipirona 500mg");
        let original_id = original.id;
        store.upsert_inventory(vec![original]).await.unwrap();

        let mut updated = InventoryItem::new("MED-1", "Dipirona sódica 500mg");
        updated.stock = Some(40.0);
        store.upsert_inventory(vec![updated]).await.unwrap();

        let items = store.list_inventory().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, original_id);
        assert_eq!(items[0].description, "Dipirona sódica 500mg");
        assert_eq!(items[0].stock, Some(40.0));
    }

    #[tokio::test]
    async fn test_upsert_counts_distinct_codes() {
        let store = InMemoryRecordStore::new();
        let written = store
            .upsert_inventory(vec![
                InventoryItem::new("MED-1", "Dipirona"),
                InventoryItem::new("MED-2", "Luva"),
                InventoryItem::new("MED-1", "Dipirona sódica"),
            ])
            .await
            .unwrap();

        assert_eq!(written, 2);
        let items = store.list_inventory().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].description, "Dipirona sódica");
    }

    #[tokio::test]
    async fn test_suggestions_sorted_by_score() {
        let store = InMemoryRecordStore::new();
        store
            .seed_requests(
                Vec::new(),
                vec![suggestion(1, 7, 0.4), suggestion(2, 7, 0.9), suggestion(3, 8, 1.0)],
            )
            .await;

        let suggestions = store.list_suggestions(7).await.unwrap();
        let ids: Vec<i64> = suggestions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_update_suggestion_status() {
        let store = InMemoryRecordStore::new();
        store.seed_requests(Vec::new(), vec![suggestion(1, 7, 0.4)]).await;

        let updated = store
            .update_suggestion_status(1, MatchStatus::Accepted, "u-2")
            .await
            .unwrap();
        assert_eq!(updated.status, MatchStatus::Accepted);
        assert_eq!(updated.reviewed_by.as_deref(), Some("u-2"));
        assert!(updated.reviewed_at.is_some());

        assert!(matches!(
            store.update_suggestion_status(99, MatchStatus::Rejected, "u-2").await,
            Err(AppError::NotFound(_))
        ));
    }
}
