// ============================================================
// MATCH REVIEW USE CASE
// ============================================================
// Suggestions per RFP item, human accept/reject, and review sheet rows

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::error::{AppError, Result};
use crate::domain::rfp::{MatchStatus, MatchSuggestion, RfpItem, SuggestionView};
use crate::domain::session::UserSession;
use crate::domain::tabular::RowRecord;
use crate::infrastructure::store::RecordStore;

pub struct MatchReview {
    store: Arc<dyn RecordStore>,
}

impl MatchReview {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn items(&self, rfp_id: Uuid) -> Result<Vec<RfpItem>> {
        self.store.list_rfp_items(rfp_id).await
    }

    /// Suggestions for one item, best score first, with their catalog product
    pub async fn suggestions(&self, rfp_item_id: i64) -> Result<Vec<SuggestionView>> {
        if self.store.get_rfp_item(rfp_item_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "RFP item {} not found",
                rfp_item_id
            )));
        }
        self.views(rfp_item_id).await
    }

    pub async fn review(
        &self,
        suggestion_id: i64,
        status: MatchStatus,
        reviewer: &UserSession,
    ) -> Result<MatchSuggestion> {
        if status == MatchStatus::Pending {
            return Err(AppError::ValidationError(
                "A review must accept or reject the suggestion".to_string(),
            ));
        }

        let updated = self
            .store
            .update_suggestion_status(suggestion_id, status, &reviewer.user_id)
            .await?;

        info!(
            suggestion_id,
            status = status.as_str(),
            reviewer = %reviewer.user_id,
            "Match suggestion reviewed"
        );
        Ok(updated)
    }

    /// One row per suggestion; items without suggestions still get a row
    pub async fn review_rows(&self, rfp_id: Uuid) -> Result<Vec<RowRecord>> {
        let mut rows = Vec::new();
        for item in self.store.list_rfp_items(rfp_id).await? {
            let views = self.views(item.id).await?;
            if views.is_empty() {
                rows.push(unmatched_row(&item));
            }
            rows.extend(views.iter().map(|view| view.to_row(&item)));
        }
        Ok(rows)
    }

    async fn views(&self, rfp_item_id: i64) -> Result<Vec<SuggestionView>> {
        let suggestions = self.store.list_suggestions(rfp_item_id).await?;
        let mut views = Vec::with_capacity(suggestions.len());
        for suggestion in suggestions {
            let inventory = self.store.get_inventory(suggestion.inventory_id).await?;
            views.push(SuggestionView {
                suggestion,
                inventory,
            });
        }
        Ok(views)
    }
}

fn unmatched_row(item: &RfpItem) -> RowRecord {
    RowRecord::new()
        .with("line_number", i64::from(item.line_number))
        .with("rfp_description", item.description.clone())
        .with("quantity", item.quantity)
}
