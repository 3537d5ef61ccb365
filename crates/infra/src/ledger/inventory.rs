use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use airhouse_core::{ItemId, Owner};
use airhouse_inventory::{
    AdjustDirection, CreateItem, InventoryFilter, InventoryItem, ItemFields, LowStockReport,
    StockAdjustment,
};

use super::LedgerResult;
use crate::store::LedgerStore;

/// Dashboard payload: filtered items plus the low-stock subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub items: Vec<InventoryItem>,
    pub low_stock: LowStockReport,
    /// User-visible notices (the low-stock warning).
    pub messages: Vec<String>,
}

/// Restock page payload: every owned item, unfiltered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestockView {
    pub items: Vec<InventoryItem>,
    pub low_stock: LowStockReport,
}

#[derive(Clone)]
pub struct InventoryLedger {
    store: Arc<dyn LedgerStore>,
    low_quantity: i64,
}

impl InventoryLedger {
    pub fn new(store: Arc<dyn LedgerStore>, low_quantity: i64) -> Self {
        Self { store, low_quantity }
    }

    pub fn low_quantity(&self) -> i64 {
        self.low_quantity
    }

    pub async fn list(&self, owner: &Owner, filter: &InventoryFilter) -> LedgerResult<DashboardView> {
        let items = filter.apply(self.store.list_items(owner).await?);
        let low_stock = LowStockReport::from_items(&items, self.low_quantity);

        let mut messages = Vec::new();
        if let Some(warning) = low_stock.warning() {
            warn!(
                owner = %owner.user_id(),
                low_items = low_stock.count(),
                threshold = self.low_quantity,
                "{warning}"
            );
            messages.push(warning);
        }

        Ok(DashboardView {
            items,
            low_stock,
            messages,
        })
    }

    pub async fn restock_view(&self, owner: &Owner) -> LedgerResult<RestockView> {
        let items = self.store.list_items(owner).await?;
        let low_stock = LowStockReport::from_items(&items, self.low_quantity);
        Ok(RestockView { items, low_stock })
    }

    pub async fn get(&self, owner: &Owner, id: ItemId) -> LedgerResult<InventoryItem> {
        Ok(self.store.get_item(owner, id).await?)
    }

    pub async fn create(&self, owner: &Owner, fields: &ItemFields) -> LedgerResult<InventoryItem> {
        let fields = fields.validate(self.category_known(fields).await?)?;
        let item = InventoryItem::create(
            owner,
            CreateItem {
                item_id: ItemId::new(),
                fields,
                occurred_at: Utc::now(),
            },
        );

        let item = self.store.insert_item(owner, item).await?;
        info!(owner = %owner.user_id(), item_id = %item.id, quantity = item.quantity, "item created");
        Ok(item)
    }

    pub async fn update(&self, owner: &Owner, id: ItemId, fields: &ItemFields) -> LedgerResult<InventoryItem> {
        let mut item = self.store.get_item(owner, id).await?;
        let fields = fields.validate(self.category_known(fields).await?)?;
        item.apply_fields(fields);

        let item = self.store.update_item(owner, item).await?;
        info!(owner = %owner.user_id(), item_id = %item.id, "item updated");
        Ok(item)
    }

    pub async fn delete(&self, owner: &Owner, id: ItemId) -> LedgerResult<()> {
        self.store.delete_item(owner, id).await?;
        info!(owner = %owner.user_id(), item_id = %id, "item deleted");
        Ok(())
    }

    /// Increase or decrease stock; decreases clamp at zero.
    pub async fn adjust(
        &self,
        owner: &Owner,
        id: ItemId,
        direction: AdjustDirection,
        amount: i64,
    ) -> LedgerResult<InventoryItem> {
        let adjustment = StockAdjustment::new(direction, amount)?;
        let item = self.store.adjust_quantity(owner, id, adjustment).await?;
        info!(
            owner = %owner.user_id(),
            item_id = %id,
            direction = ?direction,
            amount,
            quantity = item.quantity,
            "stock adjusted"
        );
        Ok(item)
    }

    async fn category_known(&self, fields: &ItemFields) -> LedgerResult<bool> {
        match fields.category {
            Some(id) => Ok(self.store.category_exists(id).await?),
            None => Ok(true),
        }
    }
}
