use serde::Serialize;

use airhouse_core::ItemId;

use crate::item::InventoryItem;

/// Items at or below the low-quantity threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockReport {
    pub threshold: i64,
    pub item_ids: Vec<ItemId>,
}

impl LowStockReport {
    /// Build the report over `items`, preserving their order.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a InventoryItem>, threshold: i64) -> Self {
        let item_ids = items
            .into_iter()
            .filter(|i| is_low_stock(i.quantity, threshold))
            .map(|i| i.id)
            .collect();
        Self { threshold, item_ids }
    }

    pub fn count(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.item_ids.contains(id)
    }

    /// User-visible warning; `None` when nothing is low.
    pub fn warning(&self) -> Option<String> {
        match self.count() {
            0 => None,
            1 => Some("1 item has low inventory.".to_string()),
            n => Some(format!("{n} items have low inventory.")),
        }
    }
}

pub fn is_low_stock(quantity: i64, threshold: i64) -> bool {
    quantity <= threshold
}
