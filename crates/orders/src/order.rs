use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airhouse_core::{Entity, ItemId, OrderId, OrderItemId};

/// One ordered quantity of a specific inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub item_id: ItemId,
    /// Always at least 1.
    pub quantity: i64,
}

/// Order header plus its line items.
///
/// Orders carry no owner of their own: an order belongs to whoever owns the
/// inventory items its lines reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub reference: Option<String>,
    pub date_created: DateTime<Utc>,
    pub lines: Vec<OrderItem>,
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Order {
    pub fn line(&self, id: OrderItemId) -> Option<&OrderItem> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.lines.iter().map(|l| l.item_id)
    }

    pub fn references_item(&self, item_id: ItemId) -> bool {
        self.lines.iter().any(|l| l.item_id == item_id)
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}
