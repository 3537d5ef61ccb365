use serde::{Deserialize, Serialize};

use airhouse_core::ItemId;

use crate::order::Order;

/// Order list filter. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Only orders with a line for this inventory item.
    pub item: Option<ItemId>,
    /// Case-insensitive substring of the order reference.
    pub reference: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(item) = self.item {
            if !order.references_item(item) {
                return false;
            }
        }

        match self.reference.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => order
                .reference
                .as_deref()
                .is_some_and(|r| r.to_lowercase().contains(&needle.to_lowercase())),
            _ => true,
        }
    }
}
