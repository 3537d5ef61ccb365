use serde::{Deserialize, Serialize};

use airhouse_core::CategoryId;

use crate::item::InventoryItem;

/// Dashboard filter. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of the item name.
    pub name: Option<String>,
}

impl InventoryFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(category) = self.category {
            if item.category != Some(category) {
                return false;
            }
        }

        match self.name.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => item
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    pub fn apply(&self, items: Vec<InventoryItem>) -> Vec<InventoryItem> {
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airhouse_core::{ItemId, UserId};
    use chrono::Utc;

    fn item(name: &str, category: Option<CategoryId>) -> InventoryItem {
        InventoryItem {
            id: ItemId::new(),
            owner_id: UserId::new(),
            name: name.to_string(),
            quantity: 1,
            category,
            date_created: Utc::now(),
        }
    }

    #[test]
    fn empty_filter_matches_all() {
        assert!(InventoryFilter::default().matches(&item("Bolt", None)));
    }

    #[test]
    fn name_match_ignores_case() {
        let filter = InventoryFilter {
            name: Some("BOL".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&item("Hex bolt", None)));
        assert!(!filter.matches(&item("Washer", None)));
    }

    #[test]
    fn category_must_match_exactly() {
        let tools = CategoryId::new();
        let filter = InventoryFilter {
            category: Some(tools),
            ..Default::default()
        };
        assert!(filter.matches(&item("Hammer", Some(tools))));
        assert!(!filter.matches(&item("Hammer", Some(CategoryId::new()))));
        assert!(!filter.matches(&item("Hammer", None)));
    }
}
