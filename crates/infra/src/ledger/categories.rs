use std::sync::Arc;

use tracing::info;

use airhouse_core::CategoryId;
use airhouse_inventory::{Category, CreateCategory};

use super::LedgerResult;
use crate::store::LedgerStore;

/// Categories are shared by every user.
#[derive(Clone)]
pub struct CategoryLedger {
    store: Arc<dyn LedgerStore>,
}

impl CategoryLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, name: &str) -> LedgerResult<Category> {
        let category = Category::create(CreateCategory {
            category_id: CategoryId::new(),
            name: name.to_string(),
        })?;
        let category = self.store.insert_category(category).await?;
        info!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn list(&self) -> LedgerResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use crate::store::InMemoryLedgerStore;
    use airhouse_core::DomainError;

    #[tokio::test]
    async fn created_categories_are_listed_in_creation_order() {
        let ledger = CategoryLedger::new(Arc::new(InMemoryLedgerStore::new()));
        ledger.create("Tools").await.unwrap();
        ledger.create("Tools").await.unwrap();
        ledger.create("Paint").await.unwrap();

        let names: Vec<String> = ledger.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Tools", "Tools", "Paint"]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let ledger = CategoryLedger::new(Arc::new(InMemoryLedgerStore::new()));
        let err = ledger.create("  ").await.unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));
    }
}
