//! Ownership-scoped storage boundary for categories, items and orders.
//!
//! Every item and order accessor takes an [`Owner`]; rows belonging to other
//! users behave exactly like rows that do not exist.

pub mod error;
pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use airhouse_core::{CategoryId, ItemId, OrderId, Owner};
use airhouse_inventory::{Category, InventoryItem, StockAdjustment};
use airhouse_orders::{Order, OrderFilter};

pub use error::{StoreError, StoreResult};
pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;

#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_category(&self, category: Category) -> StoreResult<Category>;

    /// All categories, ordered by id.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn category_exists(&self, id: CategoryId) -> StoreResult<bool>;

    /// Insert a new item. `NotFound` unless `item.owner_id` is the owner.
    async fn insert_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem>;

    async fn get_item(&self, owner: &Owner, id: ItemId) -> StoreResult<InventoryItem>;

    /// All items of `owner`, ordered by id.
    async fn list_items(&self, owner: &Owner) -> StoreResult<Vec<InventoryItem>>;

    /// Overwrite an existing owned item.
    async fn update_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem>;

    /// Delete an owned item, its order lines, and any order left without lines.
    async fn delete_item(&self, owner: &Owner, id: ItemId) -> StoreResult<()>;

    /// Apply a stock adjustment as one atomic read-modify-write.
    async fn adjust_quantity(
        &self,
        owner: &Owner,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> StoreResult<InventoryItem>;

    /// Insert an order with its full line set. `NotFound` if any line points
    /// at an item the owner does not hold.
    async fn insert_order(&self, owner: &Owner, order: Order) -> StoreResult<Order>;

    async fn get_order(&self, owner: &Owner, id: OrderId) -> StoreResult<Order>;

    /// Orders visible to `owner` that match `filter`, ordered by id, each once.
    async fn list_orders(&self, owner: &Owner, filter: &OrderFilter) -> StoreResult<Vec<Order>>;

    /// Replace header and line set of a visible order atomically.
    async fn replace_order(&self, owner: &Owner, order: Order) -> StoreResult<Order>;

    /// Delete a visible order and its lines.
    async fn delete_order(&self, owner: &Owner, id: OrderId) -> StoreResult<()>;
}

#[async_trait::async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn insert_category(&self, category: Category) -> StoreResult<Category> {
        (**self).insert_category(category).await
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        (**self).list_categories().await
    }

    async fn category_exists(&self, id: CategoryId) -> StoreResult<bool> {
        (**self).category_exists(id).await
    }

    async fn insert_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem> {
        (**self).insert_item(owner, item).await
    }

    async fn get_item(&self, owner: &Owner, id: ItemId) -> StoreResult<InventoryItem> {
        (**self).get_item(owner, id).await
    }

    async fn list_items(&self, owner: &Owner) -> StoreResult<Vec<InventoryItem>> {
        (**self).list_items(owner).await
    }

    async fn update_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem> {
        (**self).update_item(owner, item).await
    }

    async fn delete_item(&self, owner: &Owner, id: ItemId) -> StoreResult<()> {
        (**self).delete_item(owner, id).await
    }

    async fn adjust_quantity(
        &self,
        owner: &Owner,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> StoreResult<InventoryItem> {
        (**self).adjust_quantity(owner, id, adjustment).await
    }

    async fn insert_order(&self, owner: &Owner, order: Order) -> StoreResult<Order> {
        (**self).insert_order(owner, order).await
    }

    async fn get_order(&self, owner: &Owner, id: OrderId) -> StoreResult<Order> {
        (**self).get_order(owner, id).await
    }

    async fn list_orders(&self, owner: &Owner, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        (**self).list_orders(owner, filter).await
    }

    async fn replace_order(&self, owner: &Owner, order: Order) -> StoreResult<Order> {
        (**self).replace_order(owner, order).await
    }

    async fn delete_order(&self, owner: &Owner, id: OrderId) -> StoreResult<()> {
        (**self).delete_order(owner, id).await
    }
}
