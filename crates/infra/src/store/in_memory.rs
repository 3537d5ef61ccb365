use std::collections::BTreeMap;
use std::sync::RwLock;

use airhouse_core::{CategoryId, ItemId, OrderId, Owned, Owner};
use airhouse_inventory::{Category, InventoryItem, StockAdjustment};
use airhouse_orders::{Order, OrderFilter};

use super::{LedgerStore, StoreError, StoreResult};

/// Hand `entity` back only if `owner` holds it.
fn guarded<E: Owned>(owner: &Owner, entity: E) -> StoreResult<E> {
    owner.guard(entity).map_err(|_| StoreError::NotFound)
}

#[derive(Debug, Default)]
struct State {
    categories: BTreeMap<CategoryId, Category>,
    items: BTreeMap<ItemId, InventoryItem>,
    orders: BTreeMap<OrderId, Order>,
}

impl State {
    fn owned_item(&self, owner: &Owner, id: ItemId) -> Option<&InventoryItem> {
        self.items.get(&id).filter(|item| owner.owns(*item))
    }

    fn order_visible(&self, owner: &Owner, order: &Order) -> bool {
        order.item_ids().any(|id| self.owned_item(owner, id).is_some())
    }

    fn all_lines_owned(&self, owner: &Owner, order: &Order) -> bool {
        order.item_ids().all(|id| self.owned_item(owner, id).is_some())
    }
}

/// In-memory store for tests/dev. One lock guards all tables, so every
/// mutation (including cascades) is atomic.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<State>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert_category(&self, category: Category) -> StoreResult<Category> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        if state.categories.contains_key(&category.id) {
            return Err(StoreError::Conflict(format!("category {} already exists", category.id)));
        }
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.categories.values().cloned().collect())
    }

    async fn category_exists(&self, id: CategoryId) -> StoreResult<bool> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.categories.contains_key(&id))
    }

    async fn insert_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem> {
        let item = guarded(owner, item)?;
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        if state.items.contains_key(&item.id) {
            return Err(StoreError::Conflict(format!("item {} already exists", item.id)));
        }
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_item(&self, owner: &Owner, id: ItemId) -> StoreResult<InventoryItem> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        let item = state.items.get(&id).cloned().ok_or(StoreError::NotFound)?;
        guarded(owner, item)
    }

    async fn list_items(&self, owner: &Owner) -> StoreResult<Vec<InventoryItem>> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        Ok(state
            .items
            .values()
            .filter(|item| owner.owns(*item))
            .cloned()
            .collect())
    }

    async fn update_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        if state.owned_item(owner, item.id).is_none() {
            return Err(StoreError::NotFound);
        }
        let item = guarded(owner, item)?;
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn delete_item(&self, owner: &Owner, id: ItemId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        if state.owned_item(owner, id).is_none() {
            return Err(StoreError::NotFound);
        }
        state.items.remove(&id);
        for order in state.orders.values_mut() {
            order.lines.retain(|line| line.item_id != id);
        }
        state.orders.retain(|_, order| !order.lines.is_empty());
        Ok(())
    }

    async fn adjust_quantity(
        &self,
        owner: &Owner,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> StoreResult<InventoryItem> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        let item = state
            .items
            .get_mut(&id)
            .filter(|item| owner.owns(&**item))
            .ok_or(StoreError::NotFound)?;
        item.adjust(adjustment);
        Ok(item.clone())
    }

    async fn insert_order(&self, owner: &Owner, order: Order) -> StoreResult<Order> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        if !state.all_lines_owned(owner, &order) {
            return Err(StoreError::NotFound);
        }
        if state.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, owner: &Owner, id: OrderId) -> StoreResult<Order> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        state
            .orders
            .get(&id)
            .filter(|order| state.order_visible(owner, order))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_orders(&self, owner: &Owner, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        Ok(state
            .orders
            .values()
            .filter(|order| state.order_visible(owner, order) && filter.matches(order))
            .cloned()
            .collect())
    }

    async fn replace_order(&self, owner: &Owner, order: Order) -> StoreResult<Order> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        let visible = state
            .orders
            .get(&order.id)
            .is_some_and(|existing| state.order_visible(owner, existing));
        if !visible || !state.all_lines_owned(owner, &order) {
            return Err(StoreError::NotFound);
        }
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn delete_order(&self, owner: &Owner, id: OrderId) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
        let visible = state
            .orders
            .get(&id)
            .is_some_and(|order| state.order_visible(owner, order));
        if !visible {
            return Err(StoreError::NotFound);
        }
        state.orders.remove(&id);
        Ok(())
    }
}
