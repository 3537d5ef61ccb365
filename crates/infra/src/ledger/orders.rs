use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use airhouse_core::{ItemId, OrderId, Owner};
use airhouse_orders::{Order, OrderFilter, OrderForm, PlanTarget};

use super::LedgerResult;
use crate::store::LedgerStore;

#[derive(Clone)]
pub struct OrderLedger {
    store: Arc<dyn LedgerStore>,
}

impl OrderLedger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Orders visible to `owner`. Anonymous callers see an empty list.
    pub async fn list(&self, owner: Option<&Owner>, filter: &OrderFilter) -> LedgerResult<Vec<Order>> {
        match owner {
            Some(owner) => Ok(self.store.list_orders(owner, filter).await?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, owner: &Owner, id: OrderId) -> LedgerResult<Order> {
        Ok(self.store.get_order(owner, id).await?)
    }

    /// Validate header and lines together, then persist them as one unit.
    pub async fn create(&self, owner: &Owner, form: &OrderForm) -> LedgerResult<Order> {
        let owned = self.owned_items(owner).await?;
        let plan = form.plan(
            PlanTarget::New {
                order_id: OrderId::new(),
                occurred_at: Utc::now(),
            },
            |id| owned.contains(&id),
        )?;

        let order = self.store.insert_order(owner, plan.order).await?;
        info!(
            owner = %owner.user_id(),
            order_id = %order.id,
            lines = order.lines.len(),
            "order created"
        );
        Ok(order)
    }

    pub async fn update(&self, owner: &Owner, id: OrderId, form: &OrderForm) -> LedgerResult<Order> {
        let existing = self.store.get_order(owner, id).await?;
        let owned = self.owned_items(owner).await?;
        let plan = form.plan(PlanTarget::Existing(&existing), |id| owned.contains(&id))?;

        let order = self.store.replace_order(owner, plan.order).await?;
        info!(
            owner = %owner.user_id(),
            order_id = %order.id,
            lines = order.lines.len(),
            removed = plan.removed.len(),
            "order updated"
        );
        Ok(order)
    }

    pub async fn delete(&self, owner: &Owner, id: OrderId) -> LedgerResult<()> {
        self.store.delete_order(owner, id).await?;
        info!(owner = %owner.user_id(), order_id = %id, "order deleted");
        Ok(())
    }

    async fn owned_items(&self, owner: &Owner) -> LedgerResult<HashSet<ItemId>> {
        Ok(self
            .store
            .list_items(owner)
            .await?
            .into_iter()
            .map(|item| item.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InventoryLedger, LedgerError};
    use crate::store::InMemoryLedgerStore;
    use airhouse_core::{DomainError, UserId};
    use airhouse_inventory::ItemFields;
    use airhouse_orders::{LineForm, OrderHeader};

    struct Fixture {
        inventory: InventoryLedger,
        orders: OrderLedger,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new());
        Fixture {
            inventory: InventoryLedger::new(store.clone(), 5),
            orders: OrderLedger::new(store),
        }
    }

    async fn item(f: &Fixture, owner: &Owner, name: &str) -> ItemId {
        f.inventory
            .create(
                owner,
                &ItemFields {
                    name: name.to_string(),
                    quantity: Some(10),
                    category: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    fn line(item: ItemId, quantity: i64) -> LineForm {
        LineForm {
            item: Some(item),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    fn form(reference: &str, lines: Vec<LineForm>) -> OrderForm {
        OrderForm {
            header: OrderHeader {
                reference: Some(reference.to_string()),
            },
            lines,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn anonymous_list_is_empty() {
        let f = fixture();
        let owner = Owner::new(UserId::new());
        let a = item(&f, &owner, "A").await;
        f.orders.create(&owner, &form("PO-1", vec![line(a, 1)])).await.unwrap();

        assert!(f.orders.list(None, &OrderFilter::default()).await.unwrap().is_empty());
        assert_eq!(
            f.orders
                .list(Some(&owner), &OrderFilter::default())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn one_bad_line_persists_nothing() {
        let f = fixture();
        let owner = Owner::new(UserId::new());
        let a = item(&f, &owner, "A").await;
        let b = item(&f, &owner, "B").await;

        let err = f
            .orders
            .create(&owner, &form("PO-1", vec![line(a, 2), line(b, 0)]))
            .await
            .unwrap_err();
        let LedgerError::Domain(DomainError::Validation(errors)) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.messages_for(Some("lines[1].quantity")).len(), 1);

        assert!(
            f.orders
                .list(Some(&owner), &OrderFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn orders_of_other_users_are_not_found() {
        let f = fixture();
        let alice = Owner::new(UserId::new());
        let bob = Owner::new(UserId::new());
        let a = item(&f, &alice, "A").await;
        let order = f.orders.create(&alice, &form("PO-1", vec![line(a, 1)])).await.unwrap();
        let not_found = LedgerError::Domain(DomainError::NotFound);

        assert_eq!(f.orders.get(&bob, order.id).await.unwrap_err(), not_found);
        assert_eq!(
            f.orders
                .update(&bob, order.id, &form("mine", vec![]))
                .await
                .unwrap_err(),
            not_found
        );
        assert_eq!(f.orders.delete(&bob, order.id).await.unwrap_err(), not_found);
        assert!(
            f.orders
                .list(Some(&bob), &OrderFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn lines_cannot_reference_foreign_items() {
        let f = fixture();
        let alice = Owner::new(UserId::new());
        let bob = Owner::new(UserId::new());
        let bobs = item(&f, &bob, "B").await;

        let err = f
            .orders
            .create(&alice, &form("PO-1", vec![line(bobs, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn update_edits_and_removes_lines_atomically() {
        let f = fixture();
        let owner = Owner::new(UserId::new());
        let a = item(&f, &owner, "A").await;
        let b = item(&f, &owner, "B").await;
        let c = item(&f, &owner, "C").await;
        let order = f
            .orders
            .create(&owner, &form("PO-1", vec![line(a, 1), line(b, 2)]))
            .await
            .unwrap();

        let first = order.lines[0].id;
        let second = order.lines[1].id;
        let edit = form(
            "PO-1b",
            vec![
                LineForm {
                    id: Some(first),
                    item: Some(a),
                    quantity: Some(7),
                    delete: false,
                },
                LineForm {
                    id: Some(second),
                    delete: true,
                    ..Default::default()
                },
                line(c, 3),
            ],
        );
        let updated = f.orders.update(&owner, order.id, &edit).await.unwrap();

        assert_eq!(updated.reference.as_deref(), Some("PO-1b"));
        assert_eq!(updated.lines.len(), 2);
        assert_eq!(updated.lines[0].id, first);
        assert_eq!(updated.lines[0].quantity, 7);
        assert_eq!(updated.lines[1].item_id, c);

        // A failing edit leaves the stored order untouched.
        let bad = form("PO-1c", vec![line(b, 0)]);
        assert!(f.orders.update(&owner, order.id, &bad).await.is_err());
        assert_eq!(f.orders.get(&owner, order.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn list_filters_by_item_and_reference() {
        let f = fixture();
        let owner = Owner::new(UserId::new());
        let a = item(&f, &owner, "A").await;
        let b = item(&f, &owner, "B").await;
        f.orders.create(&owner, &form("Spring", vec![line(a, 1), line(b, 1)])).await.unwrap();
        f.orders.create(&owner, &form("Autumn", vec![line(b, 1)])).await.unwrap();

        let by_item = OrderFilter {
            item: Some(a),
            reference: None,
        };
        assert_eq!(f.orders.list(Some(&owner), &by_item).await.unwrap().len(), 1);

        let by_reference = OrderFilter {
            item: None,
            reference: Some("aut".to_string()),
        };
        let found = f.orders.list(Some(&owner), &by_reference).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reference.as_deref(), Some("Autumn"));
    }

    #[tokio::test]
    async fn delete_removes_the_order() {
        let f = fixture();
        let owner = Owner::new(UserId::new());
        let a = item(&f, &owner, "A").await;
        let order = f.orders.create(&owner, &form("PO-1", vec![line(a, 1)])).await.unwrap();

        f.orders.delete(&owner, order.id).await.unwrap();
        assert_eq!(
            f.orders.get(&owner, order.id).await.unwrap_err(),
            LedgerError::Domain(DomainError::NotFound)
        );
    }
}
