//! Postgres-backed ledger store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23505` | `Conflict` | unique violation (duplicate id, duplicate item on an order) |
//! | `23503` | `NotFound` | referenced row vanished (item or category deleted concurrently) |
//! | any other / non-database | `Backend` | check violations, network, pool closed |
//!
//! ## Ownership
//!
//! Item queries carry `owner_id` in the `WHERE` clause. An order is visible
//! when at least one of its lines references an item of the owner, expressed
//! as an `EXISTS` join on every order query.

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use airhouse_core::{CategoryId, ItemId, OrderId, OrderItemId, Owner, UserId};
use airhouse_inventory::{AdjustDirection, Category, InventoryItem, StockAdjustment};
use airhouse_orders::{Order, OrderFilter, OrderItem};

use super::{LedgerStore, StoreError, StoreResult};

/// Idempotent schema statements, executed in order by [`migrate`].
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (lower(email))",
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        name VARCHAR(100) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory_items (
        id UUID PRIMARY KEY,
        owner_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        name VARCHAR(200) NOT NULL,
        quantity BIGINT NOT NULL CHECK (quantity >= 0),
        category_id UUID NULL REFERENCES categories (id) ON DELETE SET NULL,
        date_created TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS inventory_items_owner_idx ON inventory_items (owner_id, id)",
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        reference VARCHAR(100) NULL,
        date_created TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_items (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
        item_id UUID NOT NULL REFERENCES inventory_items (id) ON DELETE CASCADE,
        quantity BIGINT NOT NULL CHECK (quantity >= 1),
        position INTEGER NOT NULL,
        UNIQUE (order_id, item_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS order_items_item_idx ON order_items (item_id)",
];

/// Orders with at least one line on an item owned by `$1`.
const VISIBLE_ORDER: &str = r#"
    EXISTS (
        SELECT 1
        FROM order_items oi
        JOIN inventory_items i ON i.id = oi.item_id
        WHERE oi.order_id = o.id AND i.owner_id = $1
    )
"#;

/// Create the schema if it does not exist yet.
pub async fn migrate(pool: &PgPool) -> StoreResult<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    async fn load_orders(&self, owner: &Owner, only: Option<OrderId>) -> StoreResult<Vec<Order>> {
        let sql = format!(
            r#"
            SELECT o.id, o.reference, o.date_created
            FROM orders o
            WHERE {VISIBLE_ORDER} AND ($2::uuid IS NULL OR o.id = $2)
            ORDER BY o.id ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(owner.user_id().as_uuid())
            .bind(only.map(Uuid::from))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_orders", e))?;

        let mut orders = rows.iter().map(order_from_row).collect::<StoreResult<Vec<_>>>()?;
        if orders.is_empty() {
            return Ok(orders);
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| Uuid::from(o.id)).collect();
        let line_rows = sqlx::query(
            r#"
            SELECT id, order_id, item_id, quantity
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id ASC, position ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_order_lines", e))?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in &line_rows {
            let line = line_from_row(row)?;
            by_order.entry(line.order_id).or_default().push(line);
        }
        for order in &mut orders {
            order.lines = by_order.remove(&order.id).unwrap_or_default();
        }
        Ok(orders)
    }
}

#[async_trait::async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), fields(category_id = %category.id), err)]
    async fn insert_category(&self, category: Category) -> StoreResult<Category> {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
            .bind(category.id.as_uuid())
            .bind(&category.name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(category)
    }

    #[instrument(skip(self), err)]
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_categories", e))?;

        rows.iter()
            .map(|row| {
                Ok(Category {
                    id: CategoryId::from_uuid(row.try_get("id").map_err(decode_error)?),
                    name: row.try_get("name").map_err(decode_error)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn category_exists(&self, id: CategoryId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("category_exists", e))?;
        Ok(row.is_some())
    }

    #[instrument(skip(self, item), fields(owner = %owner.user_id(), item_id = %item.id), err)]
    async fn insert_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem> {
        if !owner.owns(&item) {
            return Err(StoreError::NotFound);
        }
        let row = sqlx::query(
            r#"
            INSERT INTO inventory_items (id, owner_id, name, quantity, category_id, date_created)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, name, quantity, category_id, date_created
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(item.owner_id.as_uuid())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.category.map(Uuid::from))
        .bind(item.date_created)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;
        item_from_row(&row)
    }

    #[instrument(skip(self), fields(owner = %owner.user_id(), item_id = %id), err)]
    async fn get_item(&self, owner: &Owner, id: ItemId) -> StoreResult<InventoryItem> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, name, quantity, category_id, date_created
            FROM inventory_items
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.user_id().as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_item", e))?;

        row.as_ref().map(item_from_row).transpose()?.ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self), fields(owner = %owner.user_id()), err)]
    async fn list_items(&self, owner: &Owner) -> StoreResult<Vec<InventoryItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, quantity, category_id, date_created
            FROM inventory_items
            WHERE owner_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(owner.user_id().as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self, item), fields(owner = %owner.user_id(), item_id = %item.id), err)]
    async fn update_item(&self, owner: &Owner, item: InventoryItem) -> StoreResult<InventoryItem> {
        if !owner.owns(&item) {
            return Err(StoreError::NotFound);
        }
        let row = sqlx::query(
            r#"
            UPDATE inventory_items
            SET name = $3, quantity = $4, category_id = $5
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, quantity, category_id, date_created
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(owner.user_id().as_uuid())
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.category.map(Uuid::from))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        row.as_ref().map(item_from_row).transpose()?.ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self), fields(owner = %owner.user_id(), item_id = %id), err)]
    async fn delete_item(&self, owner: &Owner, id: ItemId) -> StoreResult<()> {
        let mut tx = begin(&self.pool).await?;

        let affected: Vec<Uuid> = sqlx::query_scalar(
            "SELECT DISTINCT order_id FROM order_items WHERE item_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_item_affected_orders", e))?;

        let deleted = sqlx::query("DELETE FROM inventory_items WHERE id = $1 AND owner_id = $2")
            .bind(id.as_uuid())
            .bind(owner.user_id().as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_item", e))?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        }

        // Lines went with the item (ON DELETE CASCADE); drop orders left empty.
        sqlx::query(
            r#"
            DELETE FROM orders o
            WHERE o.id = ANY($1)
              AND NOT EXISTS (SELECT 1 FROM order_items oi WHERE oi.order_id = o.id)
            "#,
        )
        .bind(&affected)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("delete_empty_orders", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))
    }

    #[instrument(
        skip(self),
        fields(owner = %owner.user_id(), item_id = %id, direction = ?adjustment.direction()),
        err
    )]
    async fn adjust_quantity(
        &self,
        owner: &Owner,
        id: ItemId,
        adjustment: StockAdjustment,
    ) -> StoreResult<InventoryItem> {
        let increase = adjustment.direction() == AdjustDirection::Increase;
        let row = sqlx::query(
            r#"
            UPDATE inventory_items
            SET quantity = CASE
                WHEN $3 THEN LEAST(quantity, 9223372036854775807 - $4) + $4
                ELSE GREATEST(quantity - $4, 0)
            END
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, quantity, category_id, date_created
            "#,
        )
        .bind(id.as_uuid())
        .bind(owner.user_id().as_uuid())
        .bind(increase)
        .bind(adjustment.amount())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("adjust_quantity", e))?;

        row.as_ref().map(item_from_row).transpose()?.ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self, order), fields(owner = %owner.user_id(), order_id = %order.id), err)]
    async fn insert_order(&self, owner: &Owner, order: Order) -> StoreResult<Order> {
        let mut tx = begin(&self.pool).await?;
        ensure_lines_owned(&mut tx, owner, &order).await?;

        sqlx::query("INSERT INTO orders (id, reference, date_created) VALUES ($1, $2, $3)")
            .bind(order.id.as_uuid())
            .bind(order.reference.as_deref())
            .bind(order.date_created)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order", e))?;

        insert_lines(&mut tx, &order).await?;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(order)
    }

    #[instrument(skip(self), fields(owner = %owner.user_id(), order_id = %id), err)]
    async fn get_order(&self, owner: &Owner, id: OrderId) -> StoreResult<Order> {
        self.load_orders(owner, Some(id))
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }

    #[instrument(skip(self), fields(owner = %owner.user_id()), err)]
    async fn list_orders(&self, owner: &Owner, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let orders = self.load_orders(owner, None).await?;
        Ok(orders.into_iter().filter(|o| filter.matches(o)).collect())
    }

    #[instrument(skip(self, order), fields(owner = %owner.user_id(), order_id = %order.id), err)]
    async fn replace_order(&self, owner: &Owner, order: Order) -> StoreResult<Order> {
        let mut tx = begin(&self.pool).await?;

        let sql = format!("SELECT o.id FROM orders o WHERE {VISIBLE_ORDER} AND o.id = $2 FOR UPDATE");
        let visible = sqlx::query(&sql)
            .bind(owner.user_id().as_uuid())
            .bind(order.id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("replace_order_lock", e))?;
        if visible.is_none() {
            tx.rollback().await.map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(StoreError::NotFound);
        }

        ensure_lines_owned(&mut tx, owner, &order).await?;

        sqlx::query("UPDATE orders SET reference = $2 WHERE id = $1")
            .bind(order.id.as_uuid())
            .bind(order.reference.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("update_order", e))?;

        sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_order_lines", e))?;

        insert_lines(&mut tx, &order).await?;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(order)
    }

    #[instrument(skip(self), fields(owner = %owner.user_id(), order_id = %id), err)]
    async fn delete_order(&self, owner: &Owner, id: OrderId) -> StoreResult<()> {
        let sql = format!("DELETE FROM orders o WHERE {VISIBLE_ORDER} AND o.id = $2");
        let deleted = sqlx::query(&sql)
            .bind(owner.user_id().as_uuid())
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

async fn begin(pool: &PgPool) -> StoreResult<Transaction<'static, Postgres>> {
    pool.begin().await.map_err(|e| map_sqlx_error("begin_transaction", e))
}

/// Lock the order's items and check every one belongs to `owner`.
async fn ensure_lines_owned(
    tx: &mut Transaction<'static, Postgres>,
    owner: &Owner,
    order: &Order,
) -> StoreResult<()> {
    let mut wanted: Vec<Uuid> = order.item_ids().map(Uuid::from).collect();
    wanted.sort_unstable();
    wanted.dedup();

    let owned: Vec<Uuid> = sqlx::query_scalar(
        "SELECT id FROM inventory_items WHERE owner_id = $1 AND id = ANY($2) FOR SHARE",
    )
    .bind(owner.user_id().as_uuid())
    .bind(&wanted)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("ensure_lines_owned", e))?;

    if owned.len() != wanted.len() {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

async fn insert_lines(tx: &mut Transaction<'static, Postgres>, order: &Order) -> StoreResult<()> {
    for (position, line) in order.lines.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| StoreError::Backend("too many order lines".to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, item_id, quantity, position)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(line.id.as_uuid())
        .bind(order.id.as_uuid())
        .bind(line.item_id.as_uuid())
        .bind(line.quantity)
        .bind(position)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order_line", e))?;
    }
    Ok(())
}

fn item_from_row(row: &PgRow) -> StoreResult<InventoryItem> {
    Ok(InventoryItem {
        id: ItemId::from_uuid(row.try_get("id").map_err(decode_error)?),
        owner_id: UserId::from_uuid(row.try_get("owner_id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        quantity: row.try_get("quantity").map_err(decode_error)?,
        category: row
            .try_get::<Option<Uuid>, _>("category_id")
            .map_err(decode_error)?
            .map(CategoryId::from_uuid),
        date_created: row.try_get("date_created").map_err(decode_error)?,
    })
}

fn order_from_row(row: &PgRow) -> StoreResult<Order> {
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id").map_err(decode_error)?),
        reference: row.try_get("reference").map_err(decode_error)?,
        date_created: row.try_get("date_created").map_err(decode_error)?,
        lines: Vec::new(),
    })
}

fn line_from_row(row: &PgRow) -> StoreResult<OrderItem> {
    Ok(OrderItem {
        id: OrderItemId::from_uuid(row.try_get("id").map_err(decode_error)?),
        order_id: OrderId::from_uuid(row.try_get("order_id").map_err(decode_error)?),
        item_id: ItemId::from_uuid(row.try_get("item_id").map_err(decode_error)?),
        quantity: row.try_get("quantity").map_err(decode_error)?,
    })
}

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode row: {err}"))
}

/// Map SQLx errors to `StoreError` (see module docs).
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::NotFound,
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
