use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    ListQuery, NewOrder, NewProduct, Order, OrderId, OrderItem, OrderStatus, Product, ProductId,
    Result, StoreError,
    store::{OrderStore, ProductStore, Store, UnitOfWork},
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, quantity";

/// Foreign key from `order_items.product_id` to `products.id`.
const PRODUCT_FK: &str = "order_items_product_fk";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    lock_timeout: Option<Duration>,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout: None,
        }
    }

    /// Bounds how long a unit of work waits for a row lock before failing.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// LIMIT and OFFSET values for a query, saturated to the BIGINT range.
fn page_bounds(query: &ListQuery) -> (Option<i64>, i64) {
    let clamp = |value: usize| i64::try_from(value).unwrap_or(i64::MAX);
    (query.limit.map(clamp), query.offset.map_or(0, clamp))
}

fn row_to_product(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
    })
}

fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<OrderStatus>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        created_at: row.try_get("created_at")?,
        status,
        items,
    })
}

/// Loads line items for the given orders, grouped by order id and kept in
/// placement order.
async fn fetch_items(
    conn: &mut PgConnection,
    order_ids: &[i64],
) -> Result<HashMap<i64, Vec<OrderItem>>> {
    let rows = sqlx::query(
        r#"
        SELECT order_id, product_id, quantity
        FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY order_id ASC, position ASC
        "#,
    )
    .bind(order_ids)
    .fetch_all(conn)
    .await?;

    let mut items: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for row in rows {
        let order_id: i64 = row.try_get("order_id")?;
        items.entry(order_id).or_default().push(OrderItem {
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: row.try_get("quantity")?,
        });
    }
    Ok(items)
}

async fn attach_items(conn: &mut PgConnection, rows: Vec<PgRow>) -> Result<Vec<Order>> {
    let ids = rows
        .iter()
        .map(|row| row.try_get::<i64, _>("id"))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut items = fetch_items(conn, &ids).await?;

    rows.iter()
        .zip(ids)
        .map(|(row, id)| row_to_order(row, items.remove(&id).unwrap_or_default()))
        .collect()
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            "INSERT INTO products (name, description, price, quantity) VALUES ($1, $2, $3, $4) RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity)
        .fetch_one(&self.pool)
        .await?;

        row_to_product(&row)
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn list_products(&self, query: ListQuery) -> Result<Vec<Product>> {
        let (limit, offset) = page_bounds(&query);
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn update_product(
        &self,
        product_id: ProductId,
        product: NewProduct,
    ) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, quantity = $5
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id.as_i64())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.quantity)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "DELETE FROM products WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(PRODUCT_FK)
            {
                return StoreError::ProductReferenced(product_id);
            }
            StoreError::Database(e)
        })?;

        row.as_ref().map(row_to_product).transpose()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query("SELECT id, created_at, status FROM orders WHERE id = $1")
            .bind(order_id.as_i64())
            .fetch_optional(&mut *conn)
            .await?;

        match row {
            Some(row) => Ok(attach_items(&mut *conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_orders(&self, query: ListQuery) -> Result<Vec<Order>> {
        let (limit, offset) = page_bounds(&query);
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(
            "SELECT id, created_at, status FROM orders ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        attach_items(&mut *conn, rows).await
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let mut tx = self.pool.begin().await?;

        if let Some(timeout) = self.lock_timeout {
            // SET LOCAL takes no bind parameters; the value is an integer.
            sqlx::query(&format!("SET LOCAL lock_timeout = {}", timeout.as_millis()))
                .execute(&mut *tx)
                .await?;
        }

        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

/// Unit of work backed by a single PostgreSQL transaction.
///
/// Row locks are taken with `SELECT ... FOR UPDATE`; dropping the unit
/// rolls the transaction back.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn lock_products(&mut self, product_ids: &[ProductId]) -> Result<Vec<Product>> {
        let ids: Vec<i64> = product_ids.iter().map(ProductId::as_i64).collect();
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id ASC FOR UPDATE"
        ))
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn decrement_quantity(
        &mut self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<Option<i64>> {
        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET quantity = quantity - $2
            WHERE id = $1 AND quantity >= $2
            RETURNING quantity
            "#,
        )
        .bind(product_id.as_i64())
        .bind(amount)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(remaining)
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let status = OrderStatus::default();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (created_at, status) VALUES ($1, $2) RETURNING id",
        )
        .bind(order.created_at)
        .bind(status.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, position, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(item.product_id.as_i64())
            .bind(position as i32)
            .bind(item.quantity)
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(Order {
            id: OrderId::new(id),
            created_at: order.created_at,
            status,
            items: order.items,
        })
    }

    async fn lock_order(&mut self, order_id: OrderId) -> Result<Option<Order>> {
        let row =
            sqlx::query("SELECT id, created_at, status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(order_id.as_i64())
                .fetch_optional(&mut *self.tx)
                .await?;

        match row {
            Some(row) => Ok(attach_items(&mut *self.tx, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn set_order_status(&mut self, order_id: OrderId, status: OrderStatus) -> Result<()> {
        sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id.as_i64())
            .bind(status.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_bounds_default_to_everything() {
        assert_eq!(page_bounds(&ListQuery::new()), (None, 0));
        assert_eq!(
            page_bounds(&ListQuery::new().offset(3).limit(7)),
            (Some(7), 3)
        );
    }

    #[test]
    fn page_bounds_saturate_instead_of_wrapping() {
        let query = ListQuery::new().offset(usize::MAX).limit(usize::MAX);
        assert_eq!(page_bounds(&query), (Some(i64::MAX), i64::MAX));
    }
}
