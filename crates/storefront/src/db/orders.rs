//! Order repository.
//!
//! Checkout itself lives in the web application; this repository only
//! records an order with its lines and reads it back.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use papelaria_core::{OrderId, OrderItemId, Price, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::order::order_total;
use crate::models::{NewOrderItem, Order, OrderItem};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    total: Decimal,
    whatsapp_sent: Option<bool>,
    created_at: Option<NaiveDateTime>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let total = Price::new(row.total).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid total for order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            total,
            whatsapp_sent: row.whatsapp_sent.unwrap_or(false),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: Option<OrderId>,
    product_id: Option<ProductId>,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("order item {}: {e}", row.id))
        })?;
        let unit_price = Price::new(row.unit_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("order item {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity,
            unit_price,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record an order and its lines in one transaction.
    ///
    /// The stored total is the sum of the line subtotals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty order or a total
    /// that does not fit `NUMERIC(10,2)`, and `RepositoryError::Database` if
    /// an insert fails (for example an unknown product).
    pub async fn create(
        &self,
        user_id: Option<UserId>,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        if items.is_empty() {
            return Err(RepositoryError::Validation(
                "order must have at least one item".to_owned(),
            ));
        }
        let total = order_total(items).map_err(|e| RepositoryError::Validation(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO orders (user_id, total)
            VALUES ($1, $2)
            RETURNING id, user_id, total, whatsapp_sent, created_at
            ",
        )
        .bind(user_id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO order_items (order_id, product_id, quantity, unit_price) ");
        builder.push_values(items, |mut line, item| {
            line.push_bind(row.id)
                .push_bind(item.product_id)
                .push_bind(item.quantity.get())
                .push_bind(item.unit_price);
        });
        builder.build().execute(&mut *tx).await?;

        tx.commit().await?;

        let order = Order::try_from(row)?;
        tracing::info!(order_id = %order.id, total = %order.total, lines = items.len(), "Order recorded");
        Ok(order)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT id, user_id, total, whatsapp_sent, created_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    /// Lines of an order, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    /// Delete an order; its lines are removed by the cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
