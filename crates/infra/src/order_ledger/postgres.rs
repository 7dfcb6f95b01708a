//! Postgres-backed order ledger.
//!
//! Line items and the shipping address are stored as JSONB snapshots next to
//! the scalar columns. Rows are rehydrated through `Order::from_parts`, so a
//! total that no longer matches its line items surfaces as `StoreError::Corrupt`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_core::{AggregateId, Money, UserId};
use storefront_orders::{LineItem, Order, OrderId, OrderStatus, PaymentMethod, ShippingAddress};

use super::OrderLedger;
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PostgresOrderLedger {
    pool: PgPool,
}

impl PostgresOrderLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, customer_id, line_items, total_cents, shipping_address,
           payment_method, status, created_at, updated_at
    FROM orders
"#;

#[derive(Debug)]
struct OrderRow {
    id: uuid::Uuid,
    customer_id: uuid::Uuid,
    line_items: Json<Vec<LineItem>>,
    total_cents: i64,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for OrderRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            line_items: row.try_get("line_items")?,
            total_cents: row.try_get("total_cents")?,
            shipping_address: row.try_get("shipping_address")?,
            payment_method: row.try_get("payment_method")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl OrderRow {
    fn into_order(self) -> Result<Order, StoreError> {
        let id = OrderId::new(AggregateId::from_uuid(self.id));
        let total = u64::try_from(self.total_cents)
            .map(Money::from_cents)
            .map_err(|_| StoreError::Corrupt(format!("order {id}: negative total")))?;
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("order {id}: {e}")))?;
        let payment_method = PaymentMethod::new(self.payment_method)
            .map_err(|e| StoreError::Corrupt(format!("order {id}: {e}")))?;

        Order::from_parts(
            id,
            UserId::from_uuid(self.customer_id),
            self.line_items.0,
            total,
            self.shipping_address.0,
            payment_method,
            status,
            self.created_at,
            self.updated_at,
        )
        .map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn rows_to_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, StoreError> {
    rows.into_iter().map(OrderRow::into_order).collect()
}

#[async_trait]
impl OrderLedger for PostgresOrderLedger {
    #[instrument(skip(self, order), fields(order_id = %order.id()), err)]
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let total = i64::try_from(order.total_price().cents()).map_err(|_| {
            StoreError::OutOfRange(format!("order total {} exceeds storable range", order.total_price()))
        })?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, line_items, total_cents, shipping_address,
                payment_method, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id().0.as_uuid())
        .bind(order.customer_id().as_uuid())
        .bind(Json(order.line_items()))
        .bind(total)
        .bind(Json(order.shipping_address()))
        .bind(order.payment_method().as_str())
        .bind(order.status().as_str())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(StoreError::Duplicate(format!("order {}", order.id())))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} WHERE id = $1"))
            .bind(id.0.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(OrderRow::into_order).transpose()
    }

    #[instrument(skip(self), fields(customer_id = %customer_id), err)]
    async fn list_by_customer(&self, customer_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{SELECT_ORDER} WHERE customer_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows_to_orders(rows)
    }

    #[instrument(skip(self), err)]
    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{SELECT_ORDER} ORDER BY created_at DESC, id DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows_to_orders(rows)
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status), err)]
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, customer_id, line_items, total_cents, shipping_address,
                      payment_method, status, created_at, updated_at
            "#,
        )
        .bind(id.0.as_uuid())
        .bind(status.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }
}
