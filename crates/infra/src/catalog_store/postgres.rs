//! Postgres-backed catalog store.
//!
//! A stock debit is one statement: lock the row, then decrement only if
//! `stock >= quantity`. The same statement reports whether the product exists
//! and how much stock the check saw, so a miss needs no second read.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use storefront_catalog::{Product, ProductId, StockDebit};
use storefront_core::{AggregateId, Money};

use super::{CatalogStore, DebitOutcome};
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_u32(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{column} out of range: {value}")))
}

fn to_cents(value: i64) -> Result<Money, StoreError> {
    u64::try_from(value)
        .map(Money::from_cents)
        .map_err(|_| StoreError::Corrupt(format!("negative price: {value}")))
}

fn row_to_product(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let id: uuid::Uuid = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let price: i64 = row.try_get("price_cents")?;
    let stock: i64 = row.try_get("stock")?;
    let version: i64 = row.try_get("version")?;

    Ok(Product::from_parts(
        ProductId::new(AggregateId::from_uuid(id)),
        name,
        to_cents(price)?,
        to_u32(stock, "stock")?,
        version as u64,
    ))
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, price_cents, stock, version
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.0.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn debit_stock(&self, id: ProductId, quantity: u32) -> Result<DebitOutcome, StoreError> {
        // The row is locked before the floor check, so `available` on a miss is
        // the same value the check rejected.
        let row = sqlx::query(
            r#"
            WITH target AS (
                SELECT id, stock FROM products WHERE id = $1 FOR UPDATE
            ),
            debited AS (
                UPDATE products p
                SET stock = p.stock - $2,
                    version = p.version + 1,
                    updated_at = NOW()
                FROM target t
                WHERE p.id = t.id AND t.stock >= $2
                RETURNING p.name, p.price_cents, p.stock
            )
            SELECT t.stock AS available, d.name, d.price_cents, d.stock AS remaining
            FROM target t
            LEFT JOIN debited d ON TRUE
            "#,
        )
        .bind(id.0.as_uuid())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(DebitOutcome::NotFound);
        };

        let name: Option<String> = row.try_get("name")?;
        let Some(name) = name else {
            let available: i64 = row.try_get("available")?;
            return Ok(DebitOutcome::InsufficientStock {
                requested: quantity,
                available: to_u32(available, "stock")?,
            });
        };

        let price: i64 = row.try_get("price_cents")?;
        let remaining: i64 = row.try_get("remaining")?;
        Ok(DebitOutcome::Debited(StockDebit {
            product_id: id,
            name,
            unit_price: to_cents(price)?,
            quantity,
            remaining: to_u32(remaining, "stock")?,
        }))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn credit_stock(&self, id: ProductId, quantity: u32) -> Result<u32, StoreError> {
        let stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock + $2,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING stock
            "#,
        )
        .bind(id.0.as_uuid())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        let stock = stock.ok_or_else(|| StoreError::Missing(format!("product {id}")))?;
        to_u32(stock, "stock")
    }

    #[instrument(skip(self, product), fields(product_id = %product.id()), err)]
    async fn upsert(&self, product: Product) -> Result<(), StoreError> {
        let price = i64::try_from(product.price().cents())
            .map_err(|_| StoreError::OutOfRange(format!("price for {}", product.id())))?;

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price_cents, stock, version)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                name = EXCLUDED.name,
                price_cents = EXCLUDED.price_cents,
                stock = EXCLUDED.stock,
                version = products.version + 1,
                updated_at = NOW()
            "#,
        )
        .bind(product.id().0.as_uuid())
        .bind(product.name())
        .bind(price)
        .bind(i64::from(product.stock()))
        .bind(product.version() as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
