//! Postgres connection and schema bootstrap.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::StoreError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          UUID PRIMARY KEY,
        name        TEXT NOT NULL,
        price_cents BIGINT NOT NULL CHECK (price_cents >= 0),
        stock       BIGINT NOT NULL CHECK (stock >= 0),
        version     BIGINT NOT NULL DEFAULT 0,
        created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id               UUID PRIMARY KEY,
        customer_id      UUID NOT NULL,
        line_items       JSONB NOT NULL,
        total_cents      BIGINT NOT NULL CHECK (total_cents >= 0),
        shipping_address JSONB NOT NULL,
        payment_method   TEXT NOT NULL,
        status           TEXT NOT NULL,
        created_at       TIMESTAMPTZ NOT NULL,
        updated_at       TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS orders_customer_recency_idx
        ON orders (customer_id, created_at DESC, id DESC)
    "#,
];

/// Open a pool against `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create the `products` and `orders` tables if absent. Idempotent.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("database schema ready");
    Ok(())
}
