//! Order Ledger: persistence of placed orders.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use storefront_core::UserId;
use storefront_orders::{Order, OrderId, OrderStatus};

use crate::error::StoreError;

pub use in_memory::InMemoryOrderLedger;
pub use postgres::PostgresOrderLedger;

/// Storage for placed orders.
///
/// Listing operations return orders newest first (`created_at` desc, id desc).
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Persist a new order. Fails with `StoreError::Duplicate` if the id exists.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    async fn list_by_customer(&self, customer_id: UserId) -> Result<Vec<Order>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    /// Overwrite the status of an existing order; `None` if the id is unknown.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError>;
}

#[async_trait]
impl<L> OrderLedger for Arc<L>
where
    L: OrderLedger + ?Sized,
{
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        (**self).insert(order).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        (**self).get(id).await
    }

    async fn list_by_customer(&self, customer_id: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).list_by_customer(customer_id).await
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        (**self).list_all().await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        (**self).update_status(id, status, at).await
    }
}
