//! Catalog Store boundary: product reads and atomic stock mutations.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use storefront_catalog::{Product, ProductId, StockDebit};

use crate::error::StoreError;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

/// Result of an atomic debit attempt.
///
/// Business outcomes are values; only infrastructure failures are `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited(StockDebit),
    InsufficientStock { requested: u32, available: u32 },
    NotFound,
}

/// Product storage as seen by order placement.
///
/// Implementations must make `debit_stock` a single atomic check-and-decrement
/// per product: concurrent debits may never drive `stock` below zero, and no
/// debit may be lost.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Decrement `stock` by `quantity` iff `stock >= quantity`.
    ///
    /// The returned snapshot carries the name and price read in the same step.
    async fn debit_stock(&self, id: ProductId, quantity: u32) -> Result<DebitOutcome, StoreError>;

    /// Add `quantity` back to `stock`; returns the new stock level.
    async fn credit_stock(&self, id: ProductId, quantity: u32) -> Result<u32, StoreError>;

    /// Insert or replace a product record (seeding, catalog administration).
    async fn upsert(&self, product: Product) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn debit_stock(&self, id: ProductId, quantity: u32) -> Result<DebitOutcome, StoreError> {
        (**self).debit_stock(id, quantity).await
    }

    async fn credit_stock(&self, id: ProductId, quantity: u32) -> Result<u32, StoreError> {
        (**self).credit_stock(id, quantity).await
    }

    async fn upsert(&self, product: Product) -> Result<(), StoreError> {
        (**self).upsert(product).await
    }
}
