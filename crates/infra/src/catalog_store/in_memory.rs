use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use storefront_catalog::{Product, ProductId, StockError};

use super::{CatalogStore, DebitOutcome};
use crate::error::StoreError;

/// In-memory catalog for tests/dev.
///
/// Each product sits behind its own mutex, so a debit is one locked
/// check-and-decrement and debits against different products do not contend.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    products: RwLock<HashMap<ProductId, Arc<Mutex<Product>>>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products
            .into_iter()
            .map(|p| (p.id(), Arc::new(Mutex::new(p))))
            .collect();
        Self {
            products: RwLock::new(map),
        }
    }

    fn slot(&self, id: ProductId) -> Result<Option<Arc<Mutex<Product>>>, StoreError> {
        let map = self.products.read().map_err(|_| StoreError::Poisoned)?;
        Ok(map.get(&id).cloned())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        match self.slot(id)? {
            Some(slot) => {
                let product = slot.lock().map_err(|_| StoreError::Poisoned)?;
                Ok(Some(product.clone()))
            }
            None => Ok(None),
        }
    }

    async fn debit_stock(&self, id: ProductId, quantity: u32) -> Result<DebitOutcome, StoreError> {
        let Some(slot) = self.slot(id)? else {
            return Ok(DebitOutcome::NotFound);
        };
        let mut product = slot.lock().map_err(|_| StoreError::Poisoned)?;

        match product.debit(quantity) {
            Ok(debit) => Ok(DebitOutcome::Debited(debit)),
            Err(StockError::InsufficientStock {
                requested,
                available,
                ..
            }) => Ok(DebitOutcome::InsufficientStock {
                requested,
                available,
            }),
            Err(StockError::ZeroQuantity) => Ok(DebitOutcome::InsufficientStock {
                requested: 0,
                available: product.stock(),
            }),
            Err(e @ StockError::Overflow(_)) => Err(StoreError::Corrupt(e.to_string())),
        }
    }

    async fn credit_stock(&self, id: ProductId, quantity: u32) -> Result<u32, StoreError> {
        let slot = self
            .slot(id)?
            .ok_or_else(|| StoreError::Missing(format!("product {id}")))?;
        let mut product = slot.lock().map_err(|_| StoreError::Poisoned)?;
        product
            .credit(quantity)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn upsert(&self, product: Product) -> Result<(), StoreError> {
        let mut map = self.products.write().map_err(|_| StoreError::Poisoned)?;
        match map.get(&product.id()) {
            Some(slot) => {
                let mut existing = slot.lock().map_err(|_| StoreError::Poisoned)?;
                *existing = product;
            }
            None => {
                map.insert(product.id(), Arc::new(Mutex::new(product)));
            }
        }
        Ok(())
    }
}
