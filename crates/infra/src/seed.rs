//! Catalog seeding from a JSON document.
//!
//! The document is an array of `{id?, name, price, stock}` objects. `price`
//! may be a decimal string (`"12.99"`) or a JSON number (`12.99`); unknown
//! fields are ignored so richer catalog exports can be fed in unchanged.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use storefront_catalog::{Product, ProductId};
use storefront_core::{AggregateId, Money};

use crate::catalog_store::CatalogStore;
use crate::error::StoreError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed seed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("seed entry {index}: {reason}")]
    Invalid { index: usize, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedPrice {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
struct SeedEntry {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    price: SeedPrice,
    stock: u32,
}

impl SeedEntry {
    fn into_product(self, index: usize) -> Result<Product, SeedError> {
        let invalid = |reason: String| SeedError::Invalid { index, reason };

        let price: Money = match &self.price {
            SeedPrice::Text(s) => s.parse::<Money>(),
            SeedPrice::Number(n) => n.to_string().parse::<Money>(),
        }
        .map_err(|e| invalid(e.to_string()))?;

        let id = self
            .id
            .map(|u| ProductId::new(AggregateId::from_uuid(u)))
            .unwrap_or_else(ProductId::generate);

        Product::new(id, self.name, price, self.stock).map_err(|e| invalid(e.to_string()))
    }
}

/// Parse a seed document into validated products.
pub fn parse_seed(json: &str) -> Result<Vec<Product>, SeedError> {
    let entries: Vec<SeedEntry> = serde_json::from_str(json)?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_product(index))
        .collect()
}

pub fn load_seed_file(path: &Path) -> Result<Vec<Product>, SeedError> {
    let raw = std::fs::read_to_string(path)?;
    parse_seed(&raw)
}

/// Upsert every product into the catalog; returns how many were written.
pub async fn seed_catalog<C>(catalog: &C, products: Vec<Product>) -> Result<usize, SeedError>
where
    C: CatalogStore + ?Sized,
{
    let count = products.len();
    for product in products {
        catalog.upsert(product).await?;
    }
    info!(count, "catalog seeded");
    Ok(count)
}
