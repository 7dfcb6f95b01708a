use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::{AggregateId, DomainError, DomainResult, Money};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Stock mutation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("quantity must be positive")]
    ZeroQuantity,

    #[error("stock counter overflow for {0}")]
    Overflow(ProductId),
}

/// Result of a successful debit: what was taken, at which price, and what is left.
///
/// `name` and `unit_price` are read in the same step as the decrement, so they
/// are the values that were authoritative at the instant of reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDebit {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub remaining: u32,
}

/// Catalog record as seen by order placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: Money,
    stock: u32,
    version: u64,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stock: u32) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            price,
            stock,
            version: 0,
        })
    }

    /// Rebuild a record loaded from storage (no validation, version preserved).
    pub fn from_parts(id: ProductId, name: String, price: Money, stock: u32, version: u64) -> Self {
        Self {
            id,
            name,
            price,
            stock,
            version,
        }
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Bumped on every stock or price mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Price edits come from catalog administration; orders keep their own snapshot.
    pub fn set_price(&mut self, price: Money) {
        self.price = price;
        self.version += 1;
    }

    /// Take `quantity` units off the counter, or leave it untouched and fail.
    pub fn debit(&mut self, quantity: u32) -> Result<StockDebit, StockError> {
        if quantity == 0 {
            return Err(StockError::ZeroQuantity);
        }
        if self.stock < quantity {
            return Err(StockError::InsufficientStock {
                product_id: self.id,
                requested: quantity,
                available: self.stock,
            });
        }

        self.stock -= quantity;
        self.version += 1;

        Ok(StockDebit {
            product_id: self.id,
            name: self.name.clone(),
            unit_price: self.price,
            quantity,
            remaining: self.stock,
        })
    }

    /// Return `quantity` units to the counter (compensation / restock).
    pub fn credit(&mut self, quantity: u32) -> Result<u32, StockError> {
        if quantity == 0 {
            return Err(StockError::ZeroQuantity);
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or(StockError::Overflow(self.id))?;
        self.version += 1;
        Ok(self.stock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn product(stock: u32) -> Product {
        Product::new(ProductId::generate(), "Widget", Money::from_cents(1000), stock).unwrap()
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = Product::new(ProductId::generate(), "  ", Money::ZERO, 1).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn debit_decrements_and_snapshots_price() {
        let mut p = product(5);
        let debit = p.debit(3).unwrap();
        assert_eq!(p.stock(), 2);
        assert_eq!(debit.remaining, 2);
        assert_eq!(debit.unit_price, Money::from_cents(1000));
        assert_eq!(debit.name, "Widget");
        assert_eq!(p.version(), 1);
    }

    #[test]
    fn price_change_bumps_version_too() {
        let mut p = product(5);
        p.set_price(Money::from_cents(1250));
        assert_eq!(p.price(), Money::from_cents(1250));
        assert_eq!(p.version(), 1);
        p.debit(1).unwrap();
        assert_eq!(p.version(), 2);
    }

    #[test]
    fn debit_beyond_stock_leaves_counter_unchanged() {
        let mut p = product(2);
        let err = p.debit(3).unwrap_err();
        assert_eq!(
            err,
            StockError::InsufficientStock {
                product_id: p.id(),
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(p.stock(), 2);
        assert_eq!(p.version(), 0);
    }

    #[test]
    fn debit_of_exact_stock_drains_to_zero() {
        let mut p = product(4);
        p.debit(4).unwrap();
        assert_eq!(p.stock(), 0);
        assert!(p.debit(1).is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut p = product(4);
        assert_eq!(p.debit(0).unwrap_err(), StockError::ZeroQuantity);
        assert_eq!(p.credit(0).unwrap_err(), StockError::ZeroQuantity);
    }

    #[test]
    fn credit_overflow_is_reported() {
        let mut p = product(u32::MAX);
        assert!(matches!(p.credit(1), Err(StockError::Overflow(_))));
        assert_eq!(p.stock(), u32::MAX);
    }

    proptest! {
        #[test]
        fn debit_then_credit_restores_stock(stock in 1u32..10_000, qty in 1u32..10_000) {
            let mut p = product(stock);
            if p.debit(qty).is_ok() {
                p.credit(qty).unwrap();
            }
            prop_assert_eq!(p.stock(), stock);
        }
    }
}
