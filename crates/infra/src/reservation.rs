//! Inventory reservation with compensation.
//!
//! Lines are debited one at a time in caller order. If line `k` cannot be
//! debited, the debits already made for lines `1..k` are credited back (in
//! reverse) before the error is returned, so a failed reservation leaves the
//! catalog exactly as it found it.
//!
//! Two lines naming the same product are two independent debits; the second
//! sees the stock left by the first.

use tracing::{debug, error, warn};

use storefront_catalog::StockDebit;
use storefront_orders::LineRequest;

use crate::catalog_store::{CatalogStore, DebitOutcome};
use crate::error::OrderError;

pub struct InventoryReservation<'a, C: ?Sized> {
    catalog: &'a C,
}

impl<'a, C> InventoryReservation<'a, C>
where
    C: CatalogStore + ?Sized,
{
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Debit every line or none of them.
    pub async fn reserve(&self, lines: &[LineRequest]) -> Result<Vec<StockDebit>, OrderError> {
        let mut debits: Vec<StockDebit> = Vec::with_capacity(lines.len());

        for (idx, line) in lines.iter().enumerate() {
            let line_no = idx as u32 + 1;
            let outcome = match self.catalog.debit_stock(line.product_id, line.quantity).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.release(&debits).await;
                    return Err(e.into());
                }
            };

            match outcome {
                DebitOutcome::Debited(debit) => {
                    debug!(
                        line_no,
                        product_id = %debit.product_id,
                        quantity = debit.quantity,
                        remaining = debit.remaining,
                        "stock debited"
                    );
                    debits.push(debit);
                }
                DebitOutcome::InsufficientStock {
                    requested,
                    available,
                } => {
                    warn!(
                        line_no,
                        product_id = %line.product_id,
                        requested,
                        available,
                        "insufficient stock; releasing earlier lines"
                    );
                    self.release(&debits).await;
                    return Err(OrderError::InsufficientStock {
                        line_no,
                        product_id: line.product_id,
                        requested,
                        available,
                    });
                }
                DebitOutcome::NotFound => {
                    warn!(line_no, product_id = %line.product_id, "unknown product; releasing earlier lines");
                    self.release(&debits).await;
                    return Err(OrderError::ProductNotFound {
                        line_no,
                        product_id: line.product_id,
                    });
                }
            }
        }

        Ok(debits)
    }

    /// Credit back previously made debits, newest first.
    ///
    /// A failed credit is logged and skipped; the remaining debits are still
    /// released.
    pub async fn release(&self, debits: &[StockDebit]) {
        for debit in debits.iter().rev() {
            if let Err(e) = self
                .catalog
                .credit_stock(debit.product_id, debit.quantity)
                .await
            {
                error!(
                    product_id = %debit.product_id,
                    quantity = debit.quantity,
                    error = %e,
                    "failed to release reserved stock"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::InMemoryCatalogStore;
    use storefront_catalog::{Product, ProductId};
    use storefront_core::Money;

    fn product(stock: u32) -> Product {
        Product::new(ProductId::generate(), "Widget", Money::from_cents(1000), stock).unwrap()
    }

    fn line(product_id: ProductId, quantity: u32) -> LineRequest {
        LineRequest {
            product_id,
            quantity,
        }
    }

    async fn stock_of(store: &InMemoryCatalogStore, id: ProductId) -> u32 {
        store.get(id).await.unwrap().unwrap().stock()
    }

    #[tokio::test]
    async fn reserves_all_lines_in_order() {
        let a = product(5);
        let b = product(3);
        let (a_id, b_id) = (a.id(), b.id());
        let store = InMemoryCatalogStore::with_products([a, b]);

        let debits = InventoryReservation::new(&store)
            .reserve(&[line(a_id, 2), line(b_id, 3)])
            .await
            .unwrap();

        assert_eq!(debits.len(), 2);
        assert_eq!(debits[0].product_id, a_id);
        assert_eq!(debits[1].product_id, b_id);
        assert_eq!(stock_of(&store, a_id).await, 3);
        assert_eq!(stock_of(&store, b_id).await, 0);
    }

    #[tokio::test]
    async fn failure_on_later_line_restores_earlier_lines() {
        let a = product(5);
        let b = product(1);
        let (a_id, b_id) = (a.id(), b.id());
        let store = InMemoryCatalogStore::with_products([a, b]);

        let err = InventoryReservation::new(&store)
            .reserve(&[line(a_id, 4), line(b_id, 2)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrderError::InsufficientStock {
                line_no: 2,
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(stock_of(&store, a_id).await, 5);
        assert_eq!(stock_of(&store, b_id).await, 1);
    }

    #[tokio::test]
    async fn unknown_product_names_the_line_and_restores_stock() {
        let a = product(5);
        let a_id = a.id();
        let missing = ProductId::generate();
        let store = InMemoryCatalogStore::with_products([a]);

        let err = InventoryReservation::new(&store)
            .reserve(&[line(a_id, 1), line(missing, 1)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrderError::ProductNotFound { line_no: 2, product_id } if product_id == missing
        ));
        assert_eq!(stock_of(&store, a_id).await, 5);
    }

    #[tokio::test]
    async fn repeated_product_lines_are_debited_independently() {
        let a = product(5);
        let a_id = a.id();
        let store = InMemoryCatalogStore::with_products([a]);

        let err = InventoryReservation::new(&store)
            .reserve(&[line(a_id, 3), line(a_id, 3)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrderError::InsufficientStock {
                line_no: 2,
                requested: 3,
                available: 2,
                ..
            }
        ));
        assert_eq!(stock_of(&store, a_id).await, 5);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn run<F: std::future::Future>(fut: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(fut)
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// A reservation either debits exactly the requested quantities or leaves stock untouched.
            #[test]
            fn reservation_conserves_stock(
                stocks in prop::collection::vec(0u32..20, 1..4),
                picks in prop::collection::vec((0usize..4, 1u32..8), 1..6)
            ) {
                let products: Vec<Product> = stocks.iter().map(|s| product(*s)).collect();
                let ids: Vec<ProductId> = products.iter().map(Product::id).collect();
                let store = InMemoryCatalogStore::with_products(products);
                let lines: Vec<LineRequest> = picks
                    .iter()
                    .map(|(idx, qty)| line(ids[idx % ids.len()], *qty))
                    .collect();

                let result = run(InventoryReservation::new(&store).reserve(&lines));

                for (i, id) in ids.iter().enumerate() {
                    let ordered: u32 = lines
                        .iter()
                        .filter(|l| l.product_id == *id)
                        .map(|l| l.quantity)
                        .sum();
                    let left = run(stock_of(&store, *id));
                    match &result {
                        Ok(_) => {
                            prop_assert_eq!(left + ordered, stocks[i]);
                        }
                        Err(_) => {
                            prop_assert_eq!(left, stocks[i]);
                        }
                    }
                }

                let fits = ids.iter().enumerate().all(|(i, id)| {
                    let ordered: u32 = lines.iter().filter(|l| l.product_id == *id).map(|l| l.quantity).sum();
                    ordered <= stocks[i]
                });
                prop_assert_eq!(result.is_ok(), fits);
            }
        }
    }
}
